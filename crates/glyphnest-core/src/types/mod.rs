//! # Core Type Definitions
//!
//! This module contains the identifier and geometry types shared by the
//! glyphnest registry, plus the error taxonomy:
//! - Identifiers (`SectionId`, `GlyphId`, `NestTag`)
//! - The symbolic layer partition (`GlyphLayer`)
//! - Integer geometry (`Rectangle`)
//! - Error types (`GlyphError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer arithmetic only (no floating-point)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Use saturating arithmetic for counters to prevent overflow

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for a section (atomic geometric region) in the
/// upstream region graph. Sections are immutable from the registry's
/// viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SectionId(pub u32);

/// Unique identifier for a glyph within one nest.
///
/// Ids start at 1 and are assigned exactly once, by the nest, at
/// registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlyphId(pub u32);

/// Process-unique tag identifying one nest instance.
///
/// A glyph carries the tag of its containing nest as an identifying
/// back-reference. The tag never owns the nest and never keeps it alive;
/// it only answers "which nest registered me".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NestTag(u64);

static NEXT_NEST_TAG: AtomicU64 = AtomicU64::new(1);

impl NestTag {
    /// Allocate the next process-unique tag.
    pub(crate) fn next() -> Self {
        Self(NEXT_NEST_TAG.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw tag value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

// =============================================================================
// LAYER PARTITION
// =============================================================================

/// Symbolic partition tag for registered glyphs.
///
/// Every glyph belongs to exactly one layer, fixed at construction.
/// The nest maintains a per-layer index of its registered glyphs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum GlyphLayer {
    /// Regular glyphs coming straight out of segmentation.
    #[default]
    Default,
    /// Glyphs retained as recognized symbols.
    Symbol,
    /// Large spots (beams, dense ink areas).
    Spot,
    /// Glyphs dropped in manually (virtual material).
    Drop,
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Integer bounding box of a section or glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rectangle {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self {
            x,
            y,
            width: right.saturating_sub(x).unsigned_abs(),
            height: bottom.saturating_sub(y).unsigned_abs(),
        }
    }

    /// Exclusive right edge.
    #[must_use]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    /// Check whether a point lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the glyphnest registry and orchestrator.
///
/// Lookup misses are NOT errors; they are `Option::None` results.
/// Structural invariant violations (identity conflict, frozen membership)
/// abort the offending operation before any state change.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GlyphError {
    /// A glyph that already carries an id was asked to take another one.
    #[error("glyph already carries id {current:?}, cannot assign {attempted:?}")]
    IdentityConflict {
        current: GlyphId,
        attempted: GlyphId,
    },

    /// Membership mutation was attempted on a registered glyph.
    #[error("glyph membership is frozen after registration")]
    FrozenMembership,

    /// Deletion was requested for a non-virtual glyph.
    ///
    /// Only virtual glyphs may be deleted; the removal semantics for real
    /// glyphs (neighbor cleanup in the region graph) are an open follow-up.
    #[error("deletion is not supported for non-virtual glyph {0:?}")]
    DeletionNotSupported(GlyphId),

    /// A glyph or compound was built over an empty section set.
    #[error("glyph membership must not be empty")]
    EmptyGlyph,

    /// A compound build referenced a section absent from the region graph.
    #[error("section {0:?} is not part of the region graph")]
    UnknownSection(SectionId),

    /// A snapshot serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),
}

// =============================================================================
// TESTS
// =============================================================================

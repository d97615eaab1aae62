//! # glyphnest-core
//!
//! The glyph identity and assignment registry of the glyphnest
//! optical-recognition pipeline.
//!
//! This crate turns raw, adjacency-grouped image regions into uniquely
//! identified, classifiable glyph objects and mediates every mutation of
//! them: classification, merging into compounds, and deletion. The nest
//! is the sole arbiter of identity; the model is the only sanctioned
//! entry point for mutation.
//!
//! ## Architectural Constraints
//!
//! - Single-writer: callers serialize all mutation onto one processing
//!   sequence; the core performs no locking
//! - Concurrent readers observe the selection set through whole-object
//!   snapshots only
//! - No async, no network, no file I/O; collaborators (classifier, OCR,
//!   training persistence) are external and invoked at well-defined points
//! - Deterministic: `BTreeMap` only, integer arithmetic only

// =============================================================================
// MODULES
// =============================================================================

pub mod facets;
pub mod formats;
pub mod glyph;
pub mod model;
pub mod nest;
pub mod section;
pub mod shape;
pub mod signature;
pub mod text;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{GlyphError, GlyphId, GlyphLayer, NestTag, Rectangle, SectionId};

// =============================================================================
// RE-EXPORTS: Entities & Registry
// =============================================================================

pub use facets::{GlyphAdministration, GlyphContent};
pub use glyph::Glyph;
pub use model::{Candidate, GlyphsModel, ModelConfig, SheetContext, Step, TrainingSink};
pub use nest::{BuiltCompound, Nest};
pub use section::{RegionGraph, Section};
pub use shape::{Grade, Shape};
pub use signature::GlyphSignature;
pub use text::{
    AttachedText, TextRole, TextWord, ELISION_STRING, EXTENSION_STRING, HYPHEN_STRING,
};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{nest_from_bytes, nest_to_bytes, SerializableNest, SnapshotHeader};

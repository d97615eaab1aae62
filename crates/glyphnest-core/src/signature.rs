//! # Membership Signature
//!
//! The order-independent signature of a glyph's section membership.
//!
//! The nest keys its canonicalization index on this signature: two glyph
//! candidates built over the same sections, in any order, hash to the same
//! signature and resolve to one canonical registered glyph.

use crate::SectionId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Order-independent key over a glyph's member sections.
///
/// Internally a sorted, duplicate-free sequence of section ids, so that
/// signature equality is exactly set equality of memberships.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlyphSignature(Vec<SectionId>);

impl GlyphSignature {
    /// Build a signature from any iterable of section ids.
    #[must_use]
    pub fn new(ids: impl IntoIterator<Item = SectionId>) -> Self {
        let set: BTreeSet<SectionId> = ids.into_iter().collect();
        Self(set.into_iter().collect())
    }

    /// Number of member sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check for an empty signature.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Member section ids in sorted order.
    pub fn sections(&self) -> impl Iterator<Item = SectionId> + '_ {
        self.0.iter().copied()
    }
}

impl From<&BTreeSet<SectionId>> for GlyphSignature {
    fn from(set: &BTreeSet<SectionId>) -> Self {
        Self(set.iter().copied().collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================

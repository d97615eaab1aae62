//! # Region Graph
//!
//! The adjacency graph of atomic geometric sections produced by the
//! upstream image decomposition.
//!
//! The registry consumes this graph read-only: it looks up section bounds
//! when building compounds and exposes adjacency to callers. All storage
//! uses `BTreeMap`/`BTreeSet` for deterministic iteration.

use crate::{GlyphError, Rectangle, SectionId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// SECTION
// =============================================================================

/// An atomic geometric region, immutable from the registry's viewpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// The section identifier, unique within one region graph.
    pub id: SectionId,
    /// The section bounding box.
    pub bounds: Rectangle,
}

impl Section {
    /// Create a new section.
    #[must_use]
    pub const fn new(id: SectionId, bounds: Rectangle) -> Self {
        Self { id, bounds }
    }
}

// =============================================================================
// REGION GRAPH
// =============================================================================

/// The adjacency graph of sections for one sheet.
///
/// Built once by the upstream decomposition, then handed to the nest and
/// never mutated by the identity core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionGraph {
    /// Section storage: SectionId -> Section.
    sections: BTreeMap<SectionId, Section>,

    /// Undirected adjacency: section -> touching sections.
    adjacency: BTreeMap<SectionId, BTreeSet<SectionId>>,
}

impl RegionGraph {
    /// Create a new empty region graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section. Replaces any section with the same id.
    pub fn insert_section(&mut self, section: Section) {
        self.sections.insert(section.id, section);
    }

    /// Record adjacency between two sections, in both directions.
    ///
    /// Links referencing unknown sections are silently ignored.
    pub fn link(&mut self, a: SectionId, b: SectionId) {
        if a == b || !self.sections.contains_key(&a) || !self.sections.contains_key(&b) {
            return;
        }
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Lookup a section by id. A miss is ordinary, not an error.
    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(&id)
    }

    /// Check whether a section is part of the graph.
    #[must_use]
    pub fn contains(&self, id: SectionId) -> bool {
        self.sections.contains_key(&id)
    }

    /// All sections in deterministic order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// Sections adjacent to the given one, in deterministic order.
    pub fn adjacent(&self, id: SectionId) -> impl Iterator<Item = SectionId> + '_ {
        self.adjacency
            .get(&id)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Check adjacency between two sections.
    #[must_use]
    pub fn are_adjacent(&self, a: SectionId, b: SectionId) -> bool {
        self.adjacency.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Total number of sections.
    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Bounding box of a non-empty section set.
    ///
    /// # Errors
    /// - [`GlyphError::EmptyGlyph`] if `ids` is empty
    /// - [`GlyphError::UnknownSection`] if any id is absent from the graph
    pub fn bounds_of(&self, ids: &BTreeSet<SectionId>) -> Result<Rectangle, GlyphError> {
        let mut bounds: Option<Rectangle> = None;
        for &id in ids {
            let section = self.section(id).ok_or(GlyphError::UnknownSection(id))?;
            bounds = Some(match bounds {
                Some(b) => b.union(&section.bounds),
                None => section.bounds,
            });
        }
        bounds.ok_or(GlyphError::EmptyGlyph)
    }
}

// =============================================================================
// TESTS
// =============================================================================

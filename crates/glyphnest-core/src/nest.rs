//! # Glyph Nest
//!
//! The registry owning the glyph identity space.
//!
//! The nest is the sole arbiter of identity: it allocates ids, maintains
//! the signature-keyed canonicalization index that deduplicates
//! structurally identical candidates, partitions registered glyphs by
//! layer, and holds the current selection snapshot for concurrent readers.
//!
//! Mutation is single-writer by contract; the caller serializes all
//! register/remove operations. The selection set is the only structure
//! exposed to parallel readers and is replaced as a whole `Arc`, never
//! mutated element by element.

use crate::facets::GlyphAdministration;
use crate::{
    Glyph, GlyphError, GlyphId, GlyphLayer, GlyphSignature, NestTag, RegionGraph, SectionId,
};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

// =============================================================================
// BUILT COMPOUND
// =============================================================================

/// Outcome of a compound build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltCompound {
    /// An equivalent glyph was already registered; no transient was
    /// created and the canonical id is returned directly.
    Existing(GlyphId),
    /// A fresh transient compound, not yet registered.
    Transient(Glyph),
}

// =============================================================================
// NEST
// =============================================================================

/// The glyph registry for one sheet.
#[derive(Debug)]
pub struct Nest {
    /// Identifying tag of this nest instance.
    tag: NestTag,

    /// Glyph storage: GlyphId -> Glyph.
    glyphs: BTreeMap<GlyphId, Glyph>,

    /// Canonicalization index: membership signature -> canonical glyph.
    signatures: BTreeMap<GlyphSignature, GlyphId>,

    /// Layer partition of registered glyphs.
    layers: BTreeMap<GlyphLayer, BTreeSet<GlyphId>>,

    /// Current selection snapshot, swapped as a whole.
    selection: Arc<BTreeSet<GlyphId>>,

    /// Next unused glyph id.
    next_id: u32,

    /// The read-only region graph this nest was built over.
    regions: RegionGraph,
}

impl Nest {
    /// Create a new empty nest over the given region graph.
    #[must_use]
    pub fn new(regions: RegionGraph) -> Self {
        Self {
            tag: NestTag::next(),
            glyphs: BTreeMap::new(),
            signatures: BTreeMap::new(),
            layers: BTreeMap::new(),
            selection: Arc::new(BTreeSet::new()),
            next_id: 1,
            regions,
        }
    }

    /// Identifying tag of this nest instance.
    #[must_use]
    pub fn tag(&self) -> NestTag {
        self.tag
    }

    /// The region graph this nest was built over.
    #[must_use]
    pub fn regions(&self) -> &RegionGraph {
        &self.regions
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Register a glyph, assigning its identity.
    ///
    /// Canonicalization rules, in order:
    /// 1. A glyph already registered in this nest is returned unchanged
    ///    (registration is idempotent).
    /// 2. If an equivalent registered glyph exists (same membership
    ///    signature), its id is returned and the input is discarded.
    /// 3. Otherwise the next unused id is assigned, the glyph membership
    ///    is frozen, and the glyph enters the id map, the signature index,
    ///    and the layer partition.
    ///
    /// # Errors
    /// [`GlyphError::IdentityConflict`] if the input already carries an id
    /// that is not registered here (a glyph from another nest).
    pub fn register(&mut self, glyph: Glyph) -> Result<GlyphId, GlyphError> {
        if let Some(id) = glyph.id() {
            if glyph.nest() == Some(self.tag) && self.glyphs.contains_key(&id) {
                return Ok(id);
            }
            // Foreign identity: loud structural error, no state change.
            return Err(GlyphError::IdentityConflict {
                current: id,
                attempted: GlyphId(self.next_id),
            });
        }

        let signature = glyph.signature();
        if let Some(&existing) = self.signatures.get(&signature) {
            return Ok(existing);
        }

        let id = GlyphId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let mut glyph = glyph;
        glyph.set_id(id)?;
        glyph.set_nest(self.tag);
        debug!("registered {} in layer {:?}", glyph.id_string(), glyph.layer());

        self.layers.entry(glyph.layer()).or_default().insert(id);
        self.signatures.insert(signature, id);
        self.glyphs.insert(id, glyph);
        Ok(id)
    }

    /// Build a compound over the union of the given sections.
    ///
    /// With `require_unique == false`, an equivalent registered glyph is
    /// returned directly as [`BuiltCompound::Existing`] and no transient
    /// object is produced. With `require_unique == true` a fresh transient
    /// compound is always built (deduplication still happens later, at
    /// registration).
    ///
    /// # Errors
    /// - [`GlyphError::EmptyGlyph`] if `sections` is empty
    /// - [`GlyphError::UnknownSection`] if a section is absent from the
    ///   region graph
    pub fn build_compound(
        &self,
        layer: GlyphLayer,
        sections: &BTreeSet<SectionId>,
        require_unique: bool,
    ) -> Result<BuiltCompound, GlyphError> {
        if sections.is_empty() {
            return Err(GlyphError::EmptyGlyph);
        }

        if !require_unique {
            let signature = GlyphSignature::from(sections);
            if let Some(&existing) = self.signatures.get(&signature) {
                return Ok(BuiltCompound::Existing(existing));
            }
        }

        let bounds = self.regions.bounds_of(sections)?;
        let glyph = Glyph::new(layer, sections.clone(), bounds)?;
        Ok(BuiltCompound::Transient(glyph))
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Lookup a glyph by id. A miss is ordinary, not an error.
    #[must_use]
    pub fn glyph(&self, id: GlyphId) -> Option<&Glyph> {
        self.glyphs.get(&id)
    }

    /// Mutable lookup, for the single serialized writer.
    #[must_use]
    pub fn glyph_mut(&mut self, id: GlyphId) -> Option<&mut Glyph> {
        self.glyphs.get_mut(&id)
    }

    /// Check whether an id is registered here.
    #[must_use]
    pub fn contains(&self, id: GlyphId) -> bool {
        self.glyphs.contains_key(&id)
    }

    /// Canonical glyph for a membership signature, if registered.
    #[must_use]
    pub fn canonical(&self, signature: &GlyphSignature) -> Option<GlyphId> {
        self.signatures.get(signature).copied()
    }

    /// All registered glyphs in deterministic id order.
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.values()
    }

    /// Registered glyph count.
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Ids registered under the given layer, in deterministic order.
    pub fn layer_glyphs(&self, layer: GlyphLayer) -> impl Iterator<Item = GlyphId> + '_ {
        self.layers
            .get(&layer)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// The next id that would be assigned.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    // =========================================================================
    // SELECTION SNAPSHOT
    // =========================================================================

    /// Current selection snapshot. Readers clone the `Arc` and keep a
    /// consistent view even while the writer swaps in a new set.
    #[must_use]
    pub fn selection(&self) -> Arc<BTreeSet<GlyphId>> {
        Arc::clone(&self.selection)
    }

    /// Replace the selection as a whole. Never mutates the previous set;
    /// readers holding it keep their snapshot.
    pub fn set_selection(&mut self, selection: BTreeSet<GlyphId>) {
        self.selection = Arc::new(selection);
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    /// Remove a glyph from the id map, the signature index, the layer
    /// partition, and the selection snapshot.
    ///
    /// Used only by the orchestrator's virtual-deletion path; policy (the
    /// virtual-only rule) lives there, bookkeeping lives here.
    pub fn remove(&mut self, id: GlyphId) -> Option<Glyph> {
        let glyph = self.glyphs.remove(&id)?;

        self.signatures.remove(&glyph.signature());
        if let Some(layer_set) = self.layers.get_mut(&glyph.layer()) {
            layer_set.remove(&id);
        }
        if self.selection.contains(&id) {
            let mut selection: BTreeSet<GlyphId> = (*self.selection).clone();
            selection.remove(&id);
            self.selection = Arc::new(selection);
        }
        Some(glyph)
    }

    // =========================================================================
    // SNAPSHOT RESTORE
    // =========================================================================

    /// Rebuild a nest from snapshot parts, restamping every glyph with
    /// this nest's fresh tag and reindexing signatures and layers.
    pub(crate) fn restore(
        glyph_list: Vec<Glyph>,
        next_id: u32,
        regions: RegionGraph,
        selection: BTreeSet<GlyphId>,
    ) -> Self {
        let mut nest = Self::new(regions);
        nest.next_id = next_id;

        for mut glyph in glyph_list {
            let Some(id) = glyph.id() else {
                // Transient glyphs never enter a snapshot.
                continue;
            };
            glyph.set_nest(nest.tag);
            if id.0 >= nest.next_id {
                nest.next_id = id.0.saturating_add(1);
            }
            nest.layers.entry(glyph.layer()).or_default().insert(id);
            nest.signatures.insert(glyph.signature(), id);
            nest.glyphs.insert(id, glyph);
        }

        let selection: BTreeSet<GlyphId> = selection
            .into_iter()
            .filter(|id| nest.glyphs.contains_key(id))
            .collect();
        nest.selection = Arc::new(selection);
        nest
    }
}

// =============================================================================
// TESTS
// =============================================================================

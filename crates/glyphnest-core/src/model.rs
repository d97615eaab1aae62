//! # Glyphs Model
//!
//! The assignment orchestrator: the only sanctioned entry point for
//! classification, merging, and deletion of glyphs.
//!
//! The model owns its nest and layers the policy the nest does not know
//! about on top of it: noise exclusion during bulk reclassification,
//! latest-shape memory, the virtual-only deletion rule, and the
//! persistence-intent signal sent to an external training sink when a
//! human classifies a glyph.
//!
//! User gestures are expected to be queued by an external controller onto
//! one serialized processing sequence; the model performs no locking.

use crate::facets::GlyphAdministration;
use crate::nest::BuiltCompound;
use crate::{Glyph, GlyphError, GlyphId, GlyphLayer, Grade, Nest, SectionId, Shape};
use log::{debug, warn};
use std::collections::BTreeSet;

// =============================================================================
// OWNING CONTEXT
// =============================================================================

/// Opaque handle to the sheet/document a nest belongs to.
///
/// Exposed to collaborators, never interpreted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetContext {
    name: String,
}

impl SheetContext {
    /// Create a new sheet handle.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The sheet name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Opaque marker for the pipeline step that originated a model, so that
/// callers know from which step updates must be propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step(String);

impl Step {
    /// Create a new step marker.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The step name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// COLLABORATORS
// =============================================================================

/// The external persistence collaborator.
///
/// The model only signals intent; recording mechanics (disk layout,
/// batching) are entirely the sink's responsibility, and the model never
/// waits on them.
pub trait TrainingSink {
    /// Record one manually classified glyph and its owning sheet.
    fn record_glyph(&mut self, glyph: &Glyph, sheet: Option<&SheetContext>);
}

/// Policy flags for persistence-intent signaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModelConfig {
    /// Whether an interactive UI is present.
    pub interactive: bool,
    /// Whether manual corrections should be persisted for training.
    pub persist_manual: bool,
}

// =============================================================================
// CANDIDATE
// =============================================================================

/// A glyph handed to the model: either already registered (named by id)
/// or still transient (owned by the caller until registration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A glyph registered in the model's nest.
    Registered(GlyphId),
    /// A transient glyph, not yet registered anywhere.
    Transient(Glyph),
}

impl From<GlyphId> for Candidate {
    fn from(id: GlyphId) -> Self {
        Self::Registered(id)
    }
}

impl From<Glyph> for Candidate {
    fn from(glyph: Glyph) -> Self {
        Self::Transient(glyph)
    }
}

// =============================================================================
// GLYPHS MODEL
// =============================================================================

/// The assignment orchestrator over one nest.
pub struct GlyphsModel {
    /// The underlying glyph nest. Owned: a model without a nest is not
    /// expressible.
    nest: Nest,

    /// Related sheet, if any.
    sheet: Option<SheetContext>,

    /// The step this model is used for, if any.
    step: Option<Step>,

    /// Persistence-intent policy flags.
    config: ModelConfig,

    /// The training persistence collaborator, if wired up.
    sink: Option<Box<dyn TrainingSink>>,

    /// Latest useful shape assigned through this model, if any.
    latest_shape: Option<Shape>,
}

impl std::fmt::Debug for GlyphsModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphsModel")
            .field("nest", &self.nest)
            .field("sheet", &self.sheet)
            .field("step", &self.step)
            .field("config", &self.config)
            .field("latest_shape", &self.latest_shape)
            .finish()
    }
}

impl GlyphsModel {
    /// Create a model over its underlying nest.
    ///
    /// A null sheet is allowed (verifier use); the nest is required by
    /// construction.
    #[must_use]
    pub fn new(nest: Nest, sheet: Option<SheetContext>, step: Option<Step>) -> Self {
        Self {
            nest,
            sheet,
            step,
            config: ModelConfig::default(),
            sink: None,
            latest_shape: None,
        }
    }

    /// Set the persistence policy flags.
    #[must_use]
    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Wire up the training persistence collaborator.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn TrainingSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // =========================================================================
    // ASSIGNMENT
    // =========================================================================

    /// Assign a shape to a collection of candidates.
    ///
    /// With `as_compound`, one compound is built over the union of all
    /// candidates' sections and the shape applies to that single result.
    /// Otherwise each candidate is assigned individually, except glyphs
    /// currently classified as noise, which bulk reclassification never
    /// touches.
    ///
    /// Returns the ids of the glyphs actually assigned.
    pub fn assign_many(
        &mut self,
        candidates: Vec<Candidate>,
        shape: Option<Shape>,
        as_compound: bool,
        grade: Grade,
    ) -> Result<Vec<GlyphId>, GlyphError> {
        if as_compound {
            let compound = self.build_compound_candidate(&candidates)?;
            return Ok(self.assign_one(compound, shape, grade)?.into_iter().collect());
        }

        let mut assigned = Vec::new();
        for candidate in candidates {
            let current = match &candidate {
                Candidate::Registered(id) => self.nest.glyph(*id).and_then(Glyph::shape),
                Candidate::Transient(glyph) => glyph.shape(),
            };
            if current.is_some_and(Shape::is_noise) {
                continue;
            }
            if let Some(id) = self.assign_one(candidate, shape, grade)? {
                assigned.push(id);
            }
        }
        Ok(assigned)
    }

    /// Assign a shape to one candidate, registering it first if needed.
    ///
    /// When `shape` is present the candidate is registered through the
    /// nest (idempotent for already-registered inputs; deduplicating for
    /// transient ones) and the latest-shape memory is updated, unless the
    /// shape is the reserved compound-in-progress marker. The (possibly
    /// absent) shape is then set on the canonical glyph. When the shape is
    /// present, the grade is manual, and both policy flags are on, the
    /// training sink is signaled with the glyph and its owning sheet.
    ///
    /// Returns the canonical id, or `None` when the candidate resolves to
    /// nothing (an unknown registered id, or a transient glyph with no
    /// shape to record).
    ///
    /// # Errors
    /// [`GlyphError::IdentityConflict`] from registration, before any
    /// state changes.
    pub fn assign_one(
        &mut self,
        candidate: Candidate,
        shape: Option<Shape>,
        grade: Grade,
    ) -> Result<Option<GlyphId>, GlyphError> {
        let id = match candidate {
            Candidate::Registered(id) => {
                if !self.nest.contains(id) {
                    return Ok(None);
                }
                id
            }
            Candidate::Transient(glyph) => {
                if shape.is_none() {
                    // An unregistered glyph with no shape to set: nothing
                    // observable would change.
                    return Ok(None);
                }
                self.nest.register(glyph)?
            }
        };

        if let Some(shape) = shape {
            if let Some(glyph) = self.nest.glyph(id) {
                debug!("assign {} to {:?}", glyph.id_string(), shape);
            }
            self.set_latest_shape(Some(shape));
        }

        if let Some(glyph) = self.nest.glyph_mut(id) {
            glyph.set_shape(shape, grade);
        }

        if shape.is_some()
            && grade == Grade::Manual
            && self.config.interactive
            && self.config.persist_manual
        {
            if let Some(sink) = self.sink.as_mut() {
                if let Some(glyph) = self.nest.glyph(id) {
                    sink.record_glyph(glyph, self.sheet.as_ref());
                }
            }
        }

        Ok(Some(id))
    }

    /// Build one transient compound candidate over the union of all the
    /// given candidates' sections.
    fn build_compound_candidate(
        &self,
        candidates: &[Candidate],
    ) -> Result<Candidate, GlyphError> {
        let mut union: BTreeSet<SectionId> = BTreeSet::new();
        let mut layer: Option<GlyphLayer> = None;

        for candidate in candidates {
            match candidate {
                Candidate::Registered(id) => {
                    if let Some(glyph) = self.nest.glyph(*id) {
                        union.extend(glyph.sections().iter().copied());
                        layer.get_or_insert(glyph.layer());
                    }
                }
                Candidate::Transient(glyph) => {
                    union.extend(glyph.sections().iter().copied());
                    layer.get_or_insert(glyph.layer());
                }
            }
        }

        let layer = layer.unwrap_or_default();
        match self.nest.build_compound(layer, &union, true)? {
            BuiltCompound::Existing(id) => Ok(Candidate::Registered(id)),
            BuiltCompound::Transient(glyph) => Ok(Candidate::Transient(glyph)),
        }
    }

    // =========================================================================
    // DEASSIGNMENT
    // =========================================================================

    /// Clear the classification of one registered glyph, leaving its
    /// identity and membership untouched.
    pub fn deassign_one(&mut self, id: GlyphId) -> Result<Option<GlyphId>, GlyphError> {
        self.assign_one(Candidate::Registered(id), None, Grade::Algorithmic)
    }

    /// Clear the classification of a collection of registered glyphs.
    pub fn deassign_many(&mut self, ids: &[GlyphId]) -> Result<Vec<GlyphId>, GlyphError> {
        let mut deassigned = Vec::new();
        for &id in ids {
            if let Some(id) = self.deassign_one(id)? {
                deassigned.push(id);
            }
        }
        Ok(deassigned)
    }

    // =========================================================================
    // DELETION
    // =========================================================================

    /// Delete one virtual glyph from the nest (terminal state).
    ///
    /// # Errors
    /// [`GlyphError::DeletionNotSupported`] for non-virtual glyphs; the
    /// nest is left untouched. Removal semantics for real glyphs (neighbor
    /// cleanup in the surrounding structure) are an open follow-up, so the
    /// rejection is explicit rather than silent.
    pub fn delete_one(&mut self, id: GlyphId) -> Result<(), GlyphError> {
        let Some(glyph) = self.nest.glyph(id) else {
            // Ordinary miss: nothing to delete.
            return Ok(());
        };
        if !glyph.is_virtual() {
            warn!("attempt to delete non-virtual {}", glyph.id_string());
            return Err(GlyphError::DeletionNotSupported(id));
        }
        self.nest.remove(id);
        Ok(())
    }

    /// Delete a collection of glyphs, element-wise.
    ///
    /// Rejections are collected and returned rather than aborting the
    /// remainder, so one non-virtual glyph in a mixed selection does not
    /// block deletion of the virtual ones.
    pub fn delete_many(&mut self, ids: &[GlyphId]) -> Vec<(GlyphId, GlyphError)> {
        let mut rejected = Vec::new();
        for &id in ids {
            if let Err(err) = self.delete_one(id) {
                rejected.push((id, err));
            }
        }
        rejected
    }

    // =========================================================================
    // READ ACCESSORS
    // =========================================================================

    /// Retrieve a glyph, knowing its id.
    #[must_use]
    pub fn glyph_by_id(&self, id: GlyphId) -> Option<&Glyph> {
        self.nest.glyph(id)
    }

    /// The latest non-null shape assigned through this model, if any.
    #[must_use]
    pub fn latest_shape(&self) -> Option<Shape> {
        self.latest_shape
    }

    /// Remember the latest useful shape.
    ///
    /// The reserved compound-in-progress marker never enters the memory.
    pub fn set_latest_shape(&mut self, shape: Option<Shape>) {
        if shape != Some(Shape::GlyphPart) {
            self.latest_shape = shape;
        }
    }

    /// The step this model is used for, if any.
    #[must_use]
    pub fn step(&self) -> Option<&Step> {
        self.step.as_ref()
    }

    /// The model's underlying sheet, if any.
    #[must_use]
    pub fn sheet(&self) -> Option<&SheetContext> {
        self.sheet.as_ref()
    }

    /// The underlying glyph nest.
    #[must_use]
    pub fn nest(&self) -> &Nest {
        &self.nest
    }

    /// Mutable access to the nest, for the single serialized writer.
    #[must_use]
    pub fn nest_mut(&mut self) -> &mut Nest {
        &mut self.nest
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::{Rectangle, RegionGraph, Section};

    fn regions(count: u32) -> RegionGraph {
        let mut graph = RegionGraph::new();
        for i in 1..=count {
            graph.insert_section(Section::new(
                SectionId(i),
                Rectangle::new((i as i32) * 10, 0, 10, 10),
            ));
        }
        graph
    }

    fn model(section_count: u32) -> GlyphsModel {
        GlyphsModel::new(
            Nest::new(regions(section_count)),
            Some(SheetContext::new("sheet-1")),
            Some(Step::new("symbols")),
        )
    }

    fn transient(model: &GlyphsModel, ids: &[u32]) -> Glyph {
        let sections: BTreeSet<_> = ids.iter().map(|&i| SectionId(i)).collect();
        match model
            .nest()
            .build_compound(GlyphLayer::Default, &sections, true)
            .expect("build")
        {
            BuiltCompound::Transient(g) => g,
            BuiltCompound::Existing(id) => panic!("unexpected existing glyph {id:?}"),
        }
    }

    #[test]
    fn assign_registers_transient_and_sets_shape() {
        let mut model = model(4);
        let glyph = transient(&model, &[1, 2]);

        let id = model
            .assign_one(glyph.into(), Some(Shape::NoteHead), Grade::Algorithmic)
            .expect("assign")
            .expect("assigned");

        assert_eq!(id, GlyphId(1));
        let stored = model.glyph_by_id(id).expect("lookup");
        assert_eq!(stored.shape(), Some(Shape::NoteHead));
        assert_eq!(model.latest_shape(), Some(Shape::NoteHead));
    }

    #[test]
    fn assign_unknown_registered_id_is_a_miss() {
        let mut model = model(2);
        let result = model
            .assign_one(GlyphId(42).into(), Some(Shape::Stem), Grade::Algorithmic)
            .expect("assign");
        assert_eq!(result, None);
    }

    #[test]
    fn deassign_preserves_identity() {
        let mut model = model(2);
        let id = model
            .assign_one(
                transient(&model, &[1]).into(),
                Some(Shape::Dot),
                Grade::Algorithmic,
            )
            .expect("assign")
            .expect("assigned");

        let back = model.deassign_one(id).expect("deassign");
        assert_eq!(back, Some(id));

        let stored = model.glyph_by_id(id).expect("lookup");
        assert_eq!(stored.shape(), None);
        assert_eq!(stored.id(), Some(id));
    }

    #[test]
    fn bulk_assignment_skips_noise() {
        let mut model = model(4);
        let noise = model
            .assign_one(
                transient(&model, &[1]).into(),
                Some(Shape::Noise),
                Grade::Algorithmic,
            )
            .expect("assign")
            .expect("assigned");
        let plain = model
            .assign_one(
                transient(&model, &[2]).into(),
                Some(Shape::Dot),
                Grade::Algorithmic,
            )
            .expect("assign")
            .expect("assigned");

        let assigned = model
            .assign_many(
                vec![noise.into(), plain.into()],
                Some(Shape::NoteHead),
                false,
                Grade::Algorithmic,
            )
            .expect("assign many");

        assert_eq!(assigned, vec![plain]);
        assert_eq!(
            model.glyph_by_id(noise).expect("lookup").shape(),
            Some(Shape::Noise)
        );
        assert_eq!(
            model.glyph_by_id(plain).expect("lookup").shape(),
            Some(Shape::NoteHead)
        );
    }

    #[test]
    fn compound_assignment_creates_one_glyph() {
        let mut model = model(4);
        let a = transient(&model, &[1]);
        let b = transient(&model, &[2]);

        let assigned = model
            .assign_many(
                vec![a.into(), b.into()],
                Some(Shape::Beam),
                true,
                Grade::Algorithmic,
            )
            .expect("assign many");

        assert_eq!(assigned.len(), 1);
        let compound = model.glyph_by_id(assigned[0]).expect("lookup");
        assert_eq!(compound.sections().len(), 2);
        assert_eq!(model.nest().glyph_count(), 1);
    }

    #[test]
    fn glyph_part_never_enters_latest_shape() {
        let mut model = model(4);
        model
            .assign_one(
                transient(&model, &[1]).into(),
                Some(Shape::Flag),
                Grade::Algorithmic,
            )
            .expect("assign");
        assert_eq!(model.latest_shape(), Some(Shape::Flag));

        model
            .assign_one(
                transient(&model, &[2]).into(),
                Some(Shape::GlyphPart),
                Grade::Algorithmic,
            )
            .expect("assign");
        assert_eq!(model.latest_shape(), Some(Shape::Flag));
    }

    #[test]
    fn transient_with_no_shape_is_not_registered() {
        let mut model = model(2);
        let glyph = transient(&model, &[1]);

        let result = model
            .assign_one(glyph.into(), None, Grade::Algorithmic)
            .expect("assign");

        assert_eq!(result, None);
        assert_eq!(model.nest().glyph_count(), 0);
    }

    #[test]
    fn delete_rejects_non_virtual() {
        let mut model = model(2);
        let id = model
            .assign_one(
                transient(&model, &[1]).into(),
                Some(Shape::Ledger),
                Grade::Algorithmic,
            )
            .expect("assign")
            .expect("assigned");

        let result = model.delete_one(id);
        assert_eq!(result, Err(GlyphError::DeletionNotSupported(id)));
        assert!(model.glyph_by_id(id).is_some());
    }

    #[test]
    fn delete_removes_virtual() {
        let mut model = model(2);
        let sections: BTreeSet<_> = [SectionId(1)].into_iter().collect();
        let virtual_glyph = Glyph::new_virtual(
            GlyphLayer::Drop,
            sections,
            Rectangle::new(0, 0, 10, 10),
        )
        .expect("virtual glyph");

        let id = model
            .assign_one(virtual_glyph.into(), Some(Shape::NoteHead), Grade::Manual)
            .expect("assign")
            .expect("assigned");

        model.delete_one(id).expect("delete");
        assert!(model.glyph_by_id(id).is_none());
    }

    #[test]
    fn delete_many_reports_rejections_element_wise() {
        let mut model = model(4);
        let real = model
            .assign_one(
                transient(&model, &[1]).into(),
                Some(Shape::Dot),
                Grade::Algorithmic,
            )
            .expect("assign")
            .expect("assigned");
        let sections: BTreeSet<_> = [SectionId(2)].into_iter().collect();
        let virtual_id = model
            .assign_one(
                Glyph::new_virtual(GlyphLayer::Drop, sections, Rectangle::new(0, 0, 5, 5))
                    .expect("virtual glyph")
                    .into(),
                Some(Shape::Rest),
                Grade::Algorithmic,
            )
            .expect("assign")
            .expect("assigned");

        let rejected = model.delete_many(&[real, virtual_id]);

        assert_eq!(rejected, vec![(real, GlyphError::DeletionNotSupported(real))]);
        assert!(model.glyph_by_id(real).is_some());
        assert!(model.glyph_by_id(virtual_id).is_none());
    }

    #[test]
    fn accessors_expose_owning_context() {
        let model = model(1);
        assert_eq!(model.sheet().map(SheetContext::name), Some("sheet-1"));
        assert_eq!(model.step().map(Step::name), Some("symbols"));
    }
}

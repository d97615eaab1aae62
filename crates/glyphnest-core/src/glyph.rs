//! # Glyph Entity
//!
//! The identifiable aggregate of sections, carrying classification state
//! and optional attached text.
//!
//! A glyph starts TRANSIENT (no id, no nest). Registration through the
//! nest assigns its id and freezes its membership; from then on it only
//! cycles between classified and unclassified. The capability facets
//! ([`GlyphAdministration`], [`GlyphContent`]) are implemented directly on
//! this one concrete type.

use crate::facets::{GlyphAdministration, GlyphContent};
use crate::{
    AttachedText, GlyphError, GlyphId, GlyphLayer, GlyphSignature, Grade, NestTag, Rectangle,
    SectionId, Shape, TextRole, TextWord,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An identifiable aggregate of one or more sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glyph {
    /// Unique id within the containing nest, assigned at registration.
    id: Option<GlyphId>,

    /// Symbolic partition this glyph belongs to.
    layer: GlyphLayer,

    /// Member sections. Immutable once the glyph is registered.
    sections: BTreeSet<SectionId>,

    /// Bounding box of the member sections.
    bounds: Rectangle,

    /// Current classification, if any.
    shape: Option<Shape>,

    /// Provenance of the current classification.
    grade: Grade,

    /// Whether this glyph was synthesized rather than derived from pixels.
    virtual_glyph: bool,

    /// Identifying back-reference to the containing nest. Never serialized:
    /// a restored nest restamps its glyphs with its own fresh tag.
    #[serde(skip)]
    nest: Option<NestTag>,

    /// Attached text state.
    text: AttachedText,
}

impl Glyph {
    /// Create a transient real glyph over a non-empty section set.
    ///
    /// # Errors
    /// [`GlyphError::EmptyGlyph`] if `sections` is empty.
    pub fn new(
        layer: GlyphLayer,
        sections: BTreeSet<SectionId>,
        bounds: Rectangle,
    ) -> Result<Self, GlyphError> {
        Self::build(layer, sections, bounds, false)
    }

    /// Create a transient virtual glyph (synthesized, non-pixel-derived).
    ///
    /// Virtual glyphs are the only ones that may later be deleted.
    ///
    /// # Errors
    /// [`GlyphError::EmptyGlyph`] if `sections` is empty.
    pub fn new_virtual(
        layer: GlyphLayer,
        sections: BTreeSet<SectionId>,
        bounds: Rectangle,
    ) -> Result<Self, GlyphError> {
        Self::build(layer, sections, bounds, true)
    }

    fn build(
        layer: GlyphLayer,
        sections: BTreeSet<SectionId>,
        bounds: Rectangle,
        virtual_glyph: bool,
    ) -> Result<Self, GlyphError> {
        if sections.is_empty() {
            return Err(GlyphError::EmptyGlyph);
        }
        Ok(Self {
            id: None,
            layer,
            sections,
            bounds,
            shape: None,
            grade: Grade::Unset,
            virtual_glyph,
            nest: None,
            text: AttachedText::default(),
        })
    }

    /// Member sections of this glyph.
    #[must_use]
    pub fn sections(&self) -> &BTreeSet<SectionId> {
        &self.sections
    }

    /// Bounding box of this glyph.
    #[must_use]
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Order-independent membership signature, the dedup key.
    #[must_use]
    pub fn signature(&self) -> GlyphSignature {
        GlyphSignature::from(&self.sections)
    }

    /// Current classification, if any.
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// Provenance of the current classification.
    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Whether the glyph currently carries a shape.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.shape.is_some()
    }

    /// Set (or clear) the classification together with its provenance.
    ///
    /// Clearing the shape resets the grade to [`Grade::Unset`].
    pub fn set_shape(&mut self, shape: Option<Shape>, grade: Grade) {
        self.shape = shape;
        self.grade = if shape.is_some() { grade } else { Grade::Unset };
    }

    /// Extend the membership with one more section, while still transient.
    ///
    /// # Errors
    /// [`GlyphError::FrozenMembership`] once the glyph is registered;
    /// altering a registered membership would invalidate its signature.
    pub fn add_section(&mut self, id: SectionId, bounds: Rectangle) -> Result<(), GlyphError> {
        if self.nest.is_some() {
            return Err(GlyphError::FrozenMembership);
        }
        self.sections.insert(id);
        self.bounds = self.bounds.union(&bounds);
        Ok(())
    }
}

// =============================================================================
// ADMINISTRATION FACET
// =============================================================================

impl GlyphAdministration for Glyph {
    fn id(&self) -> Option<GlyphId> {
        self.id
    }

    fn layer(&self) -> GlyphLayer {
        self.layer
    }

    fn nest(&self) -> Option<NestTag> {
        self.nest
    }

    fn id_string(&self) -> String {
        match (self.id, self.shape) {
            (Some(id), Some(shape)) => format!("glyph#{}[{:?}]", id.0, shape),
            (Some(id), None) => format!("glyph#{}", id.0),
            (None, _) => "glyph#transient".to_string(),
        }
    }

    fn is_virtual(&self) -> bool {
        self.virtual_glyph
    }

    fn set_id(&mut self, id: GlyphId) -> Result<(), GlyphError> {
        match self.id {
            Some(current) => Err(GlyphError::IdentityConflict {
                current,
                attempted: id,
            }),
            None => {
                self.id = Some(id);
                Ok(())
            }
        }
    }

    fn set_nest(&mut self, nest: NestTag) {
        self.nest = Some(nest);
    }
}

// =============================================================================
// CONTENT FACET
// =============================================================================

impl GlyphContent for Glyph {
    fn text_value(&self) -> Option<&str> {
        self.text.value()
    }

    fn text_role(&self) -> Option<TextRole> {
        self.text.role()
    }

    fn text_word(&self) -> Option<&TextWord> {
        self.text.word.as_ref()
    }

    fn ocr_language(&self) -> Option<&str> {
        self.text.ocr_language.as_deref()
    }

    fn set_manual_value(&mut self, value: String) {
        self.text.manual_value = Some(value);
    }

    fn set_manual_role(&mut self, role: TextRole) {
        self.text.manual_role = Some(role);
    }

    fn set_text_word(&mut self, ocr_language: String, word: TextWord) {
        self.text.ocr_language = Some(ocr_language);
        self.text.word = Some(word);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sections(ids: &[u32]) -> BTreeSet<SectionId> {
        ids.iter().map(|&i| SectionId(i)).collect()
    }

    fn glyph(ids: &[u32]) -> Glyph {
        Glyph::new(
            GlyphLayer::Default,
            sections(ids),
            Rectangle::new(0, 0, 10, 10),
        )
        .expect("glyph")
    }

    #[test]
    fn empty_membership_rejected() {
        let result = Glyph::new(GlyphLayer::Default, BTreeSet::new(), Rectangle::default());
        assert_eq!(result, Err(GlyphError::EmptyGlyph));
    }

    #[test]
    fn new_glyph_is_transient_and_unclassified() {
        let g = glyph(&[1, 2]);
        assert!(g.is_transient());
        assert_eq!(g.id(), None);
        assert!(!g.is_classified());
        assert_eq!(g.grade(), Grade::Unset);
        assert!(!g.is_virtual());
    }

    #[test]
    fn id_is_assigned_at_most_once() {
        let mut g = glyph(&[1]);
        g.set_id(GlyphId(1)).expect("first assignment");

        let err = g.set_id(GlyphId(2));
        assert_eq!(
            err,
            Err(GlyphError::IdentityConflict {
                current: GlyphId(1),
                attempted: GlyphId(2),
            })
        );
        assert_eq!(g.id(), Some(GlyphId(1)));
    }

    #[test]
    fn set_nest_freezes_membership() {
        let mut g = glyph(&[1]);
        g.add_section(SectionId(2), Rectangle::new(10, 0, 5, 5))
            .expect("still transient");

        g.set_nest(NestTag::next());
        assert!(!g.is_transient());

        let err = g.add_section(SectionId(3), Rectangle::new(20, 0, 5, 5));
        assert_eq!(err, Err(GlyphError::FrozenMembership));
        assert_eq!(g.sections().len(), 2);
    }

    #[test]
    fn clearing_shape_resets_grade() {
        let mut g = glyph(&[1]);
        g.set_shape(Some(Shape::NoteHead), Grade::Manual);
        assert_eq!(g.shape(), Some(Shape::NoteHead));
        assert_eq!(g.grade(), Grade::Manual);

        g.set_shape(None, Grade::Algorithmic);
        assert_eq!(g.shape(), None);
        assert_eq!(g.grade(), Grade::Unset);
    }

    #[test]
    fn id_string_reflects_lifecycle() {
        let mut g = glyph(&[1]);
        assert_eq!(g.id_string(), "glyph#transient");

        g.set_id(GlyphId(7)).expect("set id");
        assert_eq!(g.id_string(), "glyph#7");

        g.set_shape(Some(Shape::Clef), Grade::Algorithmic);
        assert_eq!(g.id_string(), "glyph#7[Clef]");
    }

    #[test]
    fn manual_text_overrides_without_discarding() {
        let mut g = glyph(&[1]);
        g.set_text_word(
            "eng".to_string(),
            TextWord::new("piano", Some(TextRole::Direction)),
        );
        assert_eq!(g.text_value(), Some("piano"));
        assert_eq!(g.ocr_language(), Some("eng"));

        g.set_manual_value("forte".to_string());
        assert_eq!(g.text_value(), Some("forte"));
        assert_eq!(g.text_word().map(TextWord::value), Some("piano"));
    }
}

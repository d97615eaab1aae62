//! # Capability Facets
//!
//! The capability views a glyph exposes, modeled as independent traits
//! composed onto the one concrete [`Glyph`](crate::Glyph) entity rather
//! than as an inheritance ladder.
//!
//! - [`GlyphAdministration`]: identity and lifecycle (id, layer, nest
//!   back-reference, transient/virtual state)
//! - [`GlyphContent`]: attached text (recognized word, manual overrides)
//!
//! Geometry rendering and other attachment facets live outside this core.

use crate::{GlyphError, GlyphId, GlyphLayer, NestTag, TextRole, TextWord};

// =============================================================================
// ADMINISTRATION FACET
// =============================================================================

/// The administration facet: glyph identity and its containing nest.
pub trait GlyphAdministration {
    /// The unique glyph id within its containing nest, once registered.
    fn id(&self) -> Option<GlyphId>;

    /// The layer this glyph is part of.
    fn layer(&self) -> GlyphLayer;

    /// Identifying tag of the containing nest. The tag never owns the
    /// nest; it only names it.
    fn nest(&self) -> Option<NestTag>;

    /// A short debug label combining id and shape.
    fn id_string(&self) -> String;

    /// Whether the glyph is transient (not yet inserted into a nest).
    fn is_transient(&self) -> bool {
        self.nest().is_none()
    }

    /// Whether this glyph is virtual (synthesized rather than real).
    fn is_virtual(&self) -> bool;

    /// Assign the unique id.
    ///
    /// # Errors
    /// [`GlyphError::IdentityConflict`] if an id is already set; an id is
    /// assigned at most once.
    fn set_id(&mut self, id: GlyphId) -> Result<(), GlyphError>;

    /// Record the containing nest.
    ///
    /// Side effect: freezes the glyph geometry. Any later membership
    /// mutation is a [`GlyphError::FrozenMembership`] error.
    fn set_nest(&mut self, nest: NestTag);
}

// =============================================================================
// CONTENT FACET
// =============================================================================

/// The content facet: textual meaning of a glyph, if any.
pub trait GlyphContent {
    /// The effective text value: the manual value if any, or the
    /// recognized value otherwise.
    fn text_value(&self) -> Option<&str>;

    /// The effective text role, resolved the same way as the value.
    fn text_role(&self) -> Option<TextRole>;

    /// The recognized word, if OCR ran over this glyph.
    fn text_word(&self) -> Option<&TextWord>;

    /// Language tag that was handed to the recognizer.
    fn ocr_language(&self) -> Option<&str>;

    /// Manually assign a text meaning, keeping any recognition result.
    fn set_manual_value(&mut self, value: String);

    /// Manually assign a text role, keeping any recognition result.
    fn set_manual_role(&mut self, role: TextRole);

    /// Attach the recognizer's result together with the language it was
    /// asked to recognize.
    fn set_text_word(&mut self, ocr_language: String, word: TextWord);
}

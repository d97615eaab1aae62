//! # Shape Vocabulary
//!
//! The closed classification vocabulary and the provenance grade.
//!
//! The registry never classifies anything itself; an external classifier
//! supplies `(Shape, Grade)` pairs and the registry records them. Two
//! values are distinguished by policy:
//! - [`Shape::Noise`] is never touched by bulk reclassification
//! - [`Shape::GlyphPart`] never enters the model's latest-shape memory

use serde::{Deserialize, Serialize};

// =============================================================================
// SHAPE
// =============================================================================

/// Classification result for a glyph.
///
/// This is a closed vocabulary: the recognizable symbols of the pipeline
/// plus two reserved values (`Noise`, `GlyphPart`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// Reserved: glyph judged to be non-symbol ink. Bulk reclassification
    /// skips noise glyphs; reclassifying one must target it explicitly.
    Noise,
    /// Reserved: fragment of a compound still being built. Excluded from
    /// latest-shape memory.
    GlyphPart,
    NoteHead,
    Stem,
    Beam,
    Flag,
    Dot,
    Ledger,
    Clef,
    Rest,
    Accidental,
    Text,
}

impl Shape {
    /// Check for the reserved noise value.
    #[must_use]
    pub const fn is_noise(self) -> bool {
        matches!(self, Self::Noise)
    }

    /// Check for the reserved compound-in-progress marker.
    #[must_use]
    pub const fn is_part(self) -> bool {
        matches!(self, Self::GlyphPart)
    }
}

// =============================================================================
// GRADE
// =============================================================================

/// Provenance of the current shape assignment.
///
/// Grades are policy inputs only. They are never ordered or compared
/// numerically; a manual grade is not "greater" than an algorithmic one,
/// it is a different kind of statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Grade {
    /// No shape has been assigned, or the assignment was cleared.
    #[default]
    Unset,
    /// The shape came from the automatic classifier.
    Algorithmic,
    /// The shape was confirmed or corrected by a human.
    Manual,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_values_are_detected() {
        assert!(Shape::Noise.is_noise());
        assert!(Shape::GlyphPart.is_part());
        assert!(!Shape::NoteHead.is_noise());
        assert!(!Shape::NoteHead.is_part());
    }

    #[test]
    fn grade_defaults_to_unset() {
        assert_eq!(Grade::default(), Grade::Unset);
    }
}

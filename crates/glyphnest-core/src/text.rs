//! # Attached Text
//!
//! Text content attached to a glyph: the recognized word coming from the
//! external OCR collaborator, plus the manual overrides a human may set
//! without discarding the recognition result.

use serde::{Deserialize, Serialize};

// =============================================================================
// LYRIC CHARACTERS
// =============================================================================

/// String equivalent of the character used for elision. (undertie)
pub const ELISION_STRING: &str = "\u{203F}";

/// String equivalent of the character used for extension. (underscore)
pub const EXTENSION_STRING: &str = "_";

/// String equivalent of the character used for hyphen.
pub const HYPHEN_STRING: &str = "-";

// =============================================================================
// TEXT ROLE
// =============================================================================

/// Role a piece of text plays on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TextRole {
    Lyrics,
    Title,
    Direction,
    Number,
    PartName,
    /// Role not determined yet.
    UnknownRole,
}

// =============================================================================
// TEXT WORD
// =============================================================================

/// A recognized word, as delivered by the OCR collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextWord {
    /// The recognized string value.
    value: String,
    /// The role the recognizer inferred, if any.
    role: Option<TextRole>,
}

impl TextWord {
    /// Create a new recognized word.
    #[must_use]
    pub fn new(value: impl Into<String>, role: Option<TextRole>) -> Self {
        Self {
            value: value.into(),
            role,
        }
    }

    /// The recognized string value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The recognizer-inferred role, if any.
    #[must_use]
    pub fn role(&self) -> Option<TextRole> {
        self.role
    }
}

// =============================================================================
// ATTACHED TEXT
// =============================================================================

/// The text state carried by one glyph.
///
/// Manual values override recognized ones at read time; setting an
/// override never discards the recognition result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttachedText {
    /// Manual value override, if any.
    pub(crate) manual_value: Option<String>,
    /// Manual role override, if any.
    pub(crate) manual_role: Option<TextRole>,
    /// The recognized word, if OCR ran over this glyph.
    pub(crate) word: Option<TextWord>,
    /// Language tag handed to the recognizer for `word`.
    pub(crate) ocr_language: Option<String>,
}

impl AttachedText {
    /// Resolve the effective text value: manual override first, else the
    /// recognized value, else none.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.manual_value
            .as_deref()
            .or_else(|| self.word.as_ref().map(TextWord::value))
    }

    /// Resolve the effective role: manual override first, else the
    /// recognizer's role, else none.
    #[must_use]
    pub fn role(&self) -> Option<TextRole> {
        self.manual_role.or_else(|| self.word.as_ref()?.role())
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # Formats Module
//!
//! Binary snapshot format for a nest.
//!
//! Pure byte transforms only; file I/O belongs to callers.

mod snapshot;

pub use snapshot::*;

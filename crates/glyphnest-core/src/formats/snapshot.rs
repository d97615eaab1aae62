//! # Nest Snapshot Format
//!
//! Binary serialization for a whole nest: registered glyphs, the id
//! counter, the region graph, and the current selection.
//!
//! Format: Header (5 bytes) + postcard-serialized payload.
//! - 4 bytes: Magic ("GNST")
//! - 1 byte: Version
//!
//! Header and payload-size validation happen BEFORE payload parsing, so
//! corrupted or oversized data is rejected without allocation.
//!
//! Nest tags are process-local and deliberately not serialized: a
//! restored nest restamps its glyphs with a fresh tag of its own.

use crate::{Glyph, GlyphError, GlyphId, Nest, RegionGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// =============================================================================
// FORMAT CONSTANTS
// =============================================================================

/// Magic bytes for the nest snapshot header.
pub const MAGIC_BYTES: &[u8; 4] = b"GNST";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the payload layout.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum allowed payload size for a snapshot.
///
/// A whole-sheet nest stays far below this; anything larger is corrupted
/// or hostile data and is rejected before deserialization.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 64 * 1024 * 1024; // 64 MB

/// Minimum valid snapshot size (header only).
const MIN_SNAPSHOT_SIZE: usize = 5;

// =============================================================================
// SNAPSHOT HEADER
// =============================================================================

/// The header preceding all snapshot data.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a new header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), GlyphError> {
        if &self.magic != MAGIC_BYTES {
            return Err(GlyphError::Serialization("invalid magic bytes".to_string()));
        }
        if self.version != FORMAT_VERSION {
            return Err(GlyphError::Serialization(format!(
                "unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write the header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read a header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GlyphError> {
        if bytes.len() < MIN_SNAPSHOT_SIZE {
            return Err(GlyphError::Serialization("header too short".to_string()));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZABLE NEST
// =============================================================================

/// Serializable representation of a nest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableNest {
    pub glyphs: Vec<Glyph>,
    pub next_id: u32,
    pub regions: RegionGraph,
    pub selection: Vec<GlyphId>,
}

impl From<&Nest> for SerializableNest {
    fn from(nest: &Nest) -> Self {
        Self {
            glyphs: nest.glyphs().cloned().collect(),
            next_id: nest.next_id(),
            regions: nest.regions().clone(),
            selection: nest.selection().iter().copied().collect(),
        }
    }
}

impl From<SerializableNest> for Nest {
    fn from(sn: SerializableNest) -> Self {
        let selection: BTreeSet<GlyphId> = sn.selection.into_iter().collect();
        Nest::restore(sn.glyphs, sn.next_id, sn.regions, selection)
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a nest to bytes (header + payload). Pure transform, no I/O.
pub fn nest_to_bytes(nest: &Nest) -> Result<Vec<u8>, GlyphError> {
    let header = SnapshotHeader::new();
    let serializable = SerializableNest::from(nest);

    let payload = postcard::to_stdvec(&serializable)
        .map_err(|e| GlyphError::Serialization(e.to_string()))?;

    let mut result = Vec::with_capacity(MIN_SNAPSHOT_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize a nest from bytes. Pure transform, no I/O.
///
/// Size and header validation occur before payload deserialization. The
/// restored nest carries a fresh tag; its glyphs are restamped.
pub fn nest_from_bytes(bytes: &[u8]) -> Result<Nest, GlyphError> {
    if bytes.len() < MIN_SNAPSHOT_SIZE {
        return Err(GlyphError::Serialization(
            "data too short: minimum 5 bytes required".to_string(),
        ));
    }
    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(GlyphError::Serialization(format!(
            "data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[MIN_SNAPSHOT_SIZE..];
    let serializable: SerializableNest = postcard::from_bytes(payload)
        .map_err(|e| GlyphError::Serialization(format!("failed to deserialize nest: {}", e)))?;

    Ok(Nest::from(serializable))
}

// =============================================================================
// TESTS
// =============================================================================

//! Core types shared by the geometry library and the packed R-Tree.
//!
//! This module defines:
//! - Error and result types
//! - The array-slot node type
//! - Statistics and integrity reports
//! - The checksummed binary snapshot

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::rectangle::Rectangle;
use crate::shape::ShapeKind;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in geometry and spatial indexing operations
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("Unsupported shape operation: {left} {operation} {right}")]
    UnsupportedShapeOperation {
        operation: &'static str,
        left: ShapeKind,
        right: ShapeKind,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("No feasible degree for {num_records} records within {bytes_available} bytes")]
    InfeasibleDegree {
        bytes_available: u64,
        num_records: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

// ============================================================================
// Node Types
// ============================================================================

/// One slot of the packed node array.
///
/// A node covers a contiguous run of records in the reordered record stream:
/// `count` records starting at byte `offset`, spanning `size` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub offset: u64,
    pub size: u64,
    pub count: u32,
    pub mbr: Rectangle,
}

impl Node {
    pub fn new(offset: u64, size: u64, count: u32, mbr: Rectangle) -> Self {
        Self {
            offset,
            size,
            count,
            mbr,
        }
    }

    /// Byte range of the covered record run.
    pub fn byte_range(&self) -> std::ops::Range<u64> {
        self.offset..self.offset + self.size
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Shape and occupancy of a built tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    pub height: u32,
    pub degree: u32,
    pub num_nodes: u32,
    pub num_leaves: u32,
    pub num_records: u32,
    /// Slots holding a node, over the whole array
    pub occupied_nodes: u32,
    /// Average occupied-leaf fill as a fraction of `degree` (0.0 - 1.0)
    pub leaf_fill_factor: f64,
}

/// Result of verifying the aggregate bookkeeping of a node array
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Total non-null nodes checked
    pub nodes_checked: u64,
    /// Indices of nodes that failed at least one check
    pub invalid_nodes: Vec<usize>,
    /// Summary of findings
    pub is_valid: bool,
    /// Detailed error messages
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            nodes_checked: 0,
            invalid_nodes: Vec::new(),
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Records a failed check against node `idx` (0 for tree-wide failures).
    pub fn record_error(&mut self, idx: usize, message: String) {
        self.is_valid = false;
        if idx != 0 && self.invalid_nodes.last() != Some(&idx) {
            self.invalid_nodes.push(idx);
        }
        self.errors.push(message);
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Binary Snapshot
// ============================================================================

/// Everything needed to rebuild a tree: the header fields and the node array
/// (slot 0 excluded).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    pub height: u32,
    pub degree: u32,
    pub num_records: u32,
    pub num_nodes: u32,
    pub nodes: Vec<Option<Node>>,
}

/// A snapshot wrapped with a CRC32 checksum for corruption detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotWithChecksum {
    /// CRC32 checksum of the encoded snapshot
    pub checksum: u32,
    /// The actual snapshot data
    pub snapshot: TreeSnapshot,
}

impl SnapshotWithChecksum {
    pub fn new(snapshot: TreeSnapshot) -> SpatialResult<Self> {
        let checksum = Self::calculate_checksum(&snapshot)?;
        Ok(Self { checksum, snapshot })
    }

    /// CRC32 of the bincode encoding of `snapshot`
    pub fn calculate_checksum(snapshot: &TreeSnapshot) -> SpatialResult<u32> {
        let serialized = bincode::serde::encode_to_vec(snapshot, bincode::config::legacy())
            .map_err(|e| SpatialError::Serialization(e.to_string()))?;
        Ok(crc32fast::hash(&serialized))
    }

    /// Verify checksum and consume self to return the snapshot
    pub fn into_snapshot(self) -> SpatialResult<TreeSnapshot> {
        let expected = Self::calculate_checksum(&self.snapshot)?;
        if self.checksum != expected {
            return Err(SpatialError::Serialization(format!(
                "Snapshot checksum mismatch - possible corruption (expected: {:x}, got: {:x})",
                expected, self.checksum
            )));
        }
        Ok(self.snapshot)
    }
}

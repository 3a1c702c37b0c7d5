//! Sort-Tile-Recursive packed R-Tree stored as an implicit node array.
//!
//! This module provides:
//! - Degree selection under a byte budget
//! - One-shot STR bulk loading of any [`crate::Record`]
//! - Conservative window queries returning record ordinals or byte ranges
//! - Text and checksummed binary persistence with integrity checking
//! - Lock-light publication of rebuilt trees

pub mod degree;
pub mod persistence;
pub mod rtree_constants;
pub mod rtree_types;
pub mod shared;
mod rtree_impl;

pub use degree::best_degree;
pub use rtree_constants::{DEFAULT_BYTES_AVAILABLE, MIN_DEGREE, NODE_SIZE, NULL_NODE, TREE_HEADER_SIZE};
pub use rtree_impl::{children_of, refine, ReorderedRecords, StrRTree};
pub use rtree_types::{
    IntegrityReport, Node, SnapshotWithChecksum, SpatialError, SpatialResult, TreeSnapshot,
    TreeStats,
};
pub use shared::SharedIndex;

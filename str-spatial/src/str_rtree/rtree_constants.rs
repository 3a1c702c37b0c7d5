//! Constants for the packed R-Tree layout.

/// Bytes accounted per node: offset (8) + size (8) + count (4) + MBR (4 x 8)
pub const NODE_SIZE: u64 = 8 + 8 + 4 + 32;

/// Bytes accounted for the tree header: height, degree, record and node counts
pub const TREE_HEADER_SIZE: u64 = 4 * 4;

/// Default byte budget (16MB, matching 1024 pages of 16KB)
pub const DEFAULT_BYTES_AVAILABLE: u64 = 1024 * 16 * 1024;

/// Smallest fan-out the tree supports
pub const MIN_DEGREE: u32 = 2;

/// Text token for an unused node slot
pub const NULL_NODE: &str = "null";

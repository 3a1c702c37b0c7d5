//! Build configuration for the packed R-Tree.

use serde::{Deserialize, Serialize};

use crate::str_rtree::DEFAULT_BYTES_AVAILABLE;

/// Options for [`crate::StrRTree::build`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Byte budget for the serialized node array plus header
    pub bytes_available: u64,
    /// Records are already sorted by center x, skip the first sort
    pub presorted_on_x: bool,
}

impl IndexConfig {
    pub fn with_bytes_available(mut self, bytes_available: u64) -> Self {
        self.bytes_available = bytes_available;
        self
    }

    pub fn with_presorted_on_x(mut self, presorted_on_x: bool) -> Self {
        self.presorted_on_x = presorted_on_x;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bytes_available: DEFAULT_BYTES_AVAILABLE,
            presorted_on_x: false,
        }
    }
}

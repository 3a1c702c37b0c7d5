//! # STR Spatial - Geometric Predicates and a Packed R-Tree
//!
//! This crate provides exact 2D geometric predicates over points, segments,
//! rectangles and simple polygons, and a Sort-Tile-Recursive packed R-Tree
//! that indexes a static dataset for window queries.
//!
//! ## Features
//!
//! - **Tolerant Geometry**: All comparisons use a single epsilon, [`EPS`]
//! - **Closed Shape Enum**: `intersects`, `is_edge_intersection` and `contains`
//!   for every pairing of [`Shape`] variants
//! - **Budgeted Fan-Out**: The tree degree is chosen to fit a byte budget
//! - **Implicit Layout**: Nodes live in one flat array, children are computed
//!   from the parent index
//! - **Two-Phase Search**: Conservative tree search followed by exact
//!   refinement with [`refine`]
//! - **Persistence**: Text layout plus a checksummed binary snapshot
//!
//! ## Quick Start
//!
//! ```rust
//! use str_spatial::{IndexConfig, Point, Rectangle, Shape, StrRTree};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let records = vec![
//!     Shape::Point(Point::new(1.0, 1.0)),
//!     Shape::Rectangle(Rectangle::new(4.0, 4.0, 6.0, 5.0)),
//!     Shape::Point(Point::new(9.0, 9.0)),
//! ];
//!
//! let (tree, reordered) = StrRTree::build(records, &IndexConfig::default())?;
//!
//! let window = Shape::Rectangle(Rectangle::new(0.0, 0.0, 5.0, 5.0));
//! let candidates = tree.query(&window);
//! let hits = str_spatial::refine(reordered.records(), &candidates, &window);
//! assert_eq!(hits.len(), 2);
//!
//! // persist and restore the node array
//! let restored = StrRTree::deserialize(&tree.serialize())?;
//! assert_eq!(restored, tree);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod geometry;
pub mod line_segment;
pub mod polygon;
pub mod predicates;
pub mod rectangle;
pub mod shape;
pub mod str_rtree;

// Re-export geometry types
pub use geometry::{approx_eq, approx_zero, Point, Vector, EPS};
pub use line_segment::LineSegment;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use shape::{Record, Shape, ShapeKind};

// Re-export tree types
pub use config::IndexConfig;
pub use str_rtree::{
    best_degree, refine, IntegrityReport, Node, ReorderedRecords, SharedIndex, SpatialError,
    SpatialResult, StrRTree, TreeSnapshot, TreeStats,
};

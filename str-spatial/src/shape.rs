//! The closed set of shapes and the predicates defined between them.
//!
//! [`Shape`] is the unit stored in the tree and the type of every query.
//! `intersects` and `is_edge_intersection` are defined for every pair of
//! kinds and are symmetric. `contains` is only defined where the container
//! can hold the other shape, and returns
//! [`SpatialError::UnsupportedShapeOperation`] otherwise.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::geometry::Point;
use crate::line_segment::LineSegment;
use crate::polygon::Polygon;
use crate::predicates::{
    polygon_boundaries_intersect, polygon_boundary_intersects_segment, polygon_contains_point,
    polygon_contains_polygon, polygon_contains_rectangle, polygon_contains_segment,
    polygon_intersects_polygon, polygon_intersects_rectangle, polygon_intersects_segment,
    rectangle_contains_polygon, rectangle_polygon_boundaries_intersect,
};
use crate::rectangle::Rectangle;
use crate::str_rtree::{SpatialError, SpatialResult};

/// Discriminant of [`Shape`], used in error messages and by the text codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Point,
    LineSegment,
    Rectangle,
    Polygon,
}

impl Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Point => "Point",
            ShapeKind::LineSegment => "LineSegment",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polygon => "Polygon",
        };
        f.write_str(name)
    }
}

impl FromStr for ShapeKind {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(ShapeKind::Point),
            "linesegment" | "segment" => Ok(ShapeKind::LineSegment),
            "rectangle" | "rect" => Ok(ShapeKind::Rectangle),
            "polygon" => Ok(ShapeKind::Polygon),
            other => Err(SpatialError::Serialization(format!(
                "unknown shape kind '{}'",
                other
            ))),
        }
    }
}

/// A 2D shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point(Point),
    LineSegment(LineSegment),
    Rectangle(Rectangle),
    Polygon(Polygon),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Point(_) => ShapeKind::Point,
            Shape::LineSegment(_) => ShapeKind::LineSegment,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// Minimum bounding rectangle.
    pub fn mbr(&self) -> Rectangle {
        match self {
            Shape::Point(p) => Rectangle::new(p.x, p.y, p.x, p.y),
            Shape::LineSegment(s) => s.mbr(),
            Shape::Rectangle(r) => *r,
            Shape::Polygon(g) => g.mbr(),
        }
    }

    pub fn center_point(&self) -> Point {
        match self {
            Shape::Point(p) => *p,
            Shape::LineSegment(s) => s.center_point(),
            Shape::Rectangle(r) => r.center_point(),
            Shape::Polygon(g) => g.center_point(),
        }
    }

    /// `true` for the kinds that enclose a region.
    pub fn has_area(&self) -> bool {
        matches!(self, Shape::Rectangle(_) | Shape::Polygon(_))
    }

    /// Euclidean distance from the shape to `point`; zero on or inside it.
    pub fn distance_to(&self, point: &Point) -> f64 {
        match self {
            Shape::Point(p) => {
                if p == point {
                    0.0
                } else {
                    p.distance_to(point)
                }
            }
            Shape::LineSegment(s) => s.distance_to(point),
            Shape::Rectangle(r) => r.distance_to(point),
            Shape::Polygon(g) => {
                if polygon_contains_point(g, point) {
                    0.0
                } else {
                    g.distance_to_boundary(point)
                }
            }
        }
    }

    /// Returns `true` if the two shapes share at least one point, on the
    /// boundary or in the interior.
    pub fn intersects(&self, other: &Shape) -> bool {
        if !self.mbr().intersects_rectangle(&other.mbr()) {
            return false;
        }

        match (self, other) {
            (Shape::Point(a), Shape::Point(b)) => a == b,
            (Shape::Point(p), Shape::LineSegment(s)) | (Shape::LineSegment(s), Shape::Point(p)) => {
                s.contains_point(p)
            }
            (Shape::Point(p), Shape::Rectangle(r)) | (Shape::Rectangle(r), Shape::Point(p)) => {
                r.contains_point(p)
            }
            (Shape::Point(p), Shape::Polygon(g)) | (Shape::Polygon(g), Shape::Point(p)) => {
                polygon_contains_point(g, p)
            }
            (Shape::LineSegment(a), Shape::LineSegment(b)) => a.intersects_segment(b),
            (Shape::LineSegment(s), Shape::Rectangle(r))
            | (Shape::Rectangle(r), Shape::LineSegment(s)) => r.intersects_segment(s),
            (Shape::LineSegment(s), Shape::Polygon(g))
            | (Shape::Polygon(g), Shape::LineSegment(s)) => polygon_intersects_segment(g, s),
            (Shape::Rectangle(a), Shape::Rectangle(b)) => a.intersects_rectangle(b),
            (Shape::Rectangle(r), Shape::Polygon(g)) | (Shape::Polygon(g), Shape::Rectangle(r)) => {
                polygon_intersects_rectangle(g, r)
            }
            (Shape::Polygon(a), Shape::Polygon(b)) => polygon_intersects_polygon(a, b),
        }
    }

    /// Returns `true` if the boundaries of the two shapes share a point.
    ///
    /// A point and a segment are their own boundary. Unlike
    /// [`Shape::intersects`], a shape strictly inside another does not
    /// edge-intersect it.
    pub fn is_edge_intersection(&self, other: &Shape) -> bool {
        if !self.mbr().intersects_rectangle(&other.mbr()) {
            return false;
        }

        match (self, other) {
            (Shape::Point(a), Shape::Point(b)) => a == b,
            (Shape::Point(p), Shape::LineSegment(s)) | (Shape::LineSegment(s), Shape::Point(p)) => {
                s.contains_point(p)
            }
            (Shape::Point(p), Shape::Rectangle(r)) | (Shape::Rectangle(r), Shape::Point(p)) => {
                r.on_boundary(p)
            }
            (Shape::Point(p), Shape::Polygon(g)) | (Shape::Polygon(g), Shape::Point(p)) => {
                g.on_boundary(p)
            }
            (Shape::LineSegment(a), Shape::LineSegment(b)) => a.intersects_segment(b),
            (Shape::LineSegment(s), Shape::Rectangle(r))
            | (Shape::Rectangle(r), Shape::LineSegment(s)) => r.boundary_intersects_segment(s),
            (Shape::LineSegment(s), Shape::Polygon(g))
            | (Shape::Polygon(g), Shape::LineSegment(s)) => {
                polygon_boundary_intersects_segment(g, s)
            }
            (Shape::Rectangle(a), Shape::Rectangle(b)) => a.is_edge_intersection(b),
            (Shape::Rectangle(r), Shape::Polygon(g)) | (Shape::Polygon(g), Shape::Rectangle(r)) => {
                rectangle_polygon_boundaries_intersect(r, g)
            }
            (Shape::Polygon(a), Shape::Polygon(b)) => polygon_boundaries_intersect(a, b),
        }
    }

    /// Returns `true` if `other` lies entirely within this shape, boundary
    /// included.
    ///
    /// A point contains nothing and a segment cannot contain a region; those
    /// pairings fail with [`SpatialError::UnsupportedShapeOperation`].
    pub fn contains(&self, other: &Shape) -> SpatialResult<bool> {
        let covers = self.mbr().contains_rectangle(&other.mbr());
        let contained = match (self, other) {
            (Shape::Point(_), _)
            | (Shape::LineSegment(_), Shape::Rectangle(_))
            | (Shape::LineSegment(_), Shape::Polygon(_)) => {
                return Err(SpatialError::UnsupportedShapeOperation {
                    operation: "contains",
                    left: self.kind(),
                    right: other.kind(),
                })
            }
            _ if !covers => false,
            (Shape::LineSegment(s), Shape::Point(p)) => s.contains_point(p),
            (Shape::LineSegment(a), Shape::LineSegment(b)) => a.contains_segment(b),
            (Shape::Rectangle(r), Shape::Point(p)) => r.contains_point(p),
            (Shape::Rectangle(r), Shape::LineSegment(s)) => r.contains_segment(s),
            (Shape::Rectangle(a), Shape::Rectangle(b)) => a.contains_rectangle(b),
            (Shape::Rectangle(r), Shape::Polygon(g)) => rectangle_contains_polygon(r, g),
            (Shape::Polygon(g), Shape::Point(p)) => polygon_contains_point(g, p),
            (Shape::Polygon(g), Shape::LineSegment(s)) => polygon_contains_segment(g, s),
            (Shape::Polygon(g), Shape::Rectangle(r)) => polygon_contains_rectangle(g, r),
            (Shape::Polygon(a), Shape::Polygon(b)) => polygon_contains_polygon(a, b),
        };
        Ok(contained)
    }
}

impl From<Point> for Shape {
    fn from(value: Point) -> Self {
        Shape::Point(value)
    }
}

impl From<LineSegment> for Shape {
    fn from(value: LineSegment) -> Self {
        Shape::LineSegment(value)
    }
}

impl From<Rectangle> for Shape {
    fn from(value: Rectangle) -> Self {
        Shape::Rectangle(value)
    }
}

impl From<Polygon> for Shape {
    fn from(value: Polygon) -> Self {
        Shape::Polygon(value)
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Point(p) => write!(f, "POINT{}", p),
            Shape::LineSegment(s) => s.fmt(f),
            Shape::Rectangle(r) => r.fmt(f),
            Shape::Polygon(g) => g.fmt(f),
        }
    }
}

/// Anything the packed tree can index.
///
/// The tree only needs a record's bounding rectangle, a center point to sort
/// by, and the text line the record is written as. The byte length of that
/// line plus a newline is what the tree accounts for in node sizes.
pub trait Record {
    fn mbr(&self) -> Rectangle;

    fn center_point(&self) -> Point {
        self.mbr().center_point()
    }

    fn to_text(&self) -> String;
}

impl Record for Shape {
    fn mbr(&self) -> Rectangle {
        Shape::mbr(self)
    }

    fn center_point(&self) -> Point {
        Shape::center_point(self)
    }

    fn to_text(&self) -> String {
        crate::codec::encode(self)
    }
}

//! Axis-aligned rectangles, used both as shapes and as node MBRs.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::geometry::{approx_eq, Point, EPS};
use crate::line_segment::LineSegment;

/// An axis-aligned rectangle described by its minimum and maximum corners.
///
/// `Rectangle` is both a shape in its own right and the minimum bounding
/// rectangle (MBR) stored in every tree node. All containment and overlap
/// tests are boundary inclusive with [`EPS`] slack.
///
/// # Examples
///
/// ```rust
/// use str_spatial::{Point, Rectangle};
///
/// let mut mbr = Rectangle::empty();
/// mbr.expand_point(&Point::new(1.0, 2.0));
/// mbr.expand_point(&Point::new(4.0, -1.0));
///
/// assert_eq!(mbr, Rectangle::new(1.0, -1.0, 4.0, 2.0));
/// assert!(mbr.contains_point(&Point::new(4.0, 0.0)));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rectangle {
    /// Corner with the smallest coordinates
    pub min_point: Point,
    /// Corner with the largest coordinates
    pub max_point: Point,
}

impl Rectangle {
    /// Creates a rectangle from its minimum and maximum coordinates.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_point: Point::new(min_x, min_y),
            max_point: Point::new(max_x, max_y),
        }
    }

    /// Creates the rectangle spanned by two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    /// The inverted `(+inf, +inf)-(-inf, -inf)` rectangle.
    ///
    /// It contains nothing and is the identity for [`Rectangle::expand`] and
    /// [`Rectangle::union`] on either side.
    pub const fn empty() -> Self {
        Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        )
    }

    /// Returns `true` while the rectangle has not been expanded by anything.
    pub fn is_empty(&self) -> bool {
        self.min_point.x > self.max_point.x || self.min_point.y > self.max_point.y
    }

    /// Finite coordinates and `min <= max` on both axes.
    pub fn is_valid(&self) -> bool {
        self.min_point.is_finite() && self.max_point.is_finite() && !self.is_empty()
    }

    pub fn min_x(&self) -> f64 {
        self.min_point.x
    }

    pub fn min_y(&self) -> f64 {
        self.min_point.y
    }

    pub fn max_x(&self) -> f64 {
        self.max_point.x
    }

    pub fn max_y(&self) -> f64 {
        self.max_point.y
    }

    pub fn width(&self) -> f64 {
        self.max_point.x - self.min_point.x
    }

    pub fn height(&self) -> f64 {
        self.max_point.y - self.min_point.y
    }

    pub fn area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.width() * self.height()
    }

    pub fn center_point(&self) -> Point {
        Point::new(
            (self.min_point.x + self.max_point.x) / 2.0,
            (self.min_point.y + self.max_point.y) / 2.0,
        )
    }

    /// The four corners in ring order, starting at the minimum corner and
    /// going counter-clockwise.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min_point,
            Point::new(self.max_point.x, self.min_point.y),
            self.max_point,
            Point::new(self.min_point.x, self.max_point.y),
        ]
    }

    /// The four boundary edges, bottom, right, top, then left.
    pub fn edges(&self) -> [LineSegment; 4] {
        let [a, b, c, d] = self.corners();
        [
            LineSegment::new(a, b),
            LineSegment::new(b, c),
            LineSegment::new(c, d),
            LineSegment::new(d, a),
        ]
    }

    /// Returns `true` if `point` lies inside or on the boundary.
    pub fn contains_point(&self, point: &Point) -> bool {
        self.min_point.x - point.x < EPS
            && self.min_point.y - point.y < EPS
            && point.x - self.max_point.x < EPS
            && point.y - self.max_point.y < EPS
    }

    /// Returns `true` if `point` lies on one of the four edges.
    pub fn on_boundary(&self, point: &Point) -> bool {
        self.contains_point(point)
            && (approx_eq(point.x, self.min_point.x)
                || approx_eq(point.x, self.max_point.x)
                || approx_eq(point.y, self.min_point.y)
                || approx_eq(point.y, self.max_point.y))
    }

    /// Half-open containment: the left and bottom edges are inside, the right
    /// and top edges are outside.
    ///
    /// Tiling a plane with such rectangles assigns every point to exactly one
    /// tile.
    pub fn upper_open_bounded_contains(&self, point: &Point) -> bool {
        self.min_point.x - point.x < EPS
            && self.min_point.y - point.y < EPS
            && self.max_point.x - point.x >= EPS
            && self.max_point.y - point.y >= EPS
    }

    /// Returns `true` if the rectangles overlap or touch.
    pub fn intersects_rectangle(&self, other: &Rectangle) -> bool {
        self.min_point.x - other.max_point.x < EPS
            && other.min_point.x - self.max_point.x < EPS
            && self.min_point.y - other.max_point.y < EPS
            && other.min_point.y - self.max_point.y < EPS
    }

    /// Returns `true` if `other` lies entirely inside this rectangle.
    pub fn contains_rectangle(&self, other: &Rectangle) -> bool {
        self.contains_point(&other.min_point) && self.contains_point(&other.max_point)
    }

    /// Returns `true` if both endpoints of `segment` lie inside.
    pub fn contains_segment(&self, segment: &LineSegment) -> bool {
        self.contains_point(&segment.p1()) && self.contains_point(&segment.p2())
    }

    /// Returns `true` if `segment` crosses an edge or lies inside.
    pub fn intersects_segment(&self, segment: &LineSegment) -> bool {
        self.boundary_intersects_segment(segment) || self.contains_segment(segment)
    }

    /// Returns `true` if `segment` shares a point with the boundary.
    pub fn boundary_intersects_segment(&self, segment: &LineSegment) -> bool {
        self.edges()
            .iter()
            .any(|edge| edge.intersects_segment(segment))
    }

    /// Returns `true` if the boundaries of the two rectangles share a point.
    ///
    /// A rectangle strictly nested inside another does not edge-intersect it.
    pub fn is_edge_intersection(&self, other: &Rectangle) -> bool {
        if !self.intersects_rectangle(other) {
            return false;
        }

        let corner_on_boundary = self.corners().iter().any(|c| other.on_boundary(c))
            || other.corners().iter().any(|c| self.on_boundary(c));
        if corner_on_boundary {
            return true;
        }

        let theirs = other.edges();
        self.edges()
            .iter()
            .any(|mine| theirs.iter().any(|edge| mine.intersects_segment(edge)))
    }

    /// Grows this rectangle to cover `point`.
    pub fn expand_point(&mut self, point: &Point) {
        self.min_point.x = self.min_point.x.min(point.x);
        self.min_point.y = self.min_point.y.min(point.y);
        self.max_point.x = self.max_point.x.max(point.x);
        self.max_point.y = self.max_point.y.max(point.y);
    }

    /// Grows this rectangle to cover `other`. An empty `other` leaves it
    /// unchanged.
    pub fn expand(&mut self, other: &Rectangle) {
        if other.is_empty() {
            return;
        }
        self.expand_point(&other.min_point);
        self.expand_point(&other.max_point);
    }

    /// The smallest rectangle covering both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let mut result = *self;
        result.expand(other);
        result
    }

    /// Euclidean distance from `point` to the rectangle, zero inside.
    pub fn distance_to(&self, point: &Point) -> f64 {
        let dx = (self.min_point.x - point.x).max(point.x - self.max_point.x).max(0.0);
        let dy = (self.min_point.y - point.y).max(point.y - self.max_point.y).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Rectangle {
    fn eq(&self, other: &Self) -> bool {
        self.min_point == other.min_point && self.max_point == other.max_point
    }
}

impl Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rectangle({}, {}, {}, {})",
            self.min_point.x, self.min_point.y, self.max_point.x, self.max_point.y
        )
    }
}

//! Simple polygons stored as closed rings.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::geometry::Point;
use crate::line_segment::LineSegment;
use crate::rectangle::Rectangle;
use crate::str_rtree::{SpatialError, SpatialResult};

/// A simple polygon given as a closed ring of points.
///
/// The last point repeats the first. Vertices may be listed in either winding
/// order. The bounding coordinates are computed once at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Polygon {
    points: Vec<Point>,
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Polygon {
    /// Creates a polygon from a closed ring.
    ///
    /// Fails with [`SpatialError::InvalidGeometry`] if the ring has fewer than
    /// three distinct vertices, is not closed, or carries a non-finite
    /// coordinate.
    pub fn new(points: Vec<Point>) -> SpatialResult<Self> {
        if points.len() < 4 {
            return Err(SpatialError::InvalidGeometry(format!(
                "polygon ring needs at least 4 points including closure, got {}",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
            return Err(SpatialError::InvalidGeometry(format!(
                "polygon vertex {} is not finite",
                bad
            )));
        }

        let first = points[0];
        let last = points[points.len() - 1];
        if first != last {
            return Err(SpatialError::InvalidGeometry(format!(
                "polygon ring is not closed: first {} last {}",
                first, last
            )));
        }

        let mut distinct: Vec<Point> = Vec::with_capacity(3);
        for point in &points[..points.len() - 1] {
            if distinct.len() == 3 {
                break;
            }
            if !distinct.contains(point) {
                distinct.push(*point);
            }
        }
        if distinct.len() < 3 {
            return Err(SpatialError::InvalidGeometry(format!(
                "polygon needs at least 3 distinct vertices, got {}",
                distinct.len()
            )));
        }

        let mut mbr = Rectangle::empty();
        for point in &points {
            mbr.expand_point(point);
        }

        Ok(Self {
            points,
            min_x: mbr.min_x(),
            min_y: mbr.min_y(),
            max_x: mbr.max_x(),
            max_y: mbr.max_y(),
        })
    }

    /// Creates a polygon from its vertices, closing the ring if needed.
    pub fn from_vertices(mut vertices: Vec<Point>) -> SpatialResult<Self> {
        if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last()) {
            if first != *last {
                vertices.push(first);
            }
        }
        Self::new(vertices)
    }

    /// The closed ring, first point repeated at the end.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The distinct vertices, without the closing point.
    pub fn vertices(&self) -> &[Point] {
        &self.points[..self.points.len() - 1]
    }

    /// Iterates over the ring's edges in order.
    pub fn edges(&self) -> impl Iterator<Item = LineSegment> + '_ {
        self.points
            .windows(2)
            .map(|pair| LineSegment::new(pair[0], pair[1]))
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn mbr(&self) -> Rectangle {
        Rectangle::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Mean of the distinct vertices.
    ///
    /// For concave polygons this point may fall outside the polygon.
    pub fn center_point(&self) -> Point {
        let vertices = self.vertices();
        let n = vertices.len() as f64;
        let (sx, sy) = vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    }

    /// Returns `true` if `point` lies on one of the edges.
    pub fn on_boundary(&self, point: &Point) -> bool {
        self.edges().any(|edge| edge.contains_point(point))
    }

    /// Distance from `point` to the nearest edge.
    pub fn distance_to_boundary(&self, point: &Point) -> f64 {
        self.edges()
            .map(|edge| edge.distance_to(point))
            .fold(f64::INFINITY, f64::min)
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl TryFrom<Vec<Point>> for Polygon {
    type Error = SpatialError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Polygon::new(points)
    }
}

impl From<Polygon> for Vec<Point> {
    fn from(polygon: Polygon) -> Self {
        polygon.points
    }
}

impl Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POLYGON(")?;
        for (i, p) in self.points.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", p.x, p.y)?;
        }
        write!(f, ")")
    }
}

//! Line segments with a cached, normalized line equation.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::geometry::{approx_eq, Point, Vector, EPS};
use crate::rectangle::Rectangle;

/// A line segment between `p1` and `p2`.
///
/// The supporting line is stored as `a·x + b·y + c = 0`, normalized so that
/// `b = 1` for every non-vertical segment and `(a, b, c) = (1, 0, -x)` for a
/// vertical one. The equation is derived once in [`LineSegment::new`]; the
/// endpoints cannot be changed afterwards, so the cached equation always
/// matches them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "SegmentEndpoints", into = "SegmentEndpoints")]
pub struct LineSegment {
    p1: Point,
    p2: Point,
    a: f64,
    b: f64,
    c: f64,
}

#[derive(Serialize, Deserialize)]
struct SegmentEndpoints {
    p1: Point,
    p2: Point,
}

impl From<SegmentEndpoints> for LineSegment {
    fn from(value: SegmentEndpoints) -> Self {
        LineSegment::new(value.p1, value.p2)
    }
}

impl From<LineSegment> for SegmentEndpoints {
    fn from(value: LineSegment) -> Self {
        SegmentEndpoints {
            p1: value.p1,
            p2: value.p2,
        }
    }
}

impl LineSegment {
    /// Creates a segment and derives its line equation.
    pub fn new(p1: Point, p2: Point) -> Self {
        let (a, b, c) = if (p1.x - p2.x).abs() < EPS {
            (1.0, 0.0, -p1.x)
        } else {
            let a = -((p2.y - p1.y) / (p2.x - p1.x));
            (a, 1.0, -a * p1.x - p1.y)
        };
        Self { p1, p2, a, b, c }
    }

    pub fn p1(&self) -> Point {
        self.p1
    }

    pub fn p2(&self) -> Point {
        self.p2
    }

    /// The `(a, b, c)` coefficients of the supporting line.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        (self.a, self.b, self.c)
    }

    pub fn is_vertical(&self) -> bool {
        self.b < EPS
    }

    pub fn length(&self) -> f64 {
        self.p1.distance_to(&self.p2)
    }

    pub fn mbr(&self) -> Rectangle {
        Rectangle::new(
            self.p1.x.min(self.p2.x),
            self.p1.y.min(self.p2.y),
            self.p1.x.max(self.p2.x),
            self.p1.y.max(self.p2.y),
        )
    }

    pub fn center_point(&self) -> Point {
        Point::new((self.p1.x + self.p2.x) / 2.0, (self.p1.y + self.p2.y) / 2.0)
    }

    /// Returns `true` if `point` lies on this segment, endpoints included.
    ///
    /// The point must satisfy the line equation and split the segment into
    /// two parts whose lengths add up to the full length.
    pub fn contains_point(&self, point: &Point) -> bool {
        if self.is_vertical() {
            if (point.x + self.c).abs() > EPS {
                return false;
            }
        } else {
            let y = -(self.a * point.x) - self.c;
            if (y - point.y).abs() > EPS {
                return false;
            }
        }

        let ab = self.length();
        let ap = self.p1.distance_to(point);
        let pb = point.distance_to(&self.p2);
        (ab - (ap + pb)).abs() < EPS
    }

    /// Returns `true` if `point` falls inside the coordinate ranges spanned by
    /// the segment's endpoints, with [`EPS`] slack.
    fn spans(&self, point: &Point) -> bool {
        point.x > self.p1.x.min(self.p2.x) - EPS
            && point.x < self.p1.x.max(self.p2.x) + EPS
            && point.y > self.p1.y.min(self.p2.y) - EPS
            && point.y < self.p1.y.max(self.p2.y) + EPS
    }

    /// Returns a point shared by both segments, if any.
    ///
    /// Endpoint coincidence is checked first. Parallel segments that share no
    /// endpoint never intersect. Otherwise the two line equations are solved
    /// and the solution must fall inside both segments.
    pub fn intersection_point(&self, other: &LineSegment) -> Option<Point> {
        if self.contains_point(&other.p1) {
            return Some(other.p1);
        }
        if self.contains_point(&other.p2) {
            return Some(other.p2);
        }
        if other.contains_point(&self.p1) {
            return Some(self.p1);
        }
        if other.contains_point(&self.p2) {
            return Some(self.p2);
        }

        self.solve(other)
    }

    /// Returns `true` if the two segments share at least one point.
    pub fn intersects_segment(&self, other: &LineSegment) -> bool {
        if self.contains_point(&other.p1)
            || self.contains_point(&other.p2)
            || other.contains_point(&self.p1)
            || other.contains_point(&self.p2)
        {
            return true;
        }

        // solve from both sides so the answer does not depend on argument order
        self.solve(other).is_some() || other.solve(self).is_some()
    }

    fn solve(&self, other: &LineSegment) -> Option<Point> {
        if approx_eq(self.a, other.a) && approx_eq(self.b, other.b) {
            return None;
        }

        let x = (other.b * self.c - self.b * other.c) / (other.a * self.b - self.a * other.b);
        // a vertical line has no y term, read y off the other line
        let y = if self.is_vertical() {
            -(other.a * x) - other.c
        } else {
            -(self.a * x) - self.c
        };
        let candidate = Point::new(x, y);

        if candidate.is_finite() && self.spans(&candidate) && other.spans(&candidate) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Returns `true` if both endpoints of `other` lie on this segment.
    pub fn contains_segment(&self, other: &LineSegment) -> bool {
        self.contains_point(&other.p1) && self.contains_point(&other.p2)
    }

    /// Euclidean distance from `point` to the closest point of the segment.
    pub fn distance_to(&self, point: &Point) -> f64 {
        if self.contains_point(point) {
            return 0.0;
        }

        let p1p = Vector::between(&self.p1, point);
        let p1p2 = Vector::between(&self.p1, &self.p2);
        let norm2 = p1p2.norm2();
        if norm2 < EPS * EPS {
            return point.distance_to(&self.p1);
        }

        // scalar projection of p1p onto p1p2, in units of |p1p2|
        let t = p1p.dot(&p1p2) / norm2;
        if t < 0.0 {
            return point.distance_to(&self.p1);
        }
        if t > 1.0 {
            return point.distance_to(&self.p2);
        }

        point.distance_to(&self.p1.translate(&p1p2.scale(t)))
    }

    /// Position of `point` along the segment as a fraction of its length,
    /// assuming the point lies on the supporting line.
    pub(crate) fn parameter_of(&self, point: &Point) -> f64 {
        let p1p2 = Vector::between(&self.p1, &self.p2);
        let norm2 = p1p2.norm2();
        if norm2 == 0.0 {
            return 0.0;
        }
        Vector::between(&self.p1, point).dot(&p1p2) / norm2
    }
}

impl PartialEq for LineSegment {
    fn eq(&self, other: &Self) -> bool {
        self.p1 == other.p1 && self.p2 == other.p2
    }
}

impl Display for LineSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SEGMENT({} {}, {} {})", self.p1.x, self.p1.y, self.p2.x, self.p2.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_equation_normalization() {
        let s = seg(0.0, 1.0, 2.0, 5.0);
        let (a, b, c) = s.coefficients();
        assert_eq!(b, 1.0);
        assert!((a + 2.0).abs() < EPS);
        assert!((c + 1.0).abs() < EPS);

        let v = seg(3.0, 0.0, 3.0, 10.0);
        assert!(v.is_vertical());
        assert_eq!(v.coefficients(), (1.0, 0.0, -3.0));
    }

    #[test]
    fn test_contains_point() {
        let s = seg(0.0, 0.0, 4.0, 4.0);
        assert!(s.contains_point(&Point::new(2.0, 2.0)));
        assert!(s.contains_point(&Point::new(0.0, 0.0)));
        assert!(s.contains_point(&Point::new(4.0, 4.0)));
        assert!(!s.contains_point(&Point::new(5.0, 5.0))); // on the line, past p2
        assert!(!s.contains_point(&Point::new(2.0, 2.1)));

        let v = seg(1.0, 1.0, 1.0, 3.0);
        assert!(v.contains_point(&Point::new(1.0, 2.0)));
        assert!(!v.contains_point(&Point::new(1.0, 3.5)));
        assert!(!v.contains_point(&Point::new(1.1, 2.0)));
    }

    #[test]
    fn test_crossing_segments() {
        let a = seg(0.0, 0.0, 4.0, 4.0);
        let b = seg(0.0, 4.0, 4.0, 0.0);
        assert!(a.intersects_segment(&b));
        assert_eq!(a.intersection_point(&b), Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_vertical_and_horizontal() {
        let v = seg(2.0, -1.0, 2.0, 5.0);
        let h = seg(0.0, 3.0, 6.0, 3.0);
        assert!(v.intersects_segment(&h));
        assert!(h.intersects_segment(&v));
        assert_eq!(v.intersection_point(&h), Some(Point::new(2.0, 3.0)));
        assert_eq!(h.intersection_point(&v), Some(Point::new(2.0, 3.0)));

        let short = seg(0.0, 6.0, 6.0, 6.0);
        assert!(!v.intersects_segment(&short));
    }

    #[test]
    fn test_parallel_segments() {
        let a = seg(0.0, 0.0, 4.0, 0.0);
        let b = seg(0.0, 1.0, 4.0, 1.0);
        assert!(!a.intersects_segment(&b));

        // collinear and overlapping share endpoints through the fast path
        let c = seg(2.0, 0.0, 6.0, 0.0);
        assert!(a.intersects_segment(&c));

        // collinear and disjoint
        let d = seg(5.0, 0.0, 6.0, 0.0);
        assert!(!a.intersects_segment(&d));
    }

    #[test]
    fn test_touching_at_endpoint() {
        let a = seg(0.0, 0.0, 2.0, 2.0);
        let b = seg(2.0, 2.0, 4.0, 0.0);
        assert!(a.intersects_segment(&b));
        assert_eq!(a.intersection_point(&b), Some(Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_lines_cross_outside_segments() {
        let a = seg(0.0, 0.0, 1.0, 1.0);
        let b = seg(3.0, 0.0, 4.0, -1.0);
        assert!(!a.intersects_segment(&b));
        assert!(a.intersection_point(&b).is_none());
    }

    #[test]
    fn test_distance_to_point() {
        let s = seg(0.0, 0.0, 10.0, 0.0);
        assert!((s.distance_to(&Point::new(5.0, 3.0)) - 3.0).abs() < EPS);
        assert!((s.distance_to(&Point::new(-3.0, 4.0)) - 5.0).abs() < EPS);
        assert!((s.distance_to(&Point::new(13.0, 4.0)) - 5.0).abs() < EPS);
        assert_eq!(s.distance_to(&Point::new(7.0, 0.0)), 0.0);
    }

    #[test]
    fn test_zero_length_segment() {
        let s = seg(1.0, 1.0, 1.0, 1.0);
        assert!(s.contains_point(&Point::new(1.0, 1.0)));
        assert!(!s.contains_point(&Point::new(1.0, 1.5)));
        assert!((s.distance_to(&Point::new(4.0, 5.0)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_mbr_and_center() {
        let s = seg(4.0, 1.0, 0.0, 3.0);
        assert_eq!(s.mbr(), Rectangle::new(0.0, 1.0, 4.0, 3.0));
        assert_eq!(s.center_point(), Point::new(2.0, 2.0));
    }

    #[test]
    fn test_serde_recomputes_equation() {
        let s = seg(0.0, 1.0, 2.0, 5.0);
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("\"a\""));
        let back: LineSegment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert_eq!(back.coefficients(), s.coefficients());
    }
}

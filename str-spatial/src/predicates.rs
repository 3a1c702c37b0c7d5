//! Polygon predicates shared by every shape pairing.
//!
//! Each function here answers one question about a polygon and another
//! primitive. [`crate::shape::Shape`] dispatches to them after its MBR
//! prefilter, so callers normally go through the enum instead.

use crate::geometry::{Point, Vector, EPS};
use crate::line_segment::LineSegment;
use crate::polygon::Polygon;
use crate::rectangle::Rectangle;

/// Returns `true` if `point` lies inside `polygon` or on its boundary.
///
/// A horizontal ray is cast from the point to the right, ending past the
/// polygon's extent. A point on any edge is inside. Otherwise the edges
/// crossing the ray are counted and an odd count means inside. An edge only
/// counts when exactly one of its endpoints lies strictly above the ray, so a
/// ray through a vertex is counted once and horizontal edges never count.
pub fn polygon_contains_point(polygon: &Polygon, point: &Point) -> bool {
    let reach = (polygon.max_x() - polygon.min_x()).max(1.0);
    let far_x = polygon.max_x().max(point.x) + reach;
    let ray = LineSegment::new(*point, Point::new(far_x, point.y));

    let mut crossings = 0usize;
    for edge in polygon.edges() {
        if edge.contains_point(point) {
            return true;
        }

        let straddles = (edge.p1().y > point.y) != (edge.p2().y > point.y);
        if straddles && edge.intersects_segment(&ray) {
            crossings += 1;
        }
    }

    crossings % 2 == 1
}

/// Returns `true` if `segment` shares a point with the boundary of `polygon`.
pub fn polygon_boundary_intersects_segment(polygon: &Polygon, segment: &LineSegment) -> bool {
    polygon.edges().any(|edge| edge.intersects_segment(segment))
}

/// Returns `true` if the boundaries of the two polygons share a point.
pub fn polygon_boundaries_intersect(a: &Polygon, b: &Polygon) -> bool {
    a.edges()
        .any(|edge| polygon_boundary_intersects_segment(b, &edge))
}

/// Returns `true` if `segment` and `polygon` share at least one point.
pub fn polygon_intersects_segment(polygon: &Polygon, segment: &LineSegment) -> bool {
    if polygon_boundary_intersects_segment(polygon, segment) {
        return true;
    }

    // no edge crossing: the segment is entirely inside or entirely outside
    polygon_contains_point(polygon, &segment.p1())
}

/// Returns `true` if `rectangle` and `polygon` share at least one point.
pub fn polygon_intersects_rectangle(polygon: &Polygon, rectangle: &Rectangle) -> bool {
    if rectangle
        .edges()
        .iter()
        .any(|edge| polygon_boundary_intersects_segment(polygon, edge))
    {
        return true;
    }

    // rectangle nested inside the polygon
    if rectangle
        .corners()
        .iter()
        .any(|corner| polygon_contains_point(polygon, corner))
    {
        return true;
    }

    // polygon nested inside the rectangle
    polygon
        .vertices()
        .iter()
        .any(|vertex| rectangle.contains_point(vertex))
}

/// Returns `true` if the two polygons share at least one point.
pub fn polygon_intersects_polygon(a: &Polygon, b: &Polygon) -> bool {
    if polygon_boundaries_intersect(a, b) {
        return true;
    }

    b.vertices().iter().any(|v| polygon_contains_point(a, v))
        || a.vertices().iter().any(|v| polygon_contains_point(b, v))
}

/// Returns `true` if `segment` lies entirely inside `polygon`, boundary
/// included.
///
/// Both endpoints must be inside. The segment is then cut at every point
/// where it meets the polygon boundary, and the midpoint of each piece must
/// also be inside. This rejects segments that leave a concave polygon through
/// a notch and come back in.
pub fn polygon_contains_segment(polygon: &Polygon, segment: &LineSegment) -> bool {
    let p1 = segment.p1();
    let p2 = segment.p2();
    if !polygon_contains_point(polygon, &p1) || !polygon_contains_point(polygon, &p2) {
        return false;
    }

    let length = segment.length();
    if length < EPS {
        return true;
    }

    let mut cuts = vec![0.0, 1.0];
    for edge in polygon.edges() {
        if let Some(hit) = segment.intersection_point(&edge) {
            cuts.push(segment.parameter_of(&hit));
        }
    }
    // collinear overlaps only report one shared point, add the vertices too
    for vertex in polygon.vertices() {
        if segment.contains_point(vertex) {
            cuts.push(segment.parameter_of(vertex));
        }
    }

    cuts.retain(|t| (0.0..=1.0).contains(t));
    cuts.sort_by(f64::total_cmp);
    cuts.dedup_by(|b, a| (*b - *a) * length < EPS);

    let direction = Vector::between(&p1, &p2);
    cuts.windows(2).all(|pair| {
        let mid = p1.translate(&direction.scale((pair[0] + pair[1]) / 2.0));
        polygon_contains_point(polygon, &mid)
    })
}

/// Returns `true` if `rectangle` lies entirely inside `polygon`.
pub fn polygon_contains_rectangle(polygon: &Polygon, rectangle: &Rectangle) -> bool {
    rectangle
        .edges()
        .iter()
        .all(|edge| polygon_contains_segment(polygon, edge))
}

/// Returns `true` if `inner` lies entirely inside `outer`.
pub fn polygon_contains_polygon(outer: &Polygon, inner: &Polygon) -> bool {
    inner
        .edges()
        .all(|edge| polygon_contains_segment(outer, &edge))
}

/// Returns `true` if every vertex of `polygon` lies inside `rectangle`.
///
/// A rectangle is convex, so vertex containment is enough.
pub fn rectangle_contains_polygon(rectangle: &Rectangle, polygon: &Polygon) -> bool {
    polygon
        .vertices()
        .iter()
        .all(|vertex| rectangle.contains_point(vertex))
}

/// Returns `true` if the boundaries of `rectangle` and `polygon` share a point.
pub fn rectangle_polygon_boundaries_intersect(rectangle: &Rectangle, polygon: &Polygon) -> bool {
    rectangle
        .edges()
        .iter()
        .any(|edge| polygon_boundary_intersects_segment(polygon, edge))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(coords: &[(f64, f64)]) -> Polygon {
        Polygon::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect()).unwrap()
    }

    fn house() -> Polygon {
        polygon(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (5.0, 15.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ])
    }

    fn notched() -> Polygon {
        polygon(&[
            (2.0, 4.0),
            (8.0, 5.01922),
            (13.0211, 3.9752),
            (20.0, 11.22112),
            (15.3312, 17.45311),
            (20.00111, 20.5112),
            (8.44444, 24.2222),
            (5.11532, 20.111),
            (8.0, 16.0),
            (2.0, 4.0),
        ])
    }

    fn seg(x1: f64, y1: f64, x2: f64, y2: f64) -> LineSegment {
        LineSegment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[test]
    fn test_ray_cast_interior_and_exterior() {
        let p = house();
        assert!(polygon_contains_point(&p, &Point::new(5.0, 5.0)));
        assert!(!polygon_contains_point(&p, &Point::new(20.0, 20.0)));
        assert!(!polygon_contains_point(&p, &Point::new(4.0, 15.0)));
        assert!(!polygon_contains_point(&p, &Point::new(-1.0, 5.0)));
    }

    #[test]
    fn test_ray_cast_boundary_is_inside() {
        let p = house();
        assert!(polygon_contains_point(&p, &Point::new(0.0, 10.0)));
        assert!(polygon_contains_point(&p, &Point::new(5.0, 15.0)));
        assert!(polygon_contains_point(&p, &Point::new(10.0, 4.0)));
        assert!(polygon_contains_point(&p, &Point::new(2.5, 12.5)));
    }

    #[test]
    fn test_ray_through_vertex() {
        // the ray from (2, 10) passes exactly through the (10, 10) vertex
        let p = house();
        assert!(polygon_contains_point(&p, &Point::new(2.0, 10.0)));
        // the ray from (-3, 15) grazes the apex at (5, 15)
        assert!(!polygon_contains_point(&p, &Point::new(-3.0, 15.0)));
    }

    #[test]
    fn test_ray_along_horizontal_edge() {
        let square = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        assert!(!polygon_contains_point(&square, &Point::new(-2.0, 0.0)));
        assert!(!polygon_contains_point(&square, &Point::new(-2.0, 4.0)));
        assert!(polygon_contains_point(&square, &Point::new(2.0, 4.0)));
    }

    #[test]
    fn test_ray_reaches_past_far_polygons() {
        let far = polygon(&[(1e6, 1e6), (1e6 + 2.0, 1e6), (1e6 + 1.0, 1e6 + 2.0), (1e6, 1e6)]);
        assert!(polygon_contains_point(&far, &Point::new(1e6 + 1.0, 1e6 + 1.0)));
        assert!(!polygon_contains_point(&far, &Point::new(1e6 - 5.0, 1e6 + 1.0)));
    }

    #[test]
    fn test_concave_segment_containment() {
        let p = notched();
        let s = seg(6.0, 5.0, 6.0, 20.0);
        assert!(polygon_intersects_segment(&p, &s));
        assert!(!polygon_contains_segment(&p, &s));

        let inside = seg(10.0, 6.0, 15.0, 10.0);
        assert!(polygon_contains_segment(&p, &inside));
    }

    #[test]
    fn test_segment_along_edge_is_contained() {
        let square = polygon(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]);
        assert!(polygon_contains_segment(&square, &seg(1.0, 0.0, 3.0, 0.0)));
        assert!(polygon_contains_segment(&square, &seg(0.0, 0.0, 4.0, 4.0)));
        assert!(!polygon_contains_segment(&square, &seg(1.0, 1.0, 5.0, 1.0)));
    }

    #[test]
    fn test_segment_intersection() {
        let p = house();
        assert!(polygon_intersects_segment(&p, &seg(-5.0, 5.0, 15.0, 5.0)));
        assert!(polygon_intersects_segment(&p, &seg(2.0, 2.0, 3.0, 3.0)));
        assert!(!polygon_intersects_segment(&p, &seg(11.0, 0.0, 11.0, 20.0)));
    }

    #[test]
    fn test_rectangle_intersection() {
        let p = house();
        assert!(polygon_intersects_rectangle(&p, &Rectangle::new(8.0, 8.0, 12.0, 12.0)));
        assert!(polygon_intersects_rectangle(&p, &Rectangle::new(2.0, 2.0, 3.0, 3.0)));
        assert!(polygon_intersects_rectangle(&p, &Rectangle::new(-5.0, -5.0, 20.0, 20.0)));
        // inside the MBR, outside the sloped roof
        assert!(!polygon_intersects_rectangle(&p, &Rectangle::new(0.0, 14.0, 1.0, 15.0)));
    }

    #[test]
    fn test_polygon_intersection() {
        let p = house();
        let overlapping = polygon(&[(8.0, 8.0), (14.0, 8.0), (14.0, 14.0), (8.0, 8.0)]);
        let nested = polygon(&[(2.0, 2.0), (4.0, 2.0), (3.0, 4.0), (2.0, 2.0)]);
        let apart = polygon(&[(30.0, 30.0), (34.0, 30.0), (32.0, 34.0), (30.0, 30.0)]);

        assert!(polygon_intersects_polygon(&p, &overlapping));
        assert!(polygon_intersects_polygon(&p, &nested));
        assert!(polygon_intersects_polygon(&nested, &p));
        assert!(!polygon_intersects_polygon(&p, &apart));
    }

    #[test]
    fn test_polygon_containment() {
        let p = notched();
        // every vertex is inside but an edge crosses the notch
        let across_notch = polygon(&[(6.0, 6.0), (7.0, 6.0), (6.5, 19.0), (6.0, 6.0)]);
        assert!(across_notch.vertices().iter().all(|v| polygon_contains_point(&p, v)));
        assert!(!polygon_contains_polygon(&p, &across_notch));

        let small = polygon(&[(10.0, 6.0), (14.0, 7.0), (12.0, 10.0), (10.0, 6.0)]);
        assert!(polygon_contains_polygon(&p, &small));
    }

    #[test]
    fn test_rectangle_containment() {
        let p = house();
        assert!(polygon_contains_rectangle(&p, &Rectangle::new(1.0, 1.0, 9.0, 9.0)));
        assert!(polygon_contains_rectangle(&p, &Rectangle::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!polygon_contains_rectangle(&p, &Rectangle::new(1.0, 1.0, 9.0, 14.0)));

        let r = Rectangle::new(0.0, 0.0, 20.0, 20.0);
        assert!(rectangle_contains_polygon(&r, &p));
        assert!(!rectangle_contains_polygon(&Rectangle::new(0.0, 0.0, 10.0, 10.0), &p));
    }

    #[test]
    fn test_boundary_predicates() {
        let p = house();
        assert!(rectangle_polygon_boundaries_intersect(&p.mbr(), &p));
        assert!(!rectangle_polygon_boundaries_intersect(&Rectangle::new(2.0, 2.0, 3.0, 3.0), &p));

        let nested = polygon(&[(2.0, 2.0), (4.0, 2.0), (3.0, 4.0), (2.0, 2.0)]);
        assert!(!polygon_boundaries_intersect(&p, &nested));
        let touching = polygon(&[(10.0, 0.0), (12.0, 0.0), (11.0, 2.0), (10.0, 0.0)]);
        assert!(polygon_boundaries_intersect(&p, &touching));
    }
}

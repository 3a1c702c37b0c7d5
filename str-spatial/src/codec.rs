//! Line-oriented text encoding of shapes.
//!
//! Every shape is written as comma separated numbers on a single line:
//!
//! | kind          | layout                        |
//! |---------------|-------------------------------|
//! | `Point`       | `x,y`                         |
//! | `LineSegment` | `x1,y1,x2,y2`                 |
//! | `Rectangle`   | `minX,minY,maxX,maxY`         |
//! | `Polygon`     | `n,x1,y1,...,xn,yn`           |
//!
//! The line carries no kind tag; the reader must know which kind a file
//! holds. Floats are written in their shortest round-trip form.

use crate::geometry::Point;
use crate::line_segment::LineSegment;
use crate::polygon::Polygon;
use crate::rectangle::Rectangle;
use crate::shape::{Shape, ShapeKind};
use crate::str_rtree::{SpatialError, SpatialResult};

/// Encodes a shape as a single text line without the trailing newline.
pub fn encode(shape: &Shape) -> String {
    let mut out = String::new();
    match shape {
        Shape::Point(p) => push_points(&mut out, &[*p]),
        Shape::LineSegment(s) => push_points(&mut out, &[s.p1(), s.p2()]),
        Shape::Rectangle(r) => push_points(&mut out, &[r.min_point, r.max_point]),
        Shape::Polygon(g) => {
            out.push_str(&format!("{},", g.points().len()));
            push_points(&mut out, g.points());
        }
    }
    out
}

fn push_points(out: &mut String, points: &[Point]) {
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!("{},{}", p.x, p.y));
    }
}

/// Decodes a line produced by [`encode`] for a shape of the given kind.
pub fn decode(kind: ShapeKind, line: &str) -> SpatialResult<Shape> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();

    match kind {
        ShapeKind::Point => {
            let v = parse_exact(kind, &fields, 2)?;
            Ok(Shape::Point(Point::new(v[0], v[1])))
        }
        ShapeKind::LineSegment => {
            let v = parse_exact(kind, &fields, 4)?;
            Ok(Shape::LineSegment(LineSegment::new(
                Point::new(v[0], v[1]),
                Point::new(v[2], v[3]),
            )))
        }
        ShapeKind::Rectangle => {
            let v = parse_exact(kind, &fields, 4)?;
            Ok(Shape::Rectangle(Rectangle::new(v[0], v[1], v[2], v[3])))
        }
        ShapeKind::Polygon => {
            let count: usize = fields
                .first()
                .ok_or_else(|| malformed(kind, line, "empty line"))?
                .trim()
                .parse()
                .map_err(|_| malformed(kind, line, "bad point count"))?;
            let expected = count
                .checked_mul(2)
                .ok_or_else(|| malformed(kind, line, "bad point count"))?;
            let v = parse_exact(kind, &fields[1..], expected)?;
            let points = v.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect();
            Ok(Shape::Polygon(Polygon::new(points)?))
        }
    }
}

fn parse_exact(kind: ShapeKind, fields: &[&str], expected: usize) -> SpatialResult<Vec<f64>> {
    if fields.len() != expected {
        return Err(SpatialError::Serialization(format!(
            "{} expects {} numbers, found {}",
            kind,
            expected,
            fields.len()
        )));
    }
    fields
        .iter()
        .map(|f| {
            f.trim().parse::<f64>().map_err(|e| {
                SpatialError::Serialization(format!("{}: invalid number '{}': {}", kind, f, e))
            })
        })
        .collect()
}

fn malformed(kind: ShapeKind, line: &str, reason: &str) -> SpatialError {
    SpatialError::Serialization(format!("malformed {} line '{}': {}", kind, line, reason))
}

impl Shape {
    /// Text encoding of this shape, see [`encode`].
    pub fn to_text(&self) -> String {
        encode(self)
    }

    /// Parses a text line of the given kind, see [`decode`].
    pub fn from_text(kind: ShapeKind, line: &str) -> SpatialResult<Shape> {
        decode(kind, line)
    }
}

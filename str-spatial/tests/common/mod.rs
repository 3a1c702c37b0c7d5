#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;
use str_spatial::{LineSegment, Point, Polygon, Rectangle, Shape};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn random_point(rng: &mut StdRng, extent: f64) -> Point {
    Point::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent))
}

pub fn random_rectangle(rng: &mut StdRng, extent: f64, max_side: f64) -> Rectangle {
    let min = random_point(rng, extent);
    Rectangle::new(
        min.x,
        min.y,
        min.x + rng.gen_range(0.0..max_side),
        min.y + rng.gen_range(0.0..max_side),
    )
}

pub fn random_segment(rng: &mut StdRng, extent: f64, max_len: f64) -> LineSegment {
    let p1 = random_point(rng, extent);
    let p2 = Point::new(
        p1.x + rng.gen_range(-max_len..max_len),
        p1.y + rng.gen_range(-max_len..max_len),
    );
    LineSegment::new(p1, p2)
}

/// Star-shaped polygon around a random center, so the ring never
/// self-intersects. Concave whenever the radii vary enough.
pub fn random_polygon(rng: &mut StdRng, extent: f64, radius: f64) -> Polygon {
    let center = random_point(rng, extent);
    let n = rng.gen_range(3..9);
    let vertices = (0..n)
        .map(|i| {
            let angle = TAU * i as f64 / n as f64;
            let r = radius * rng.gen_range(0.3..1.0);
            Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
        })
        .collect();
    Polygon::from_vertices(vertices).expect("star-shaped ring is valid")
}

pub fn random_shape(rng: &mut StdRng, extent: f64, scale: f64) -> Shape {
    match rng.gen_range(0..4) {
        0 => Shape::Point(random_point(rng, extent)),
        1 => Shape::LineSegment(random_segment(rng, extent, scale)),
        2 => Shape::Rectangle(random_rectangle(rng, extent, scale)),
        _ => Shape::Polygon(random_polygon(rng, extent, scale)),
    }
}

pub fn random_shapes(seed: u64, count: usize, extent: f64, scale: f64) -> Vec<Shape> {
    let mut rng = rng(seed);
    (0..count)
        .map(|_| random_shape(&mut rng, extent, scale))
        .collect()
}

/// Ordinals of every record intersecting `query`, by exhaustive scan.
pub fn brute_force(records: &[Shape], query: &Shape) -> Vec<u64> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.intersects(query))
        .map(|(i, _)| i as u64)
        .collect()
}

pub fn union_mbr(records: &[Shape]) -> Rectangle {
    let mut mbr = Rectangle::empty();
    for record in records {
        mbr.expand(&record.mbr());
    }
    mbr
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

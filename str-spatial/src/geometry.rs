//! Point and vector value types.
//!
//! Every shape in this crate is built from [`Point`]s, and every predicate
//! compares coordinates through the tolerance helpers defined here. Two
//! coordinates are considered equal when their difference lies strictly
//! inside `(-EPS, EPS)`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display};

/// Tolerance used for every floating point comparison in the crate.
pub const EPS: f64 = 1e-9;

/// Returns `true` if `a` and `b` differ by less than [`EPS`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    let diff = a - b;
    diff > -EPS && diff < EPS
}

/// Returns `true` if `v` lies strictly inside `(-EPS, EPS)`.
#[inline]
pub fn approx_zero(v: f64) -> bool {
    v > -EPS && v < EPS
}

/// Compares two coordinates under the crate tolerance.
#[inline]
pub fn approx_cmp(a: f64, b: f64) -> Ordering {
    let diff = a - b;
    if diff < -EPS {
        Ordering::Less
    } else if diff > EPS {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

/// A 2D point.
///
/// Equality and ordering are tolerant: two points are equal when both
/// coordinate differences are within [`EPS`], and ordering is lexicographic
/// (x, then y) under the same tolerance. Because tolerant equality is not
/// transitive, `Point` deliberately implements neither `Eq` nor `Hash`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Tolerant lexicographic comparison, x first then y.
    pub fn compare(&self, other: &Point) -> Ordering {
        approx_cmp(self.x, other.x).then_with(|| approx_cmp(self.y, other.y))
    }

    /// `self >= other` under tolerant lexicographic order.
    pub fn is_gte(&self, other: &Point) -> bool {
        self.compare(other) != Ordering::Less
    }

    /// `self <= other` under tolerant lexicographic order.
    pub fn is_ste(&self, other: &Point) -> bool {
        self.compare(other) != Ordering::Greater
    }

    /// `self > other` under tolerant lexicographic order.
    pub fn is_gt(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// `self < other` under tolerant lexicographic order.
    pub fn is_st(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Returns this point moved by `vector`.
    pub fn translate(&self, vector: &Vector) -> Point {
        Point::new(self.x + vector.x, self.y + vector.y)
    }

    /// Both coordinates are finite (neither NaN nor infinite).
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A 2D vector, typically the difference between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector pointing from `from` to `to`.
    pub fn between(from: &Point, to: &Point) -> Self {
        Self::new(to.x - from.x, to.y - from.y)
    }

    pub fn scale(&self, s: f64) -> Vector {
        Vector::new(self.x * s, self.y * s)
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(&self, other: &Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn reverse(&self) -> Vector {
        Vector::new(-self.x, -self.y)
    }

    /// Squared magnitude.
    pub fn norm2(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn magnitude(&self) -> f64 {
        self.norm2().sqrt()
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn unit_vector(&self) -> Option<Vector> {
        let magnitude = self.magnitude();
        if approx_zero(magnitude) {
            None
        } else {
            Some(Vector::new(self.x / magnitude, self.y / magnitude))
        }
    }
}

//! 2-D Points and Vectors

use crate::pbrt::*;
use std::ops::{Add, Index, Mul, Sub};

/// A 2-D point containing `Float` values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2f {
    /// X-coordinate.
    pub x: Float,

    /// Y-coordinate.
    pub y: Float,
}

/// A 2-D point containing integer values. Used for pixel coordinates.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point2i {
    /// X-coordinate.
    pub x: i32,

    /// Y-coordinate.
    pub y: i32,
}

impl Point2f {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub const fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }

    /// Returns the integer pixel containing this point.
    pub fn floor(&self) -> Point2i {
        Point2i::new(self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl Point2i {
    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<Point2i> for Point2f {
    /// Convert an integer point to floating point.
    ///
    /// * `p` - The integer point.
    fn from(p: Point2i) -> Self {
        Self::new(p.x as Float, p.y as Float)
    }
}

impl Add for Point2f {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2f {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<Float> for Point2f {
    type Output = Self;

    fn mul(self, f: Float) -> Self {
        Self::new(self.x * f, self.y * f)
    }
}

impl Index<usize> for Point2f {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Invalid index {} for Point2f", i),
        }
    }
}

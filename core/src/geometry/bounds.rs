//! Bounding boxes

use super::{Point2i, Point3f};
use crate::pbrt::*;

/// An integer 2-D axis-aligned rectangle. `p_max` is exclusive.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Bounds2i {
    /// Minimum corner (inclusive).
    pub p_min: Point2i,

    /// Maximum corner (exclusive).
    pub p_max: Point2i,
}

impl Bounds2i {
    /// Creates a new rectangle.
    ///
    /// * `p_min` - Minimum corner (inclusive).
    /// * `p_max` - Maximum corner (exclusive).
    pub fn new(p_min: Point2i, p_max: Point2i) -> Self {
        Self { p_min, p_max }
    }

    /// Returns the width.
    pub fn width(&self) -> i32 {
        (self.p_max.x - self.p_min.x).max(0)
    }

    /// Returns the height.
    pub fn height(&self) -> i32 {
        (self.p_max.y - self.p_min.y).max(0)
    }

    /// Returns the number of pixels covered.
    pub fn area(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// Returns true if the point lies inside the rectangle.
    ///
    /// * `p` - The point.
    pub fn contains(&self, p: &Point2i) -> bool {
        p.x >= self.p_min.x && p.x < self.p_max.x && p.y >= self.p_min.y && p.y < self.p_max.y
    }

    /// Returns the pixels in scanline order.
    pub fn pixels(&self) -> impl Iterator<Item = Point2i> + '_ {
        (self.p_min.y..self.p_max.y)
            .flat_map(move |y| (self.p_min.x..self.p_max.x).map(move |x| Point2i::new(x, y)))
    }
}

/// A 3-D axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum corner.
    pub p_min: Point3f,

    /// Maximum corner.
    pub p_max: Point3f,
}

impl Default for Bounds3f {
    /// Returns an empty (inverted) box so that any union replaces it.
    fn default() -> Self {
        Self {
            p_min: Point3f::new(INFINITY, INFINITY, INFINITY),
            p_max: Point3f::new(-INFINITY, -INFINITY, -INFINITY),
        }
    }
}

impl Bounds3f {
    /// Creates a new bounding box enclosing two points.
    ///
    /// * `p1` - First point.
    /// * `p2` - Second point.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: p1.min(&p2),
            p_max: p1.max(&p2),
        }
    }

    /// Returns true if the box does not enclose anything.
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    /// Returns a box enclosing this box and a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: self.p_min.min(p),
            p_max: self.p_max.max(p),
        }
    }

    /// Returns a box enclosing both boxes.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: self.p_min.min(&other.p_min),
            p_max: self.p_max.max(&other.p_max),
        }
    }

    /// Returns the center and radius of a sphere enclosing the box.
    pub fn bounding_sphere(&self) -> (Point3f, Float) {
        if self.is_empty() {
            return (Point3f::ZERO, 0.0);
        }
        let center = (self.p_min + self.p_max) * 0.5;
        (center, center.distance(&self.p_max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn bounds2i_pixels_in_scanline_order() {
        let b = Bounds2i::new(Point2i::new(1, 1), Point2i::new(3, 2));
        let pixels: Vec<Point2i> = b.pixels().collect();
        assert_eq!(pixels, vec![Point2i::new(1, 1), Point2i::new(2, 1)]);
        assert_eq!(b.area(), 2);
    }

    #[test]
    fn bounding_sphere_of_unit_cube() {
        let b = Bounds3f::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 1.0, 1.0));
        let (c, r) = b.bounding_sphere();
        assert_eq!(c, Point3f::new(0.5, 0.5, 0.5));
        assert!(approx_eq!(Float, r, 0.75_f32.sqrt(), epsilon = 1e-6));
    }

    #[test]
    fn empty_bounds_union() {
        let b = Bounds3f::default();
        assert!(b.is_empty());
        let b = b.union_point(&Point3f::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.p_min, b.p_max);
    }
}

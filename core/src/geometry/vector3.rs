//! 3-D Vectors

use crate::pbrt::*;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// A 3-D vector containing `Float` values.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vector3f {
    /// X-coordinate.
    pub x: Float,

    /// Y-coordinate.
    pub y: Float,

    /// Z-coordinate.
    pub z: Float,
}

/// Points share the vector representation.
pub type Point3f = Vector3f;

/// Surface normals share the vector representation.
pub type Normal3f = Vector3f;

impl Vector3f {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new 3-D vector.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    /// * `z` - Z-coordinate.
    pub const fn new(x: Float, y: Float, z: Float) -> Self {
        Self { x, y, z }
    }

    /// Returns true if either coordinate is NaN.
    pub fn has_nans(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Returns the dot product with another vector.
    ///
    /// * `other` - The other vector.
    #[inline(always)]
    pub fn dot(&self, other: &Self) -> Float {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Returns the absolute value of the dot product with another vector.
    ///
    /// * `other` - The other vector.
    #[inline(always)]
    pub fn abs_dot(&self, other: &Self) -> Float {
        self.dot(other).abs()
    }

    /// Returns the cross product with another vector.
    ///
    /// * `other` - The other vector.
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            (self.y * other.z) - (self.z * other.y),
            (self.z * other.x) - (self.x * other.z),
            (self.x * other.y) - (self.y * other.x),
        )
    }

    /// Returns the square of the vector's length.
    #[inline(always)]
    pub fn length_squared(&self) -> Float {
        self.dot(self)
    }

    /// Returns the vector's length.
    #[inline(always)]
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns the unit vector.
    pub fn normalize(&self) -> Self {
        *self / self.length()
    }

    /// Returns the distance between two points.
    ///
    /// * `other` - The other point.
    pub fn distance(&self, other: &Self) -> Float {
        (*self - *other).length()
    }

    /// Returns the square of the distance between two points.
    ///
    /// * `other` - The other point.
    pub fn distance_squared(&self, other: &Self) -> Float {
        (*self - *other).length_squared()
    }

    /// Returns a new vector containing absolute values of the components.
    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Return the component-wise minimum coordinate values with another vector.
    ///
    /// * `other` - The other vector.
    pub fn min(&self, other: &Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Return the component-wise maximum coordinate values with another vector.
    ///
    /// * `other` - The other vector.
    pub fn max(&self, other: &Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Flip the vector so it lies in the same hemisphere as `v`.
    ///
    /// * `v` - The reference vector.
    pub fn face_forward(&self, v: &Self) -> Self {
        if self.dot(v) < 0.0 {
            -*self
        } else {
            *self
        }
    }
}

/// Construct two vectors orthogonal to the unit vector `v1` that together
/// with it form an orthonormal basis.
///
/// * `v1` - The first unit vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if v1.x.abs() > v1.y.abs() {
        Vector3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}

/// Returns the direction with spherical coordinates `(theta, phi)` in the
/// frame given by the three axes.
///
/// * `sin_theta` - sin(θ).
/// * `cos_theta` - cos(θ).
/// * `phi`       - φ.
/// * `x`         - Basis vector for the x-axis.
/// * `y`         - Basis vector for the y-axis.
/// * `z`         - Basis vector for the z-axis.
pub fn spherical_direction_in_coord_frame(
    sin_theta: Float,
    cos_theta: Float,
    phi: Float,
    x: &Vector3f,
    y: &Vector3f,
    z: &Vector3f,
) -> Vector3f {
    sin_theta * phi.cos() * *x + sin_theta * phi.sin() * *y + cos_theta * *z
}

impl Add for Vector3f {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Vector3f {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Vector3f {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl SubAssign for Vector3f {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul<Float> for Vector3f {
    type Output = Self;

    fn mul(self, f: Float) -> Self {
        Self::new(self.x * f, self.y * f, self.z * f)
    }
}

impl Mul<Vector3f> for Float {
    type Output = Vector3f;

    fn mul(self, v: Vector3f) -> Vector3f {
        v * self
    }
}

impl MulAssign<Float> for Vector3f {
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Div<Float> for Vector3f {
    type Output = Self;

    fn div(self, f: Float) -> Self {
        debug_assert!(f != 0.0);
        let inv = 1.0 / f;
        self * inv
    }
}

impl DivAssign<Float> for Vector3f {
    fn div_assign(&mut self, f: Float) {
        *self = *self / f;
    }
}

impl Neg for Vector3f {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Index<usize> for Vector3f {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid index {} for Vector3f", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn cross_of_axes() {
        let x = Vector3f::new(1.0, 0.0, 0.0);
        let y = Vector3f::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn face_forward_flips() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let v = Vector3f::new(0.0, 0.0, -1.0);
        assert_eq!(n.face_forward(&v), v);
        assert_eq!(n.face_forward(&n), n);
    }

    proptest! {
        #[test]
        fn coordinate_system_is_orthonormal(
            x in -1.0..1.0f32,
            y in -1.0..1.0f32,
            z in -1.0..1.0f32,
        ) {
            let v = Vector3f::new(x, y, z);
            prop_assume!(v.length() > 0.1);
            let v1 = v.normalize();
            let (v2, v3) = coordinate_system(&v1);
            prop_assert!(approx_eq!(Float, v1.dot(&v2), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v1.dot(&v3), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v2.dot(&v3), 0.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v2.length(), 1.0, epsilon = 1e-5));
            prop_assert!(approx_eq!(Float, v3.length(), 1.0, epsilon = 1e-5));
        }
    }
}

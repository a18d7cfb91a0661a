//! RGB Spectrum

use crate::pbrt::*;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub};

/// Number of RGB samples.
pub const RGB_SAMPLES: usize = 3;

/// Luminance weights for linear RGB (Rec. 709 primaries).
const Y_WEIGHT: [Float; 3] = [0.212671, 0.715160, 0.072169];

/// A linear RGB colour value.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    /// The RGB components.
    c: [Float; RGB_SAMPLES],
}

impl RGBSpectrum {
    /// Black.
    pub const ZERO: Self = Self { c: [0.0; 3] };

    /// White.
    pub const ONE: Self = Self { c: [1.0; 3] };

    /// Create a new `RGBSpectrum` with a constant value.
    ///
    /// * `v` - The value.
    pub const fn new(v: Float) -> Self {
        Self { c: [v; 3] }
    }

    /// Create a new `RGBSpectrum` from components.
    ///
    /// * `r` - Red.
    /// * `g` - Green.
    /// * `b` - Blue.
    pub const fn rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the RGB components.
    pub fn to_rgb(&self) -> [Float; 3] {
        self.c
    }

    /// Returns true if the values are zero everywhere.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }

    /// Returns true if any component is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns true if every component is finite.
    pub fn is_finite(&self) -> bool {
        self.c.iter().all(|v| v.is_finite())
    }

    /// Returns the luminance.
    pub fn y(&self) -> Float {
        self.c.iter().zip(Y_WEIGHT.iter()).map(|(c, w)| c * w).sum()
    }

    /// Returns the maximum component value.
    pub fn max_component_value(&self) -> Float {
        self.c[0].max(self.c[1]).max(self.c[2])
    }

    /// Takes the square root of all components.
    pub fn sqrt(&self) -> Self {
        Self::rgb(self.c[0].sqrt(), self.c[1].sqrt(), self.c[2].sqrt())
    }

    /// Clamps the components to `[low, high]`.
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        Self::rgb(
            clamp(self.c[0], low, high),
            clamp(self.c[1], low, high),
            clamp(self.c[2], low, high),
        )
    }

    fn map2(self, other: Self, f: impl Fn(Float, Float) -> Float) -> Self {
        Self::rgb(
            f(self.c[0], other.c[0]),
            f(self.c[1], other.c[1]),
            f(self.c[2], other.c[2]),
        )
    }
}

impl From<[Float; 3]> for RGBSpectrum {
    /// Create a `RGBSpectrum` from RGB components.
    ///
    /// * `c` - The components.
    fn from(c: [Float; 3]) -> Self {
        Self { c }
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.map2(other, |a, b| a + b)
    }
}

impl AddAssign for RGBSpectrum {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.map2(other, |a, b| a - b)
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        self.map2(other, |a, b| a * b)
    }
}

impl MulAssign for RGBSpectrum {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    fn mul(self, f: Float) -> Self {
        Self::rgb(self.c[0] * f, self.c[1] * f, self.c[2] * f)
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    fn mul(self, s: RGBSpectrum) -> RGBSpectrum {
        s * self
    }
}

impl MulAssign<Float> for RGBSpectrum {
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Div for RGBSpectrum {
    type Output = Self;

    /// Component-wise division. Division by a zero component yields zero.
    fn div(self, other: Self) -> Self {
        self.map2(other, |a, b| if b != 0.0 { a / b } else { 0.0 })
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    fn div(self, f: Float) -> Self {
        debug_assert!(f != 0.0 && !f.is_nan());
        self * (1.0 / f)
    }
}

impl DivAssign<Float> for RGBSpectrum {
    fn div_assign(&mut self, f: Float) {
        *self = *self / f;
    }
}

impl Index<usize> for RGBSpectrum {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for RGBSpectrum {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn white_has_unit_luminance() {
        assert!(approx_eq!(Float, RGBSpectrum::ONE.y(), 1.0, epsilon = 1e-5));
    }

    #[test]
    fn black_and_finite() {
        assert!(RGBSpectrum::ZERO.is_black());
        assert!(!RGBSpectrum::rgb(0.0, 0.1, 0.0).is_black());
        assert!(!RGBSpectrum::rgb(Float::NAN, 0.0, 0.0).is_finite());
        assert!(RGBSpectrum::rgb(Float::NAN, 0.0, 0.0).has_nans());
        assert!(!RGBSpectrum::rgb(INFINITY, 0.0, 0.0).is_finite());
    }

    #[test]
    fn max_component() {
        assert_eq!(RGBSpectrum::rgb(0.2, 0.7, 0.1).max_component_value(), 0.7);
    }
}

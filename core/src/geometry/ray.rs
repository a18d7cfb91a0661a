//! Rays

use super::{Point3f, Vector3f};
use crate::pbrt::*;

/// A Ray
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray.
    pub t_max: Float,

    /// Auxilliary rays offset by one pixel in x and y direction.
    pub differentials: Option<RayDifferential>,
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Point3f::ZERO, Vector3f::ZERO, INFINITY)
    }
}

impl Ray {
    /// Returns a ray with no differentials.
    ///
    /// * `o`      - Origin.
    /// * `d`      - Direction.
    /// * `t_max`  - Maximum extent of the ray.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float) -> Self {
        Self {
            o,
            d,
            t_max,
            differentials: None,
        }
    }

    /// Returns the point at a given parameter along the ray.
    ///
    /// * `t` - The parameter.
    #[inline(always)]
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

/// Origins and directions of the rays through the neighbouring pixels.
#[derive(Copy, Clone, Debug, Default)]
pub struct RayDifferential {
    /// Origin of the ray offset in x.
    pub rx_origin: Point3f,

    /// Origin of the ray offset in y.
    pub ry_origin: Point3f,

    /// Direction of the ray offset in x.
    pub rx_direction: Vector3f,

    /// Direction of the ray offset in y.
    pub ry_direction: Vector3f,
}

impl RayDifferential {
    /// Create a new ray differential.
    ///
    /// * `rx_origin`    - Origin of the ray offset in x.
    /// * `ry_origin`    - Origin of the ray offset in y.
    /// * `rx_direction` - Direction of the ray offset in x.
    /// * `ry_direction` - Direction of the ray offset in y.
    pub fn new(
        rx_origin: Point3f,
        ry_origin: Point3f,
        rx_direction: Vector3f,
        ry_direction: Vector3f,
    ) -> Self {
        Self {
            rx_origin,
            ry_origin,
            rx_direction,
            ry_direction,
        }
    }
}

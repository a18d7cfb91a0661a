//! Surface Interactions

use super::Hit;
use crate::geometry::*;
use crate::light::*;
use crate::material::*;
use crate::reflection::*;
use crate::spectrum::*;
use std::sync::Arc;

/// SurfaceInteraction represents geometry of a particular point on a surface.
#[derive(Clone)]
pub struct SurfaceInteraction {
    /// The common interaction data.
    pub hit: Hit,

    /// The uv coordinates from surface parametrization.
    pub uv: Point2f,

    /// Shading geometry.
    pub shading: Shading,

    /// The BSDF, available after `compute_scattering_functions()`.
    pub bsdf: Option<BSDF>,

    /// The material of the primitive that was hit.
    pub material: Option<Arc<Material>>,

    /// The area light attached to the primitive that was hit.
    pub area_light: Option<ArcLight>,
}

impl SurfaceInteraction {
    /// Create a new surface interaction.
    ///
    /// * `p`    - Point of interaction.
    /// * `uv`   - The uv coordinates from surface parametrization.
    /// * `wo`   - The negative ray direction.
    /// * `n`    - Surface normal.
    /// * `dpdu` - Parametric partial derivative of the point ∂p/∂u.
    pub fn new(p: Point3f, uv: Point2f, wo: Vector3f, n: Normal3f, dpdu: Vector3f) -> Self {
        Self {
            hit: Hit::new(p, wo, n),
            uv,
            shading: Shading::new(n, dpdu),
            bsdf: None,
            material: None,
            area_light: None,
        }
    }

    /// Initializes the BSDF from the material, if any. Surfaces without a
    /// material are boundaries between nothing and nothing and get no BSDF.
    pub fn compute_scattering_functions(&mut self) {
        if let Some(material) = self.material.clone() {
            material.compute_scattering_functions(self);
        }
    }

    /// Returns the emitted radiance at a surface point intersected by a ray
    /// for an area light.
    ///
    /// * `w` - The outgoing direction.
    pub fn le(&self, w: &Vector3f) -> Spectrum {
        match self.area_light.as_ref() {
            Some(area_light) => area_light.l(&self.hit, w),
            None => Spectrum::ZERO,
        }
    }
}

/// Shading geometry used for perturbed values.
#[derive(Copy, Clone, Debug, Default)]
pub struct Shading {
    /// Shading normal.
    pub n: Normal3f,

    /// Tangent perpendicular to `n`.
    pub dpdu: Vector3f,
}

impl Shading {
    /// Returns a new shading frame. The tangent is made perpendicular to the
    /// normal, falling back to an arbitrary tangent when `dpdu` is
    /// degenerate.
    ///
    /// * `n`    - Shading normal.
    /// * `dpdu` - Parametric partial derivative of the point ∂p/∂u.
    pub fn new(n: Normal3f, dpdu: Vector3f) -> Self {
        let t = dpdu - n * n.dot(&dpdu);
        let dpdu = if t.length_squared() > 1e-12 {
            t.normalize()
        } else {
            coordinate_system(&n).0
        };
        Self { n, dpdu }
    }
}

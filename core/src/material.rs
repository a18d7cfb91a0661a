//! Material

use crate::interaction::*;
use crate::reflection::*;
use crate::spectrum::*;

/// Surface materials. The set is closed so they are dispatched by matching.
#[derive(Clone, Debug)]
pub enum Material {
    /// Purely diffuse surface.
    Matte {
        /// Diffuse reflectance.
        kd: Spectrum,
    },

    /// Perfect specular mirror.
    Mirror {
        /// Reflectance.
        kr: Spectrum,
    },

    /// Thin diffuse surface that both reflects and transmits.
    Translucent {
        /// Diffuse reflectance.
        kd: Spectrum,

        /// Diffuse transmittance.
        kt: Spectrum,
    },
}

impl Material {
    /// Returns a matte material.
    ///
    /// * `kd` - Diffuse reflectance.
    pub fn matte(kd: Spectrum) -> Self {
        Self::Matte { kd: kd.clamp(0.0, 1.0) }
    }

    /// Returns a mirror material.
    ///
    /// * `kr` - Reflectance.
    pub fn mirror(kr: Spectrum) -> Self {
        Self::Mirror { kr: kr.clamp(0.0, 1.0) }
    }

    /// Returns a translucent material. The sum of reflectance and
    /// transmittance is clamped so the surface does not create energy.
    ///
    /// * `kd` - Diffuse reflectance.
    /// * `kt` - Diffuse transmittance.
    pub fn translucent(kd: Spectrum, kt: Spectrum) -> Self {
        let kd = kd.clamp(0.0, 1.0);
        let kt = kt.clamp(0.0, 1.0);
        let total = (kd + kt).max_component_value();
        if total > 1.0 {
            Self::Translucent {
                kd: kd / total,
                kt: kt / total,
            }
        } else {
            Self::Translucent { kd, kt }
        }
    }

    /// Initializes representations of the light-scattering properties of the
    /// material at the intersection point on the surface.
    ///
    /// * `si` - The surface interaction at the intersection.
    pub fn compute_scattering_functions(&self, si: &mut SurfaceInteraction) {
        let mut bsdf = BSDF::new(si);
        match self {
            Self::Matte { kd } => {
                if !kd.is_black() {
                    bsdf.add(BxDF::LambertianReflection(LambertianReflection::new(*kd)));
                }
            }
            Self::Mirror { kr } => {
                if !kr.is_black() {
                    bsdf.add(BxDF::SpecularReflection(SpecularReflection::new(*kr)));
                }
            }
            Self::Translucent { kd, kt } => {
                if !kd.is_black() {
                    bsdf.add(BxDF::LambertianReflection(LambertianReflection::new(*kd)));
                }
                if !kt.is_black() {
                    bsdf.add(BxDF::LambertianTransmission(LambertianTransmission::new(
                        *kt,
                    )));
                }
            }
        }
        si.bsdf = Some(bsdf);
    }
}

//! Reflection and surface scattering models

use crate::geometry::*;
use crate::pbrt::*;
use crate::sampling::*;
use crate::spectrum::*;

mod bsdf;
mod bxdf_sample;
mod bxdf_type;
mod lambertian_reflection;
mod lambertian_transmission;
mod specular_reflection;

// Re-export
pub use bsdf::*;
pub use bxdf_sample::*;
pub use bxdf_type::*;
pub use lambertian_reflection::*;
pub use lambertian_transmission::*;
pub use specular_reflection::*;

/// BxDF for BRDFs and BTDFs.
///
/// The set of scattering models is closed, so they are dispatched by
/// matching on the variant instead of through trait objects.
#[derive(Clone, Debug)]
pub enum BxDF {
    LambertianReflection(LambertianReflection),
    LambertianTransmission(LambertianTransmission),
    SpecularReflection(SpecularReflection),
}

impl BxDF {
    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        match self {
            BxDF::LambertianReflection(bxdf) => bxdf.get_type(),
            BxDF::LambertianTransmission(bxdf) => bxdf.get_type(),
            BxDF::SpecularReflection(bxdf) => bxdf.get_type(),
        }
    }

    /// Returns true if every flag of this BxDF is contained in `t`.
    ///
    /// * `t` - The reflection model to compare.
    pub fn matches_flags(&self, t: BxDFType) -> bool {
        t.contains(self.get_type())
    }

    /// Returns the value of the distribution function for the given pair of
    /// directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        match self {
            BxDF::LambertianReflection(bxdf) => bxdf.f(wo, wi),
            BxDF::LambertianTransmission(bxdf) => bxdf.f(wo, wi),
            BxDF::SpecularReflection(_) => Spectrum::ZERO,
        }
    }

    /// Samples an incident direction for the given outgoing direction.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> BxDFSample {
        match self {
            BxDF::LambertianTransmission(bxdf) => bxdf.sample_f(wo, u),
            BxDF::SpecularReflection(bxdf) => bxdf.sample_f(wo, u),
            BxDF::LambertianReflection(_) => {
                // Cosine-sample the hemisphere, flipping the direction if necessary.
                let mut wi = cosine_sample_hemisphere(u);
                if wo.z < 0.0 {
                    wi.z *= -1.0;
                }
                let pdf = self.pdf(wo, &wi);
                BxDFSample::new(self.f(wo, &wi), pdf, wi, self.get_type())
            }
        }
    }

    /// Evaluates the PDF for the sampling method.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        match self {
            BxDF::LambertianTransmission(bxdf) => bxdf.pdf(wo, wi),
            BxDF::SpecularReflection(_) => 0.0,
            BxDF::LambertianReflection(_) => {
                if same_hemisphere(wo, wi) {
                    abs_cos_theta(wi) * INV_PI
                } else {
                    0.0
                }
            }
        }
    }
}

/// Returns cos(θ) of a direction in the shading coordinate system.
///
/// * `w` - The direction.
#[inline(always)]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns |cos(θ)| of a direction in the shading coordinate system.
///
/// * `w` - The direction.
#[inline(always)]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    w.z.abs()
}

/// Returns true if two directions in the shading coordinate system lie in
/// the same hemisphere.
///
/// * `w`  - First direction.
/// * `wp` - Second direction.
#[inline(always)]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

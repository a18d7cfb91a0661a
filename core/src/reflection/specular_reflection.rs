//! Specular Reflection

use super::*;

/// BRDF for a perfect mirror. All light arriving along one direction leaves
/// along its reflection about the normal.
#[derive(Clone, Debug)]
pub struct SpecularReflection {
    /// Scale factor applied to the reflected light.
    r: Spectrum,
}

impl SpecularReflection {
    /// Create a new instance of `SpecularReflection`.
    ///
    /// * `r` - Spectrum used to scale the reflected color.
    pub fn new(r: Spectrum) -> Self {
        Self { r }
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        BxDFType::BSDF_REFLECTION | BxDFType::BSDF_SPECULAR
    }

    /// Returns the mirror direction. The PDF is reported as 1 with the value
    /// divided by |cos(θi)| so that the usual `f * cos / pdf` estimate yields
    /// the reflectance.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - Unused.
    pub fn sample_f(&self, wo: &Vector3f, _u: &Point2f) -> BxDFSample {
        let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
        let cos = abs_cos_theta(&wi);
        if cos == 0.0 {
            return BxDFSample::new(Spectrum::ZERO, 0.0, wi, self.get_type());
        }
        BxDFSample::new(self.r / cos, 1.0, wi, self.get_type())
    }
}

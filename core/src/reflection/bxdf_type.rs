//! BxDF Type

use bitflags::bitflags;

bitflags! {
    /// Stores combinations of reflection models.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct BxDFType: u8 {
        const BSDF_REFLECTION = 1;
        const BSDF_TRANSMISSION = 2;
        const BSDF_DIFFUSE = 4;
        const BSDF_GLOSSY = 8;
        const BSDF_SPECULAR = 16;
        const BSDF_ALL = 31;
    }
}

impl BxDFType {
    /// Tests a single type flag and returns whether it is set or not.
    ///
    /// * `flag` - BxDFType flag.
    pub fn matches(&self, flag: Self) -> bool {
        self.intersects(flag)
    }
}

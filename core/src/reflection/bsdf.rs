//! BSDF

use super::*;
use crate::interaction::*;
use crate::rng::ONE_MINUS_EPSILON;

/// Maximum number of BxDFs that can be stored in `BSDF`.
pub const MAX_BXDFS: usize = 8;

/// BSDF interface represents a collection of BRDFs and BTDFs.
#[derive(Clone, Debug)]
pub struct BSDF {
    /// The shading normal. It is the third axis in the orthonormal
    /// coordinate system and defines the hemispheres for integrating
    /// incident illumination.
    pub ns: Normal3f,

    /// The geometric normal defined by surface geometry.
    pub ng: Normal3f,

    /// First axis for the orthonormal coordinate system.
    pub ss: Vector3f,

    /// Second axis for the orthonormal coordinate system.
    pub ts: Vector3f,

    /// The `BxDFs`.
    pub bxdfs: Vec<BxDF>,
}

impl BSDF {
    /// Creates a new `BSDF` with an empty set of `BxDF`s.
    ///
    /// * `si` - The differential geometry at the point on a surface.
    pub fn new(si: &SurfaceInteraction) -> Self {
        let ns = si.shading.n;
        let ss = si.shading.dpdu.normalize();
        Self {
            ns,
            ng: si.hit.n,
            ss,
            ts: ns.cross(&ss),
            bxdfs: Vec::with_capacity(MAX_BXDFS),
        }
    }

    /// Add a `BxDF`.
    ///
    /// * `bxdf` - The `BxDF`.
    pub fn add(&mut self, bxdf: BxDF) {
        assert!(
            self.bxdfs.len() < MAX_BXDFS,
            "Cannot add BxDFs. BSDF maximum limit {} reached.",
            MAX_BXDFS
        );
        self.bxdfs.push(bxdf);
    }

    /// Returns the number of `BxDF`s that match the given type.
    ///
    /// * `bxdf_type` - The `BxDFType` to match.
    pub fn num_components(&self, bxdf_type: BxDFType) -> usize {
        self.bxdfs
            .iter()
            .filter(|b| b.matches_flags(bxdf_type))
            .count()
    }

    /// Returns the union of the flags of every `BxDF`.
    pub fn get_flags(&self) -> BxDFType {
        self.bxdfs
            .iter()
            .fold(BxDFType::empty(), |acc, b| acc | b.get_type())
    }

    /// Returns true if every component is a Dirac delta distribution.
    pub fn is_delta(&self) -> bool {
        !self.bxdfs.is_empty()
            && self
                .bxdfs
                .iter()
                .all(|b| b.get_type().contains(BxDFType::BSDF_SPECULAR))
    }

    /// Transforms a vector from world space to local space.
    ///
    /// * `v` - The vector to transform.
    pub fn world_to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.ss), v.dot(&self.ts), v.dot(&self.ns))
    }

    /// Transforms a vector from local space to world space.
    ///
    /// * `v` - The vector to transform.
    pub fn local_to_world(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(
            self.ss.x * v.x + self.ts.x * v.y + self.ns.x * v.z,
            self.ss.y * v.x + self.ts.y * v.y + self.ns.y * v.z,
            self.ss.z * v.x + self.ts.z * v.y + self.ns.z * v.z,
        )
    }

    /// Returns the BSDF evaluated for a pair of directions.
    ///
    /// * `wo_w`      - Outgoing direction in world-space.
    /// * `wi_w`      - Incident direction in world-space.
    /// * `bxdf_type` - The `BxDFType` to evaluate.
    pub fn f(&self, wo_w: &Vector3f, wi_w: &Vector3f, bxdf_type: BxDFType) -> Spectrum {
        let wi = self.world_to_local(wi_w);
        let wo = self.world_to_local(wo_w);
        if wo.z == 0.0 {
            return Spectrum::ZERO;
        }

        let reflect = wi_w.dot(&self.ng) * wo_w.dot(&self.ng) > 0.0;
        self.sum_f(&wo, &wi, reflect, bxdf_type)
    }

    /// Samples an incident direction for the outgoing direction. One matching
    /// component is picked uniformly using the first sample dimension, which
    /// is then remapped back to [0, 1).
    ///
    /// * `wo_w`      - Outgoing direction in world-space.
    /// * `u`         - The 2D uniform random values.
    /// * `bxdf_type` - The `BxDFType` to sample.
    pub fn sample_f(&self, wo_w: &Vector3f, u: &Point2f, bxdf_type: BxDFType) -> BxDFSample {
        // Choose which `BxDF` to sample.
        let matching_comps = self.num_components(bxdf_type);
        if matching_comps == 0 {
            return BxDFSample::default();
        }
        let comp = ((u[0] * matching_comps as Float).floor() as usize).min(matching_comps - 1);
        let bxdf = match self
            .bxdfs
            .iter()
            .filter(|b| b.matches_flags(bxdf_type))
            .nth(comp)
        {
            Some(b) => b,
            None => return BxDFSample::default(),
        };

        // Remap BxDF sample `u` to `[0,1)^2`.
        let u_remapped = Point2f::new(
            (u[0] * matching_comps as Float - comp as Float).min(ONE_MINUS_EPSILON),
            u[1],
        );

        let wo = self.world_to_local(wo_w);
        if wo.z == 0.0 {
            return BxDFSample::default();
        }

        let sampled_type = bxdf.get_type();
        let sample = bxdf.sample_f(&wo, &u_remapped);
        if sample.pdf == 0.0 {
            return BxDFSample::new(Spectrum::ZERO, 0.0, Vector3f::ZERO, sampled_type);
        }
        let wi_world = self.local_to_world(&sample.wi);

        let is_specular = sampled_type.contains(BxDFType::BSDF_SPECULAR);

        // Compute overall PDF with all matching BxDFs.
        let mut pdf = sample.pdf;
        if !is_specular && matching_comps > 1 {
            pdf = self
                .bxdfs
                .iter()
                .filter(|b| b.matches_flags(bxdf_type))
                .map(|b| b.pdf(&wo, &sample.wi))
                .sum();
        }
        if matching_comps > 1 {
            pdf /= matching_comps as Float;
        }

        // Compute value of BSDF for sampled direction.
        let f = if is_specular {
            sample.f
        } else {
            let reflect = wi_world.dot(&self.ng) * wo_w.dot(&self.ng) > 0.0;
            self.sum_f(&wo, &sample.wi, reflect, bxdf_type)
        };
        BxDFSample::new(f, pdf, wi_world, sampled_type)
    }

    /// Evaluates the PDF of sampling `wi_w` given `wo_w`.
    ///
    /// * `wo_w`      - Outgoing direction in world-space.
    /// * `wi_w`      - Incident direction in world-space.
    /// * `bxdf_type` - The `BxDFType` to evaluate.
    pub fn pdf(&self, wo_w: &Vector3f, wi_w: &Vector3f, bxdf_type: BxDFType) -> Float {
        let wo = self.world_to_local(wo_w);
        let wi = self.world_to_local(wi_w);
        if wo.z == 0.0 {
            return 0.0;
        }

        let (matching_comps, pdf) = self
            .bxdfs
            .iter()
            .filter(|b| b.matches_flags(bxdf_type))
            .fold((0, 0.0), |(n, pdf), b| (n + 1, pdf + b.pdf(&wo, &wi)));
        if matching_comps > 0 {
            pdf / matching_comps as Float
        } else {
            0.0
        }
    }

    fn sum_f(&self, wo: &Vector3f, wi: &Vector3f, reflect: bool, bxdf_type: BxDFType) -> Spectrum {
        let mut l = Spectrum::ZERO;
        for bxdf in self.bxdfs.iter() {
            let t = bxdf.get_type();
            if bxdf.matches_flags(bxdf_type)
                && ((reflect && t.contains(BxDFType::BSDF_REFLECTION))
                    || (!reflect && t.contains(BxDFType::BSDF_TRANSMISSION)))
            {
                l += bxdf.f(wo, wi);
            }
        }
        l
    }
}

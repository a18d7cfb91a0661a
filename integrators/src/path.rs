//! Path Integrator

use lucent_core::camera::*;
use lucent_core::geometry::*;
use lucent_core::integrator::*;
use lucent_core::interaction::*;
use lucent_core::light::*;
use lucent_core::pbrt::*;
use lucent_core::reflection::*;
use lucent_core::sampler::*;
use lucent_core::sampling::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;

/// Settings for the path tracer.
#[derive(Copy, Clone, Debug)]
pub struct PathConfig {
    /// Maximum number of bounces.
    pub max_depth: usize,

    /// Samples taken per pixel.
    pub samples_per_pixel: usize,

    /// Seed for the per-worker random streams.
    pub seed: u64,

    /// Direct lighting strategy.
    pub direct_lighting: DirectLighting,

    /// Light sampling strategy.
    pub light_strategy: LightSampleStrategy,

    /// Sample new directions from the BSDF. When off, directions come from a
    /// cosine weighted hemisphere or the uniform sphere depending on which
    /// hemispheres the BSDF scatters into.
    pub bsdf_sampling: bool,

    /// Russian roulette is applied once the largest throughput channel drops
    /// below this value.
    pub rr_threshold: Float,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            samples_per_pixel: 16,
            seed: 0,
            direct_lighting: DirectLighting::Mis,
            light_strategy: LightSampleStrategy::Uniform,
            bsdf_sampling: true,
            rr_threshold: 1.0,
        }
    }
}

/// Implements path tracing algorithm.
pub struct PathIntegrator {
    /// Common data for sampler integrators.
    pub data: SamplerIntegratorData,

    /// Direct lighting strategy.
    direct_lighting: DirectLighting,

    /// Light sampling strategy.
    light_strategy: LightSampleStrategy,

    /// Whether directions are sampled from the BSDF.
    bsdf_sampling: bool,

    /// Russian roulette threshold used to terminate path sampling.
    rr_threshold: Float,

    /// Light distribution. Set in `preprocess()`.
    light_distribution: LightDistribution,
}

impl PathIntegrator {
    /// Create a new `PathIntegrator`.
    ///
    /// * `config` - The settings.
    pub fn new(config: PathConfig) -> Result<Self, RenderError> {
        if config.rr_threshold.is_nan() || config.rr_threshold < 0.0 {
            return Err(RenderError::invalid(
                "rr-threshold",
                format!("{} is not a non-negative number", config.rr_threshold),
            ));
        }
        Ok(Self {
            data: SamplerIntegratorData::new(
                config.max_depth,
                config.samples_per_pixel,
                config.seed,
            )?,
            direct_lighting: config.direct_lighting,
            light_strategy: config.light_strategy,
            bsdf_sampling: config.bsdf_sampling,
            rr_threshold: config.rr_threshold,
            light_distribution: LightDistribution::new(config.light_strategy, &[]),
        })
    }
}

impl Integrator for PathIntegrator {
    fn name(&self) -> &'static str {
        "path"
    }

    /// Builds the light distribution.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene) -> Result<(), RenderError> {
        if scene.lights.is_empty() {
            warn!("Scene has no lights. Only emitting surfaces hit directly will be visible.");
        }
        self.light_distribution = LightDistribution::new(self.light_strategy, &scene.lights);
        Ok(())
    }

    fn render(&self, scene: &Scene, ctx: &mut RenderContext) -> Result<(), RenderError> {
        self.render_tiles(scene, ctx)
    }
}

impl SamplerIntegrator for PathIntegrator {
    fn get_data(&self) -> &SamplerIntegratorData {
        &self.data
    }

    /// Returns the radiance arriving at the camera through a raster position.
    ///
    /// * `p_raster` - Raster position of the sample.
    /// * `scene`    - The scene.
    /// * `camera`   - The camera.
    /// * `sampler`  - The sampler.
    fn li(
        &self,
        p_raster: &Point2f,
        scene: &Scene,
        camera: &RasterCamera,
        sampler: &mut dyn Sampler,
    ) -> Spectrum {
        let mut ray = camera.generate_ray_differential(p_raster);
        let mut l = Spectrum::ZERO;
        let mut beta = Spectrum::ONE;
        let mut specular_bounce = false;

        let mut bounces = 0_usize;
        loop {
            trace!("Path tracer bounce {bounces}, current L = {l:?}, beta = {beta:?}");

            // Find closest ray intersection or return background radiance.
            let isect = scene.intersect(&mut ray);

            // Possibly add emitted light at intersection. Later bounces
            // account for it through direct lighting.
            if bounces == 0 || specular_bounce {
                match isect.as_ref() {
                    Some(si) => l += beta * si.le(&(-ray.d)),
                    None => {
                        for light in scene.infinite_lights.iter() {
                            l += beta * light.le(&ray);
                        }
                    }
                }
            }

            // Terminate path if ray escaped or max_depth was reached.
            let mut si = match isect {
                Some(si) if bounces < self.data.max_depth => si,
                _ => break,
            };

            // Compute scattering functions and pass through surfaces without a
            // material.
            si.compute_scattering_functions();
            let bsdf = match si.bsdf.as_ref() {
                Some(bsdf) => bsdf,
                None => {
                    ray = si.hit.spawn_ray(&ray.d);
                    continue;
                }
            };

            // Sample illumination from lights to find path contribution.
            // (But skip this for perfectly specular BSDFs.)
            if bsdf.num_components(BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR) > 0 {
                let ld = uniform_sample_one_light(
                    &si,
                    scene,
                    sampler,
                    &self.light_distribution,
                    self.direct_lighting,
                );
                l += beta * ld;
            }

            // Sample BSDF to get new path direction.
            let wo = si.hit.wo;
            let u = sampler.get_2d();
            let BxDFSample {
                f,
                pdf,
                wi,
                bxdf_type,
            } = if self.bsdf_sampling {
                bsdf.sample_f(&wo, &u, BxDFType::BSDF_ALL)
            } else {
                sample_fallback(bsdf, &si, &u)
            };
            if f.is_black() || pdf == 0.0 {
                break;
            }

            beta *= f * wi.abs_dot(&si.shading.n) / pdf;
            debug_assert!(beta.y() >= 0.0);
            specular_bounce = bxdf_type.contains(BxDFType::BSDF_SPECULAR);
            ray = si.hit.spawn_ray(&wi);

            // Possibly terminate the path with Russian roulette.
            if beta.max_component_value() < self.rr_threshold {
                match russian_roulette(beta, sampler.get_1d()) {
                    Some(b) => beta = b,
                    None => break,
                }
            }

            bounces += 1;
        }
        l
    }
}

/// Applies Russian roulette to a path throughput. The path is terminated
/// with probability `q = max(0.05, 1 - max channel)`. Surviving paths have
/// their throughput divided by `1 - q` so the estimate stays unbiased.
///
/// * `beta` - Current path throughput.
/// * `u`    - Uniform sample in [0, 1).
pub fn russian_roulette(beta: Spectrum, u: Float) -> Option<Spectrum> {
    let q = (1.0 - beta.max_component_value()).max(0.05);
    if u < q {
        None
    } else {
        Some(beta / (1.0 - q))
    }
}

/// Samples a new direction without using the BSDF's own sampling routine.
/// Surfaces that both reflect and transmit use the uniform sphere. Others use
/// a cosine weighted hemisphere on the side they scatter into. Specular lobes
/// cannot be reached this way.
///
/// * `bsdf` - The BSDF.
/// * `si`   - The surface interaction.
/// * `u`    - Sample value.
fn sample_fallback(bsdf: &BSDF, si: &SurfaceInteraction, u: &Point2f) -> BxDFSample {
    let flags = bsdf.get_flags();
    let reflect = flags.contains(BxDFType::BSDF_REFLECTION);
    let transmit = flags.contains(BxDFType::BSDF_TRANSMISSION);
    let wo = si.hit.wo;

    let (wi, pdf) = if reflect && transmit {
        (uniform_sample_sphere(u), uniform_sphere_pdf())
    } else {
        let n = if reflect {
            si.shading.n.face_forward(&wo)
        } else {
            -si.shading.n.face_forward(&wo)
        };
        let w = cosine_sample_hemisphere(u);
        let (s, t) = coordinate_system(&n);
        (w.x * s + w.y * t + w.z * n, cosine_hemisphere_pdf(w.z))
    };

    BxDFSample::new(
        bsdf.f(&wo, &wi, BxDFType::BSDF_ALL),
        pdf,
        wi,
        BxDFType::empty(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use lucent_core::material::*;
    use proptest::prelude::*;

    #[test]
    fn roulette_keeps_bright_paths_most_of_the_time() {
        let beta = Spectrum::new(0.99);
        assert!(russian_roulette(beta, 0.04).is_none());
        let survived = russian_roulette(beta, 0.5).unwrap();
        assert!(approx_eq!(Float, survived[0], 0.99 / 0.95, epsilon = 1e-6));
    }

    #[test]
    fn roulette_expectation_is_unbiased() {
        let beta = Spectrum::rgb(0.3, 0.1, 0.2);
        let n = 10_000;
        let mut sum = Spectrum::ZERO;
        for i in 0..n {
            let u = (i as Float + 0.5) / n as Float;
            if let Some(b) = russian_roulette(beta, u) {
                sum += b;
            }
        }
        let mean = sum / n as Float;
        for c in 0..3 {
            assert!(approx_eq!(Float, mean[c], beta[c], epsilon = 1e-3));
        }
    }

    fn lit_surface(material: Material) -> SurfaceInteraction {
        let mut si = SurfaceInteraction::new(
            Point3f::ZERO,
            Point2f::default(),
            Vector3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
        );
        si.material = Some(std::sync::Arc::new(material));
        si.compute_scattering_functions();
        si
    }

    proptest! {
        #[test]
        fn fallback_reflects_on_the_viewer_side(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let si = lit_surface(Material::matte(Spectrum::new(0.5)));
            let bsdf = si.bsdf.as_ref().unwrap();
            let s = sample_fallback(bsdf, &si, &Point2f::new(u0, u1));
            prop_assert!(s.wi.z >= 0.0);
            prop_assert!(approx_eq!(Float, s.pdf, s.wi.z * INV_PI, epsilon = 1e-4));
            prop_assert!(!s.bxdf_type.contains(BxDFType::BSDF_SPECULAR));
        }

        #[test]
        fn fallback_covers_the_sphere_for_translucent(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let si = lit_surface(Material::translucent(Spectrum::new(0.4), Spectrum::new(0.4)));
            let bsdf = si.bsdf.as_ref().unwrap();
            let s = sample_fallback(bsdf, &si, &Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, s.pdf, INV_FOUR_PI, epsilon = 1e-6));
            prop_assert!(approx_eq!(Float, s.f[0], 0.4 * INV_PI, epsilon = 1e-5));
        }
    }

    #[test]
    fn fallback_cannot_follow_a_mirror() {
        let si = lit_surface(Material::mirror(Spectrum::ONE));
        let bsdf = si.bsdf.as_ref().unwrap();
        let s = sample_fallback(bsdf, &si, &Point2f::new(0.3, 0.6));
        assert!(s.f.is_black());
    }

    #[test]
    fn negative_roulette_threshold_is_rejected() {
        let config = PathConfig {
            rr_threshold: -1.0,
            ..PathConfig::default()
        };
        assert!(matches!(
            PathIntegrator::new(config),
            Err(RenderError::InvalidSetting { .. })
        ));
    }
}

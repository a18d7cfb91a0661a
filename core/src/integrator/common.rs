//! Common

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::pbrt::*;
use crate::reflection::*;
use crate::sampler::*;
use crate::sampling::*;
use crate::scene::*;
use crate::spectrum::*;
use clap::ValueEnum;

/// Strategies for estimating direct lighting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DirectLighting {
    /// Combine light and BSDF sampling with multiple importance sampling.
    #[default]
    Mis,

    /// Sample only the light.
    Light,
}

/// Sample one light chosen from the light distribution for direct lighting
/// and divide by the probability of choosing it.
///
/// * `si`            - The surface interaction.
/// * `scene`         - The scene.
/// * `sampler`       - The sampler.
/// * `light_distrib` - Distribution used to choose the light.
/// * `strategy`      - Direct lighting strategy.
pub fn uniform_sample_one_light(
    si: &SurfaceInteraction,
    scene: &Scene,
    sampler: &mut dyn Sampler,
    light_distrib: &LightDistribution,
    strategy: DirectLighting,
) -> Spectrum {
    // Randomly choose a single light to sample, `light`.
    let (light_num, light_pmf) = match light_distrib.sample(sampler.get_1d()) {
        Some(s) => s,
        None => return Spectrum::ZERO,
    };
    if light_pmf == 0.0 {
        return Spectrum::ZERO;
    }

    let light = &scene.lights[light_num];
    let u_light = sampler.get_2d();
    let u_scattering = sampler.get_2d();
    estimate_direct(si, &u_scattering, light, &u_light, scene, strategy) / light_pmf
}

/// Compute a direct lighting estimate for a light source sample, applying
/// multiple importance sampling when `strategy` asks for it. Specular lobes
/// are ignored; paths handle them by continuing.
///
/// * `si`           - The surface interaction.
/// * `u_scattering` - Scattering sample.
/// * `light`        - The light.
/// * `u_light`      - Light sample.
/// * `scene`        - The scene.
/// * `strategy`     - Direct lighting strategy.
pub fn estimate_direct(
    si: &SurfaceInteraction,
    u_scattering: &Point2f,
    light: &ArcLight,
    u_light: &Point2f,
    scene: &Scene,
    strategy: DirectLighting,
) -> Spectrum {
    let bsdf = match si.bsdf.as_ref() {
        Some(bsdf) => bsdf,
        None => return Spectrum::ZERO,
    };
    let bsdf_flags = BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR;
    let use_mis = strategy == DirectLighting::Mis && !light.is_delta_light();
    let hit = &si.hit;
    let mut ld = Spectrum::ZERO;

    // Sample light source with multiple importance sampling.
    let Li {
        wi,
        pdf: light_pdf,
        visibility,
        value: li,
    } = light.sample_li(hit, u_light);
    if light_pdf > 0.0 && !li.is_black() {
        // Evaluate BSDF for light sampling strategy.
        let f = bsdf.f(&hit.wo, &wi, bsdf_flags) * wi.abs_dot(&si.shading.n);
        let visible = visibility.map_or(true, |vis| vis.unoccluded(scene));
        if !f.is_black() && visible {
            // Add light's contribution to reflected radiance
            if use_mis {
                let scattering_pdf = bsdf.pdf(&hit.wo, &wi, bsdf_flags);
                let weight = power_heuristic(1, light_pdf, 1, scattering_pdf);
                ld += f * li * weight / light_pdf;
            } else {
                ld += f * li / light_pdf;
            }
        }
    }

    // Sample BSDF with multiple importance sampling
    if use_mis {
        let BxDFSample {
            f,
            pdf: scattering_pdf,
            wi,
            ..
        } = bsdf.sample_f(&hit.wo, u_scattering, bsdf_flags);
        let f = f * wi.abs_dot(&si.shading.n);

        if !f.is_black() && scattering_pdf > 0.0 {
            let light_pdf = light.pdf_li(hit, &wi);
            if light_pdf == 0.0 {
                return ld;
            }
            let weight = power_heuristic(1, scattering_pdf, 1, light_pdf);

            // Add light contribution from material sampling.
            let mut ray = hit.spawn_ray(&wi);
            let li = match scene.intersect(&mut ray) {
                Some(light_isect) => match light_isect.area_light.as_ref() {
                    Some(area_light) if same_light(area_light, light) => light_isect.le(&(-wi)),
                    _ => Spectrum::ZERO,
                },
                None => light.le(&ray),
            };
            if !li.is_black() {
                ld += f * li * weight / scattering_pdf;
            }
        }
    }

    ld
}

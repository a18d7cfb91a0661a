//! Infinite Area Light Source

use crate::WorldSphere;
use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::light::*;
use lucent_core::pbrt::*;
use lucent_core::sampling::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;

/// Implements an infinitely far away area light source that surrounds the
/// entire scene with constant radiance.
pub struct UniformInfiniteLight {
    /// Light source type.
    pub light_type: LightType,

    /// Radiance arriving from every direction.
    pub l: Spectrum,

    /// Scene bounds computed in `preprocess()`.
    world: WorldSphere,
}

impl UniformInfiniteLight {
    /// Returns a new `UniformInfiniteLight`.
    ///
    /// * `l` - Radiance arriving from every direction.
    pub fn new(l: Spectrum) -> Self {
        Self {
            light_type: LightType::INFINITE_LIGHT,
            l,
            world: WorldSphere::new(),
        }
    }
}

impl Light for UniformInfiniteLight {
    /// Initialize the light source before rendering begins.
    ///
    /// * `scene` - The scene.
    fn preprocess(&self, scene: &Scene) {
        let (world_center, world_radius) = scene.bounding_sphere();
        self.world.set(world_center, world_radius);
    }

    /// Returns the type of light.
    fn get_type(&self) -> LightType {
        self.light_type
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Li {
        let (_, world_radius) = self.world.get();
        let wi = uniform_sample_sphere(u);
        let p_outside = hit.p + wi * (2.0 * world_radius);
        let visibility = VisibilityTester::new(*hit, Hit::new_minimal(p_outside));
        Li::new(wi, uniform_sphere_pdf(), Some(visibility), self.l)
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        let (_, world_radius) = self.world.get();
        self.l * PI * world_radius * world_radius
    }

    /// Returns emitted radiance along a ray that escapes the scene bounds.
    fn le(&self, _ray: &Ray) -> Spectrum {
        self.l
    }

    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        uniform_sphere_pdf()
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1` - Sample values for the direction.
    /// * `u2` - Sample values for the position on the disk.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f) -> Le {
        let (world_center, world_radius) = self.world.get();

        // Direction the light travels in.
        let d = -uniform_sample_sphere(u1);

        // Launch from a disk facing `d` just outside the scene.
        let (v1, v2) = coordinate_system(&(-d));
        let cd = concentric_sample_disk(u2);
        let p_disk = world_center + world_radius * (cd.x * v1 + cd.y * v2);
        let ray = Ray::new(p_disk + world_radius * (-d), d, INFINITY);

        let pdf_pos = 1.0 / (PI * world_radius * world_radius);
        Le::new(ray, d, pdf_pos, uniform_sphere_pdf(), self.l)
    }

    /// Returns the probability density for the light’s `sample_le()`.
    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
        let (_, world_radius) = self.world.get();
        Pdf::new(1.0 / (PI * world_radius * world_radius), uniform_sphere_pdf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn emitted_rays_start_outside_scene(
            a in 0.0..1.0f32, b in 0.0..1.0f32, c in 0.0..1.0f32, d in 0.0..1.0f32
        ) {
            let light = UniformInfiniteLight::new(Spectrum::ONE);
            light.world.set(Point3f::new(1.0, 0.0, 0.0), 2.0);
            let le = light.sample_le(&Point2f::new(a, b), &Point2f::new(c, d));

            // The origin lies on the tangent plane of the bounding sphere.
            let to_origin = le.ray.o - Point3f::new(1.0, 0.0, 0.0);
            prop_assert!(approx_eq!(f32, to_origin.dot(&(-le.ray.d)), 2.0, epsilon = 1e-4));
            prop_assert!(approx_eq!(f32, le.pdf_dir, INV_FOUR_PI, epsilon = 1e-6));
            prop_assert!(approx_eq!(f32, le.pdf_pos, 1.0 / (4.0 * PI), epsilon = 1e-6));
        }
    }

    #[test]
    fn escaping_rays_see_constant_radiance() {
        let light = UniformInfiniteLight::new(Spectrum::new(0.5));
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY);
        assert_eq!(light.le(&ray), Spectrum::new(0.5));
        assert!(light.is_infinite());
        assert!(!light.is_delta_light());
        assert!(approx_eq!(
            f32,
            light.pdf_li(&Hit::new_minimal(Point3f::ZERO), &ray.d),
            INV_FOUR_PI,
            epsilon = 1e-6
        ));
    }
}

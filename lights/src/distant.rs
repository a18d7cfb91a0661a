//! Distant Light Source

use crate::WorldSphere;
use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::light::*;
use lucent_core::pbrt::*;
use lucent_core::sampling::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;

/// Implements a directional light source that deposits illumination from the
/// same direction at every point in space.
pub struct DistantLight {
    /// Light source type.
    pub light_type: LightType,

    /// Emitted radiance.
    pub emitted_radiance: Spectrum,

    /// Direction towards the light.
    pub w_light: Vector3f,

    /// Scene bounds computed in `preprocess()`.
    world: WorldSphere,
}

impl DistantLight {
    /// Returns a new `DistantLight`.
    ///
    /// * `emitted_radiance` - Emitted radiance.
    /// * `w_light`          - Direction towards the light.
    pub fn new(emitted_radiance: Spectrum, w_light: Vector3f) -> Self {
        Self {
            light_type: LightType::DELTA_DIRECTION_LIGHT,
            emitted_radiance,
            w_light: w_light.normalize(),
            world: WorldSphere::new(),
        }
    }
}

impl Light for DistantLight {
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
    /// * `_u`  - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Li {
        let (_, world_radius) = self.world.get();
        let p_outside = hit.p + self.w_light * (2.0 * world_radius);
        let visibility = VisibilityTester::new(*hit, Hit::new_minimal(p_outside));
        Li::new(self.w_light, 1.0, Some(visibility), self.emitted_radiance)
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        let (_, world_radius) = self.world.get();
        self.emitted_radiance * PI * world_radius * world_radius
    }

    /// Distant lights cannot be hit by a sampled direction.
    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    /// Returns a sampled light-carrying ray leaving the light source. Rays
    /// start on a disk outside the scene facing the scene.
    ///
    /// * `u1`  - Sample values for the position on the disk.
    /// * `_u2` - Unused.
    fn sample_le(&self, u1: &Point2f, _u2: &Point2f) -> Le {
        let (world_center, world_radius) = self.world.get();

        let (v1, v2) = coordinate_system(&self.w_light);
        let cd = concentric_sample_disk(u1);
        let p_disk = world_center + world_radius * (cd.x * v1 + cd.y * v2);

        let ray = Ray::new(p_disk + world_radius * self.w_light, -self.w_light, INFINITY);
        let n_light = ray.d;
        let pdf_pos = 1.0 / (PI * world_radius * world_radius);
        Le::new(ray, n_light, pdf_pos, 1.0, self.emitted_radiance)
    }

    /// Returns the probability density for the light’s `sample_le()`.
    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
        let (_, world_radius) = self.world.get();
        Pdf::new(1.0 / (PI * world_radius * world_radius), 0.0)
    }
}

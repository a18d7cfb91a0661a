//! Point Light Source

use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::light::*;
use lucent_core::pbrt::*;
use lucent_core::sampling::*;
use lucent_core::spectrum::*;

/// Implements an isotropic point light source that emits the same amount of
/// light in all directions.
#[derive(Clone)]
pub struct PointLight {
    /// Light source type.
    pub light_type: LightType,

    /// Position.
    pub p_light: Point3f,

    /// Radiant intensity.
    pub intensity: Spectrum,
}

impl PointLight {
    /// Returns a new `PointLight`.
    ///
    /// * `p_light`   - Position.
    /// * `intensity` - Radiant intensity.
    pub fn new(p_light: Point3f, intensity: Spectrum) -> Self {
        Self {
            light_type: LightType::DELTA_POSITION_LIGHT,
            p_light,
            intensity,
        }
    }
}

impl Light for PointLight {
    /// Returns the type of light.
    fn get_type(&self) -> LightType {
        self.light_type
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `_u`  - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Li {
        let d2 = self.p_light.distance_squared(&hit.p);
        if d2 == 0.0 {
            return Li::zero();
        }
        let wi = (self.p_light - hit.p).normalize();
        let visibility = VisibilityTester::new(*hit, Hit::new_minimal(self.p_light));
        Li::new(wi, 1.0, Some(visibility), self.intensity / d2)
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        4.0 * PI * self.intensity
    }

    /// Point lights cannot be hit by a sampled direction.
    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1` - Sample values for the direction.
    /// * `_u2` - Unused.
    fn sample_le(&self, u1: &Point2f, _u2: &Point2f) -> Le {
        let ray = Ray::new(self.p_light, uniform_sample_sphere(u1), INFINITY);
        let n_light = ray.d;
        Le::new(ray, n_light, 1.0, uniform_sphere_pdf(), self.intensity)
    }

    /// Returns the probability density for the light’s `sample_le()`.
    fn pdf_le(&self, _ray: &Ray, _n_light: &Normal3f) -> Pdf {
        Pdf::new(0.0, uniform_sphere_pdf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn intensity_falls_off_with_distance_squared() {
        let light = PointLight::new(Point3f::new(0.0, 2.0, 0.0), Spectrum::new(8.0));
        let li = light.sample_li(&Hit::new_minimal(Point3f::ZERO), &Point2f::new(0.5, 0.5));
        assert!(approx_eq!(f32, li.value[0], 2.0, epsilon = 1e-6));
        assert!(approx_eq!(f32, li.wi.y, 1.0, epsilon = 1e-6));
        assert_eq!(li.pdf, 1.0);
        assert!(light.is_delta_light());
        assert!(!light.is_infinite());
    }

    #[test]
    fn emitted_rays_leave_from_position() {
        let light = PointLight::new(Point3f::new(1.0, 2.0, 3.0), Spectrum::ONE);
        let le = light.sample_le(&Point2f::new(0.2, 0.7), &Point2f::new(0.0, 0.0));
        assert_eq!(le.ray.o, light.p_light);
        assert!(approx_eq!(f32, le.ray.d.length(), 1.0, epsilon = 1e-5));
        assert!(approx_eq!(f32, le.pdf_dir, INV_FOUR_PI, epsilon = 1e-6));
    }
}

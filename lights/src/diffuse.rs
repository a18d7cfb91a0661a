//! Diffuse Area Light Source

use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::light::*;
use lucent_core::pbrt::*;
use lucent_core::rng::ONE_MINUS_EPSILON;
use lucent_core::sampling::*;
use lucent_core::spectrum::*;

/// Implements a basic area light source with uniform spatial and directional
/// radiance distribution.
#[derive(Clone)]
pub struct DiffuseAreaLight {
    /// Light source type.
    pub light_type: LightType,

    /// Emitted radiance.
    pub l_emit: Spectrum,

    /// Shape describing surface of the light source.
    pub shape: ArcShape,

    /// Surface area of the shape.
    pub area: Float,

    /// Indicates whether light source 2-sided.
    pub two_sided: bool,
}

impl DiffuseAreaLight {
    /// Returns a new `DiffuseAreaLight`.
    ///
    /// * `l_emit`    - Emitted radiance.
    /// * `shape`     - Shape describing surface of the light source.
    /// * `two_sided` - Indicates whether light source 2-sided.
    pub fn new(l_emit: Spectrum, shape: ArcShape, two_sided: bool) -> Self {
        let area = shape.area();
        debug!(
            "Area light on {} with area {} and radiance {:?}",
            shape.get_type(),
            area,
            l_emit
        );
        Self {
            light_type: LightType::AREA_LIGHT,
            l_emit,
            shape,
            area,
            two_sided,
        }
    }
}

impl Light for DiffuseAreaLight {
    /// Returns the type of light.
    fn get_type(&self) -> LightType {
        self.light_type
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Li {
        let (p_shape_hit, pdf) = self.shape.sample_solid_angle(hit, u);

        let wi = p_shape_hit.p - hit.p;
        if pdf == 0.0 || wi.length_squared() == 0.0 {
            return Li::zero();
        }

        let wi = wi.normalize();
        let visibility = Some(VisibilityTester::new(*hit, p_shape_hit));
        let value = self.l(&p_shape_hit, &(-wi));
        Li::new(wi, pdf, visibility, value)
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        let sides = if self.two_sided { 2.0 } else { 1.0 };
        sides * self.l_emit * self.area * PI
    }

    /// Returns emitted radiance based on `two_sided` flag.
    ///
    /// * `hit` - The interaction point.
    /// * `w`   - Direction.
    fn l(&self, hit: &Hit, w: &Vector3f) -> Spectrum {
        if self.two_sided || hit.n.dot(w) > 0.0 {
            self.l_emit
        } else {
            Spectrum::ZERO
        }
    }

    /// Returns the probability density with respect to solid angle for the light’s
    /// `sample_li()`.
    ///
    /// * `hit` - The interaction hit point.
    /// * `wi`  - The incident direction.
    fn pdf_li(&self, hit: &Hit, wi: &Vector3f) -> Float {
        self.shape.pdf_solid_angle(hit, wi)
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1` - Sample values for the position.
    /// * `u2` - Sample values for the direction.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f) -> Le {
        let (p_shape_hit, pdf_pos) = self.shape.sample_area(u1);
        let n_light = p_shape_hit.n;
        let pdf_dir: Float;
        let mut w: Vector3f;

        // Sample a cosine-weighted outgoing direction `w` for area light.
        if self.two_sided {
            let mut u = *u2;
            // Choose a side to sample and then remap u.x to [0,1] before
            // applying cosine-weighted hemisphere sampling for the chosen side.
            if u.x < 0.5 {
                u.x = (u.x * 2.0).min(ONE_MINUS_EPSILON);
                w = cosine_sample_hemisphere(&u);
            } else {
                u.x = ((u.x - 0.5) * 2.0).min(ONE_MINUS_EPSILON);
                w = cosine_sample_hemisphere(&u);
                w.z *= -1.0;
            }
            pdf_dir = 0.5 * cosine_hemisphere_pdf(w.z.abs());
        } else {
            w = cosine_sample_hemisphere(u2);
            pdf_dir = cosine_hemisphere_pdf(w.z);
        }

        let (v1, v2) = coordinate_system(&n_light);
        w = w.x * v1 + w.y * v2 + w.z * n_light;

        let ray = p_shape_hit.spawn_ray(&w);
        let value = self.l(&p_shape_hit, &w);
        Le::new(ray, n_light, pdf_pos, pdf_dir, value)
    }

    /// Returns the probability density for the light’s `sample_le()`.
    ///
    /// * `ray`     - The ray.
    /// * `n_light` - The normal.
    fn pdf_le(&self, ray: &Ray, n_light: &Normal3f) -> Pdf {
        let cos_theta = n_light.dot(&ray.d.normalize());
        let pdf_dir = if self.two_sided {
            0.5 * cosine_hemisphere_pdf(cos_theta.abs())
        } else if cos_theta > 0.0 {
            cosine_hemisphere_pdf(cos_theta)
        } else {
            0.0
        };
        Pdf::new(1.0 / self.area, pdf_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;
    use shapes::*;
    use std::sync::Arc;

    fn ceiling_light(two_sided: bool) -> DiffuseAreaLight {
        let quad = Quad::new(
            Point3f::new(-0.5, 1.0, -0.5),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            false,
        );
        DiffuseAreaLight::new(Spectrum::new(2.0), Arc::new(quad), two_sided)
    }

    #[test]
    fn emits_only_on_front_side() {
        let light = ceiling_light(false);
        let front = Hit::new(Point3f::ZERO, Vector3f::ZERO, Normal3f::new(0.0, -1.0, 0.0));
        assert_eq!(light.l(&front, &Vector3f::new(0.0, -1.0, 0.0)), Spectrum::new(2.0));
        assert!(light.l(&front, &Vector3f::new(0.0, 1.0, 0.0)).is_black());

        let light = ceiling_light(true);
        assert!(!light.l(&front, &Vector3f::new(0.0, 1.0, 0.0)).is_black());
    }

    #[test]
    fn power_scales_with_area() {
        let light = ceiling_light(false);
        assert!(approx_eq!(f32, light.power()[0], 2.0 * PI, epsilon = 1e-5));
        assert!(approx_eq!(f32, ceiling_light(true).power()[1], 4.0 * PI, epsilon = 1e-5));
    }

    #[test]
    fn sample_li_points_at_light() {
        let light = ceiling_light(false);
        let hit = Hit::new(
            Point3f::ZERO,
            Vector3f::new(0.0, 1.0, 0.0),
            Normal3f::new(0.0, 1.0, 0.0),
        );
        let li = light.sample_li(&hit, &Point2f::new(0.5, 0.5));
        assert!(approx_eq!(f32, li.wi.y, 1.0, epsilon = 1e-5));
        // Unit area at unit distance head on.
        assert!(approx_eq!(f32, li.pdf, 1.0, epsilon = 1e-4));
        assert_eq!(li.value, Spectrum::new(2.0));
        assert!(li.visibility.is_some());
    }

    proptest! {
        #[test]
        fn sample_le_pdfs_match_pdf_le(
            a in 0.0..1.0f32, b in 0.0..1.0f32, c in 0.01..0.99f32, d in 0.0..1.0f32
        ) {
            let light = ceiling_light(false);
            let le = light.sample_le(&Point2f::new(a, b), &Point2f::new(c, d));
            prop_assert!(le.ray.d.y < 0.0);
            prop_assert!(approx_eq!(f32, le.pdf_pos, 1.0, epsilon = 1e-5));
            let pdf = light.pdf_le(&le.ray, &le.n_light);
            prop_assert!(approx_eq!(f32, pdf.pdf_pos, le.pdf_pos, epsilon = 1e-5));
            prop_assert!(approx_eq!(f32, pdf.pdf_dir, le.pdf_dir, epsilon = 1e-4));
        }
    }
}

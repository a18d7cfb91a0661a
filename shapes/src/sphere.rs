//! Spheres

use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::pbrt::*;
use lucent_core::sampling::*;

/// A sphere given by its world space center and radius.
#[derive(Clone, Debug)]
pub struct Sphere {
    /// Center of the sphere.
    pub center: Point3f,

    /// Radius of the sphere.
    pub radius: Float,

    /// Indicates whether surface normals point inward instead of outward.
    pub reverse_orientation: bool,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// * `center`              - Center of the sphere.
    /// * `radius`              - Radius of the sphere.
    /// * `reverse_orientation` - Indicates whether surface normals point inward.
    pub fn new(center: Point3f, radius: Float, reverse_orientation: bool) -> Self {
        if radius <= 0.0 {
            warn!("Sphere radius {} is not positive", radius);
        }
        Self {
            center,
            radius,
            reverse_orientation,
        }
    }

    /// Returns the surface normal at a point on the sphere.
    fn normal_at(&self, p: &Point3f) -> Normal3f {
        let n = (*p - self.center).normalize();
        if self.reverse_orientation {
            -n
        } else {
            n
        }
    }

    /// Returns the nearest ray parameter in (0, t_max) where the ray meets the
    /// sphere.
    fn hit_t(&self, r: &Ray) -> Option<Float> {
        let oc = r.o - self.center;
        let a = r.d.length_squared();
        let half_b = oc.dot(&r.d);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = half_b * half_b - a * c;
        if a == 0.0 || discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t0 = (-half_b - root) / a;
        let t1 = (-half_b + root) / a;
        [t0, t1].into_iter().find(|&t| t > 0.0 && t < r.t_max)
    }
}

impl Shape for Sphere {
    fn get_type(&self) -> &'static str {
        "sphere"
    }

    fn world_bound(&self) -> Bounds3f {
        let r = Vector3f::new(self.radius, self.radius, self.radius);
        Bounds3f::new(self.center - r, self.center + r)
    }

    fn intersect(&self, r: &Ray) -> Option<Intersection> {
        let t = self.hit_t(r)?;
        let p_hit = r.at(t);

        // Find parametric representation of sphere hit.
        let local = p_hit - self.center;
        let mut phi = local.y.atan2(local.x);
        if phi < 0.0 {
            phi += TWO_PI;
        }
        let theta = clamp(local.z / self.radius, -1.0, 1.0).acos();
        let uv = Point2f::new(phi * INV_TWO_PI, theta * INV_PI);
        let dpdu = Vector3f::new(-TWO_PI * local.y, TWO_PI * local.x, 0.0);

        let si = SurfaceInteraction::new(p_hit, uv, -r.d, self.normal_at(&p_hit), dpdu);
        Some(Intersection::new(t, si))
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.hit_t(r).is_some()
    }

    fn area(&self) -> Float {
        4.0 * PI * self.radius * self.radius
    }

    fn sample_area(&self, u: &Point2f) -> (Hit, Float) {
        let p = self.center + self.radius * uniform_sample_sphere(u);
        let hit = Hit::new(p, Vector3f::ZERO, self.normal_at(&p));
        (hit, 1.0 / self.area())
    }

    /// Samples the cone of directions the sphere subtends from outside and
    /// falls back to area sampling from inside.
    fn sample_solid_angle(&self, hit: &Hit, u: &Point2f) -> (Hit, Float) {
        let dc2 = hit.p.distance_squared(&self.center);
        let r2 = self.radius * self.radius;
        if dc2 <= r2 {
            // Sample uniformly by area and convert to solid angle measure.
            let (intr, pdf) = self.sample_area(u);
            let wi = intr.p - hit.p;
            if wi.length_squared() == 0.0 {
                return (intr, 0.0);
            }
            let pdf = pdf * hit.p.distance_squared(&intr.p) / intr.n.abs_dot(&(-wi.normalize()));
            return (intr, if pdf.is_finite() { pdf } else { 0.0 });
        }

        // Compute coordinate system for sphere sampling.
        let dc = dc2.sqrt();
        let wc = (self.center - hit.p) / dc;
        let (wc_x, wc_y) = coordinate_system(&wc);

        // Sample uniformly inside subtended cone.
        let sin_theta_max2 = r2 / dc2;
        let cos_theta_max = (1.0 - sin_theta_max2).max(0.0).sqrt();
        let (cos_theta, sin_theta, phi) = uniform_sample_cone(u, cos_theta_max);

        // Compute angle alpha from center of sphere to sampled point on surface.
        let ds = dc * cos_theta - (r2 - dc2 * sin_theta * sin_theta).max(0.0).sqrt();
        let cos_alpha = (dc2 + r2 - ds * ds) / (2.0 * dc * self.radius);
        let sin_alpha = (1.0 - cos_alpha * cos_alpha).max(0.0).sqrt();

        // Compute surface normal and sampled point on sphere.
        let n_world =
            spherical_direction_in_coord_frame(
                sin_alpha,
                cos_alpha,
                phi,
                &(-wc_x),
                &(-wc_y),
                &(-wc),
            );
        let p = self.center + self.radius * n_world;
        let n = if self.reverse_orientation {
            -n_world
        } else {
            n_world
        };
        (Hit::new(p, Vector3f::ZERO, n), uniform_cone_pdf(cos_theta_max))
    }

    fn pdf_solid_angle(&self, hit: &Hit, wi: &Vector3f) -> Float {
        let dc2 = hit.p.distance_squared(&self.center);
        let r2 = self.radius * self.radius;
        if dc2 <= r2 {
            let ray = hit.spawn_ray(wi);
            return match self.intersect(&ray) {
                Some(Intersection { isect, .. }) => {
                    let pdf = hit.p.distance_squared(&isect.hit.p)
                        / (isect.hit.n.abs_dot(&(-*wi)) * self.area());
                    if pdf.is_finite() {
                        pdf
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            };
        }

        // Directions outside the subtended cone miss the sphere.
        let cos_theta_max = (1.0 - r2 / dc2).max(0.0).sqrt();
        let cos_theta = wi.normalize().dot(&(self.center - hit.p).normalize());
        if cos_theta < cos_theta_max {
            return 0.0;
        }
        uniform_cone_pdf(cos_theta_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn ray_hits_front_of_sphere() {
        let s = Sphere::new(Point3f::new(0.0, 0.0, 5.0), 1.0, false);
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY);
        let it = s.intersect(&ray).unwrap();
        assert!(approx_eq!(f32, it.t, 4.0, epsilon = 1e-5));
        assert!(approx_eq!(f32, it.isect.hit.n.z, -1.0, epsilon = 1e-5));
        assert!(s.intersect_p(&ray));

        let miss = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 1.0, 0.0), INFINITY);
        assert!(s.intersect(&miss).is_none());

        let short = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 3.0);
        assert!(!s.intersect_p(&short));
    }

    #[test]
    fn ray_from_inside_hits_far_side() {
        let s = Sphere::new(Point3f::ZERO, 2.0, true);
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(1.0, 0.0, 0.0), INFINITY);
        let it = s.intersect(&ray).unwrap();
        assert!(approx_eq!(f32, it.t, 2.0, epsilon = 1e-5));
        // Reversed normals face the center.
        assert!(approx_eq!(f32, it.isect.hit.n.x, -1.0, epsilon = 1e-5));
    }

    proptest! {
        #[test]
        fn cone_sample_pdf_matches_pdf_solid_angle(x in 0.01..0.99f32, y in 0.01..0.99f32) {
            let s = Sphere::new(Point3f::new(0.0, 0.0, 4.0), 1.0, false);
            let hit = Hit::new_minimal(Point3f::ZERO);
            let (p, pdf) = s.sample_solid_angle(&hit, &Point2f::new(x, y));
            prop_assert!(approx_eq!(f32, p.p.distance(&s.center), 1.0, epsilon = 1e-3));
            let wi = (p.p - hit.p).normalize();
            let expected = s.pdf_solid_angle(&hit, &wi);
            prop_assert!(approx_eq!(f32, pdf, expected, epsilon = 1e-3 * expected));
        }
    }

    #[test]
    fn area_sample_lies_on_surface() {
        let s = Sphere::new(Point3f::new(1.0, 2.0, 3.0), 0.5, false);
        let (hit, pdf) = s.sample_area(&Point2f::new(0.3, 0.8));
        assert!(approx_eq!(f32, hit.p.distance(&s.center), 0.5, epsilon = 1e-5));
        assert!(approx_eq!(f32, pdf, 1.0 / (PI), epsilon = 1e-5));
        assert!(hit.n.dot(&(hit.p - s.center)) > 0.0);
    }
}

//! Disks

use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::pbrt::*;
use lucent_core::sampling::*;

/// A flat circular disk facing along a normal.
#[derive(Clone, Debug)]
pub struct Disk {
    /// Center of the disk.
    pub center: Point3f,

    /// Unit normal the disk faces.
    pub normal: Normal3f,

    /// Radius of the disk.
    pub radius: Float,

    /// Indicates whether surface normals point opposite to `normal`.
    pub reverse_orientation: bool,

    /// Tangent along the disk.
    tangent: Vector3f,

    /// Bitangent along the disk.
    bitangent: Vector3f,
}

impl Disk {
    /// Create a new disk.
    ///
    /// * `center`              - Center of the disk.
    /// * `normal`              - Direction the disk faces.
    /// * `radius`              - Radius of the disk.
    /// * `reverse_orientation` - Indicates whether surface normals are flipped.
    pub fn new(
        center: Point3f,
        normal: Normal3f,
        radius: Float,
        reverse_orientation: bool,
    ) -> Self {
        if radius <= 0.0 {
            warn!("Disk radius {} is not positive", radius);
        }
        let normal = normal.normalize();
        let (tangent, bitangent) = coordinate_system(&normal);
        Self {
            center,
            normal,
            radius,
            reverse_orientation,
            tangent,
            bitangent,
        }
    }

    /// Returns the oriented surface normal.
    fn surface_normal(&self) -> Normal3f {
        if self.reverse_orientation {
            -self.normal
        } else {
            self.normal
        }
    }

    /// Returns the ray parameter where the ray crosses the disk inside
    /// (0, t_max).
    fn hit_t(&self, r: &Ray) -> Option<Float> {
        let denom = self.normal.dot(&r.d);
        if denom == 0.0 {
            return None;
        }
        let t = self.normal.dot(&(self.center - r.o)) / denom;
        if t <= 0.0 || t >= r.t_max {
            return None;
        }
        let dist2 = r.at(t).distance_squared(&self.center);
        if dist2 > self.radius * self.radius {
            return None;
        }
        Some(t)
    }
}

impl Shape for Disk {
    fn get_type(&self) -> &'static str {
        "disk"
    }

    fn world_bound(&self) -> Bounds3f {
        let e = Vector3f::new(
            self.radius * (1.0 - self.normal.x * self.normal.x).max(0.0).sqrt(),
            self.radius * (1.0 - self.normal.y * self.normal.y).max(0.0).sqrt(),
            self.radius * (1.0 - self.normal.z * self.normal.z).max(0.0).sqrt(),
        );
        Bounds3f::new(self.center - e, self.center + e)
    }

    fn intersect(&self, r: &Ray) -> Option<Intersection> {
        let t = self.hit_t(r)?;
        let p_hit = r.at(t);

        let local = p_hit - self.center;
        let (x, y) = (local.dot(&self.tangent), local.dot(&self.bitangent));
        let dist = (x * x + y * y).sqrt();
        let mut phi = y.atan2(x);
        if phi < 0.0 {
            phi += TWO_PI;
        }
        let uv = Point2f::new(phi * INV_TWO_PI, 1.0 - dist / self.radius);

        let si = SurfaceInteraction::new(p_hit, uv, -r.d, self.surface_normal(), self.tangent);
        Some(Intersection::new(t, si))
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.hit_t(r).is_some()
    }

    fn area(&self) -> Float {
        PI * self.radius * self.radius
    }

    fn sample_area(&self, u: &Point2f) -> (Hit, Float) {
        let pd = concentric_sample_disk(u);
        let p = self.center + self.radius * (pd.x * self.tangent + pd.y * self.bitangent);
        (
            Hit::new(p, Vector3f::ZERO, self.surface_normal()),
            1.0 / self.area(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn ceiling_disk() -> Disk {
        Disk::new(
            Point3f::new(0.0, 2.0, 0.0),
            Normal3f::new(0.0, -1.0, 0.0),
            0.5,
            false,
        )
    }

    #[test]
    fn ray_hits_inside_radius_only() {
        let d = ceiling_disk();
        let up = Vector3f::new(0.0, 1.0, 0.0);

        let it = d.intersect(&Ray::new(Point3f::ZERO, up, INFINITY)).unwrap();
        assert!(approx_eq!(f32, it.t, 2.0, epsilon = 1e-5));
        assert!(approx_eq!(f32, it.isect.hit.n.y, -1.0, epsilon = 1e-6));

        let outside = Ray::new(Point3f::new(0.6, 0.0, 0.0), up, INFINITY);
        assert!(!d.intersect_p(&outside));

        let parallel = Ray::new(Point3f::ZERO, Vector3f::new(1.0, 0.0, 0.0), INFINITY);
        assert!(!d.intersect_p(&parallel));
    }

    #[test]
    fn reverse_orientation_flips_normal() {
        let d = Disk::new(Point3f::ZERO, Normal3f::new(0.0, 0.0, 1.0), 1.0, true);
        let (hit, _) = d.sample_area(&Point2f::new(0.5, 0.5));
        assert!(approx_eq!(f32, hit.n.z, -1.0, epsilon = 1e-6));
    }

    proptest! {
        #[test]
        fn area_sample_is_on_disk(x in 0.0..1.0f32, y in 0.0..1.0f32) {
            let d = ceiling_disk();
            let (hit, pdf) = d.sample_area(&Point2f::new(x, y));
            prop_assert!(approx_eq!(f32, hit.p.y, 2.0, epsilon = 1e-5));
            prop_assert!(hit.p.distance(&d.center) <= 0.5 + 1e-5);
            prop_assert!(approx_eq!(f32, pdf, 1.0 / (0.25 * PI), epsilon = 1e-4));
        }

        #[test]
        fn solid_angle_pdf_is_consistent(x in 0.05..0.95f32, y in 0.05..0.95f32) {
            let d = ceiling_disk();
            let hit = Hit::new(
                Point3f::ZERO,
                Vector3f::new(0.0, 1.0, 0.0),
                Normal3f::new(0.0, 1.0, 0.0),
            );
            let (p, pdf) = d.sample_solid_angle(&hit, &Point2f::new(x, y));
            let wi = (p.p - hit.p).normalize();
            let expected = d.pdf_solid_angle(&hit, &wi);
            prop_assert!(approx_eq!(f32, pdf, expected, epsilon = 1e-3 * expected));
        }
    }
}

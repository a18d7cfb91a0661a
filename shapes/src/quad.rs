//! Quadrilaterals

use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::pbrt::*;

/// A parallelogram spanned by two edges from a corner. The surface normal is
/// `e1 x e2` normalized.
#[derive(Clone, Debug)]
pub struct Quad {
    /// Corner of the parallelogram.
    pub p0: Point3f,

    /// First edge.
    pub e1: Vector3f,

    /// Second edge.
    pub e2: Vector3f,

    /// Indicates whether surface normals are flipped.
    pub reverse_orientation: bool,

    /// Unnormalized normal `e1 x e2`.
    n_raw: Vector3f,
}

impl Quad {
    /// Create a new parallelogram.
    ///
    /// * `p0`                  - Corner.
    /// * `e1`                  - First edge.
    /// * `e2`                  - Second edge.
    /// * `reverse_orientation` - Indicates whether surface normals are flipped.
    pub fn new(p0: Point3f, e1: Vector3f, e2: Vector3f, reverse_orientation: bool) -> Self {
        let n_raw = e1.cross(&e2);
        if n_raw.length_squared() == 0.0 {
            warn!("Degenerate quad at {:?}", p0);
        }
        Self {
            p0,
            e1,
            e2,
            reverse_orientation,
            n_raw,
        }
    }

    /// Returns the oriented unit normal.
    fn surface_normal(&self) -> Normal3f {
        let n = self.n_raw.normalize();
        if self.reverse_orientation {
            -n
        } else {
            n
        }
    }

    /// Returns the ray parameter and the edge coordinates of the hit.
    fn hit(&self, r: &Ray) -> Option<(Float, Float, Float)> {
        let denom = self.n_raw.dot(&r.d);
        if denom == 0.0 {
            return None;
        }
        let t = self.n_raw.dot(&(self.p0 - r.o)) / denom;
        if t <= 0.0 || t >= r.t_max || !t.is_finite() {
            return None;
        }

        let q = r.at(t) - self.p0;
        let n2 = self.n_raw.length_squared();
        let alpha = self.n_raw.dot(&q.cross(&self.e2)) / n2;
        let beta = self.n_raw.dot(&self.e1.cross(&q)) / n2;
        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return None;
        }
        Some((t, alpha, beta))
    }
}

impl Shape for Quad {
    fn get_type(&self) -> &'static str {
        "quad"
    }

    fn world_bound(&self) -> Bounds3f {
        Bounds3f::new(self.p0, self.p0 + self.e1 + self.e2)
            .union_point(&(self.p0 + self.e1))
            .union_point(&(self.p0 + self.e2))
    }

    fn intersect(&self, r: &Ray) -> Option<Intersection> {
        let (t, alpha, beta) = self.hit(r)?;
        let si = SurfaceInteraction::new(
            r.at(t),
            Point2f::new(alpha, beta),
            -r.d,
            self.surface_normal(),
            self.e1,
        );
        Some(Intersection::new(t, si))
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.hit(r).is_some()
    }

    fn area(&self) -> Float {
        self.n_raw.length()
    }

    fn sample_area(&self, u: &Point2f) -> (Hit, Float) {
        let p = self.p0 + u[0] * self.e1 + u[1] * self.e2;
        (
            Hit::new(p, Vector3f::ZERO, self.surface_normal()),
            1.0 / self.area(),
        )
    }
}

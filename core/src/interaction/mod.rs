//! Interactions

use crate::geometry::*;
use crate::pbrt::*;

mod surface_interaction;

pub use surface_interaction::*;

/// Hit provides common data shared by surface interactions and path
/// endpoints.
#[derive(Copy, Clone, Debug, Default)]
pub struct Hit {
    /// Point of interaction.
    pub p: Point3f,

    /// The negative ray direction (outgoing direction used when computing
    /// lighting at points).
    pub wo: Vector3f,

    /// Surface normal at the point `p`. Zero for points that are not on a
    /// surface such as point lights and camera origins.
    pub n: Normal3f,
}

impl Hit {
    /// Create a new hit.
    ///
    /// A zero `wo` is kept as is; any other `wo` is normalized.
    ///
    /// * `p`  - Point of interaction.
    /// * `wo` - The negative ray direction.
    /// * `n`  - Surface normal at the point `p`.
    pub fn new(p: Point3f, wo: Vector3f, n: Normal3f) -> Self {
        let wo = if wo == Vector3f::ZERO {
            wo
        } else {
            wo.normalize()
        };
        Self { p, wo, n }
    }

    /// Create a new hit from only a point.
    ///
    /// * `p` - Point of interaction.
    pub fn new_minimal(p: Point3f) -> Self {
        Self {
            p,
            wo: Vector3f::ZERO,
            n: Normal3f::ZERO,
        }
    }

    /// Returns `true` if this is a surface interaction.
    pub fn is_surface_interaction(&self) -> bool {
        self.n != Normal3f::ZERO
    }

    /// Offsets the point along the normal to the side `w` points to so that
    /// spawned rays do not re-intersect the surface they start on.
    ///
    /// * `w` - The direction the ray leaves in.
    pub fn offset_origin(&self, w: &Vector3f) -> Point3f {
        if !self.is_surface_interaction() {
            return self.p;
        }
        let offset = self.n * SHADOW_EPSILON;
        if w.dot(&self.n) < 0.0 {
            self.p - offset
        } else {
            self.p + offset
        }
    }

    /// Spawn's a new ray in the given direction.
    ///
    /// * `d` - The new direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        Ray::new(self.offset_origin(d), *d, INFINITY)
    }

    /// Spawn's a new ray towards another point. The direction is not
    /// normalized so that `t` in `[0, 1)` spans the segment.
    ///
    /// * `p` - The target point.
    pub fn spawn_ray_to_point(&self, p: &Point3f) -> Ray {
        let origin = self.offset_origin(&(*p - self.p));
        Ray::new(origin, *p - origin, 1.0 - SHADOW_EPSILON)
    }

    /// Spawn's a new ray towards another interaction, offsetting both ends.
    ///
    /// * `hit` - The interaction.
    pub fn spawn_ray_to_hit(&self, hit: &Hit) -> Ray {
        let origin = self.offset_origin(&(hit.p - self.p));
        let target = hit.offset_origin(&(origin - hit.p));
        Ray::new(origin, target - origin, 1.0 - SHADOW_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_ray_leaves_on_correct_side() {
        let hit = Hit::new(
            Point3f::ZERO,
            Vector3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
        );
        let up = hit.spawn_ray(&Vector3f::new(0.0, 0.0, 1.0));
        assert!(up.o.z > 0.0);
        let down = hit.spawn_ray(&Vector3f::new(0.0, 0.0, -1.0));
        assert!(down.o.z < 0.0);
    }

    #[test]
    fn spawn_ray_to_point_spans_segment() {
        let hit = Hit::new_minimal(Point3f::new(1.0, 2.0, 3.0));
        let target = Point3f::new(1.0, 2.0, 5.0);
        let ray = hit.spawn_ray_to_point(&target);
        assert_eq!(ray.o, hit.p);
        assert!(ray.t_max < 1.0);
        assert_eq!(ray.at(1.0), target);
    }
}

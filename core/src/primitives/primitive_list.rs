//! Primitive List

use super::*;

/// Aggregate that tests every primitive in turn. Suitable for scenes with a
/// small number of primitives.
#[derive(Clone)]
pub struct PrimitiveList {
    primitives: Vec<ArcPrimitive>,
    bounds: Bounds3f,
}

impl PrimitiveList {
    /// Create a new primitive list.
    ///
    /// * `primitives` - The primitives.
    pub fn new(primitives: Vec<ArcPrimitive>) -> Self {
        let bounds = primitives
            .iter()
            .fold(Bounds3f::default(), |b, p| b.union(&p.world_bound()));
        Self { primitives, bounds }
    }

    /// Returns the number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Returns true if there are no primitives.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

impl Primitive for PrimitiveList {
    fn world_bound(&self) -> Bounds3f {
        self.bounds
    }

    /// Returns the closest intersection. Each hit shortens `r.t_max` so later
    /// primitives only report closer hits.
    fn intersect(&self, r: &mut Ray) -> Option<SurfaceInteraction> {
        let mut closest = None;
        for primitive in self.primitives.iter() {
            if let Some(isect) = primitive.intersect(r) {
                closest = Some(isect);
            }
        }
        closest
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.primitives.iter().any(|p| p.intersect_p(r))
    }
}

//! Geometric Primitives

use super::*;
use crate::light::*;
use crate::material::*;

/// GeometricPrimitive represents a single shape in a scene.
#[derive(Clone)]
pub struct GeometricPrimitive {
    /// The shape.
    pub shape: ArcShape,

    /// The material. Surfaces without one do not scatter light.
    pub material: Option<Arc<Material>>,

    /// Optional area light that describes emmission characterisitics if it
    /// emits light.
    pub area_light: Option<ArcLight>,
}

impl GeometricPrimitive {
    /// Create a new geometric primitive.
    ///
    /// * `shape`      - The shape.
    /// * `material`   - The material.
    /// * `area_light` - Optional area light that describes emmission
    ///                  characterisitics if it emits light.
    pub fn new(
        shape: ArcShape,
        material: Option<Arc<Material>>,
        area_light: Option<ArcLight>,
    ) -> Self {
        Self {
            shape,
            material,
            area_light,
        }
    }
}

impl Primitive for GeometricPrimitive {
    fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    fn intersect(&self, r: &mut Ray) -> Option<SurfaceInteraction> {
        let mut it = self.shape.intersect(r)?;
        r.t_max = it.t;
        it.isect.material = self.material.clone();
        it.isect.area_light = self.area_light.clone();
        Some(it.isect)
    }

    fn intersect_p(&self, r: &Ray) -> bool {
        self.shape.intersect_p(r)
    }
}

//! Scene

use crate::geometry::*;
use crate::interaction::*;
use crate::light::*;
use crate::pbrt::*;
use crate::primitives::*;
use std::collections::HashMap;
use std::sync::Arc;

/// Scene.
#[derive(Clone)]
pub struct Scene {
    /// An aggregate of all primitives in the scene.
    pub aggregate: ArcPrimitive,

    /// All light sources in the scene.
    pub lights: Vec<ArcLight>,

    /// Infinite light sources in the scene.
    pub infinite_lights: Vec<ArcLight>,

    /// The bounding box of the scene geometry.
    pub world_bound: Bounds3f,

    /// Maps the address of each light to its index in `lights`.
    light_indices: HashMap<usize, usize>,
}

impl Scene {
    /// Creates a new `Scene` and lets every light preprocess it.
    ///
    /// * `aggregate` - An aggregate of all primitives in the scene.
    /// * `lights`    - All light sources in the scene.
    pub fn new(aggregate: ArcPrimitive, lights: Vec<ArcLight>) -> Self {
        let light_indices = lights
            .iter()
            .enumerate()
            .map(|(i, l)| (light_key(l), i))
            .collect();
        let scene = Self {
            world_bound: aggregate.world_bound(),
            aggregate,
            infinite_lights: lights
                .iter()
                .filter(|l| l.is_infinite())
                .map(Arc::clone)
                .collect(),
            lights,
            light_indices,
        };

        for light in scene.lights.iter() {
            light.preprocess(&scene);
        }

        scene
    }

    /// Traces the ray into the scene and returns the `SurfaceInteraction` if
    /// an intersection occurred.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect(&self, ray: &mut Ray) -> Option<SurfaceInteraction> {
        self.aggregate.intersect(ray)
    }

    /// Traces the ray into the scene and returns whether or not an intersection
    /// occurred.
    ///
    /// * `ray` - The ray to trace.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        self.aggregate.intersect_p(ray)
    }

    /// Returns the center and radius of a sphere bounding the scene.
    pub fn bounding_sphere(&self) -> (Point3f, Float) {
        self.world_bound.bounding_sphere()
    }

    /// Returns the radius of a sphere bounding the scene.
    pub fn world_radius(&self) -> Float {
        self.bounding_sphere().1
    }

    /// Returns the index of a light in `lights`, or `None` if the light does
    /// not belong to this scene.
    ///
    /// * `light` - The light.
    pub fn light_index(&self, light: &ArcLight) -> Option<usize> {
        self.light_indices.get(&light_key(light)).copied()
    }
}

/// Returns a key identifying a light by its allocation.
fn light_key(light: &ArcLight) -> usize {
    Arc::as_ptr(light) as *const () as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;

    impl Primitive for Empty {
        fn world_bound(&self) -> Bounds3f {
            Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0))
        }

        fn intersect(&self, _r: &mut Ray) -> Option<SurfaceInteraction> {
            None
        }

        fn intersect_p(&self, _r: &Ray) -> bool {
            false
        }
    }

    #[test]
    fn world_radius_encloses_bounds() {
        let scene = Scene::new(Arc::new(Empty), vec![]);
        assert!((scene.world_radius() - 3.0_f32.sqrt()).abs() < 1e-6);
        assert!(scene.lights.is_empty());
        assert!(scene.infinite_lights.is_empty());
    }
}

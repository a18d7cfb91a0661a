//! Lights

#[macro_use]
extern crate log;

mod diffuse;
mod distant;
mod infinite;
mod point;

// Re-export.
pub use diffuse::*;
pub use distant::*;
pub use infinite::*;
pub use point::*;

use lucent_core::geometry::*;
use lucent_core::pbrt::*;
use std::sync::RwLock;

/// Bounding sphere of the scene learned by lights that sit outside of it.
/// Filled in by `Light::preprocess()`.
#[derive(Debug)]
pub(crate) struct WorldSphere(RwLock<(Point3f, Float)>);

impl WorldSphere {
    /// Returns a unit sphere at the origin until the scene is known.
    pub(crate) fn new() -> Self {
        Self(RwLock::new((Point3f::ZERO, 1.0)))
    }

    /// Returns the center and radius.
    pub(crate) fn get(&self) -> (Point3f, Float) {
        match self.0.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Stores a new center and radius.
    ///
    /// * `center` - Center of the scene.
    /// * `radius` - Radius of the scene.
    pub(crate) fn set(&self, center: Point3f, radius: Float) {
        // Degenerate scenes still need a disk to launch rays from.
        let radius = if radius > 0.0 { radius } else { 1.0 };
        match self.0.write() {
            Ok(mut guard) => *guard = (center, radius),
            Err(poisoned) => *poisoned.into_inner() = (center, radius),
        }
    }
}

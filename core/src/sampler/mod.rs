//! Sampler

use crate::geometry::*;
use crate::pbrt::*;
use crate::rng::*;

/// Source of uniform variates consumed by the integrators. Each rendering
/// thread owns its own instance.
pub trait Sampler {
    /// Returns the sample value for the next dimension of the current sample vector.
    fn get_1d(&mut self) -> Float;

    /// Returns the sample value for the next two dimensions of the current sample vector.
    fn get_2d(&mut self) -> Point2f {
        let x = self.get_1d();
        let y = self.get_1d();
        Point2f::new(x, y)
    }

    /// Called when the integrator starts generating a new sample.
    fn start_pixel_sample(&mut self) {}
}

/// Sampler that returns independent uniform random values.
#[derive(Clone, Debug)]
pub struct RandomSampler {
    rng: RNG,
}

impl RandomSampler {
    /// Create a new `RandomSampler`.
    ///
    /// * `seed` - Sequence index for the random number generator.
    pub fn new(seed: u64) -> Self {
        Self { rng: RNG::new(seed) }
    }
}

impl Sampler for RandomSampler {
    fn get_1d(&mut self) -> Float {
        self.rng.uniform_float()
    }
}

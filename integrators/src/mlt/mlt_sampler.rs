//! MLT Sampler

use lucent_core::pbrt::*;
use lucent_core::rng::*;
use lucent_core::sampler::*;

/// MLTSampler maintains three separate sample vectors.
pub const N_SAMPLE_STREAMS: usize = 3;
/// raster position and strategy choice
pub const PIXEL_STREAM_INDEX: usize = 0;
/// camera subpath
pub const CAMERA_STREAM_INDEX: usize = 1;
/// light subpath and direct light connections
pub const LIGHT_STREAM_INDEX: usize = 2;

/// Implements a sampler responsible for managing primary sample space state
/// vectors, mutations, and acceptance and rejection steps.
pub struct MLTSampler {
    /// The random number generator.
    rng: RNG,

    /// Controls the size of “small step” mutations.
    sigma: Float,

    /// Probability of taking a “large step” mutation.
    large_step_probability: Float,

    /// Number of sample streams to request.
    stream_count: usize,

    /// Stores the current sample vector `X`.
    x: Vec<PrimarySample>,

    /// Keeps track of the current Metropolis-Hastings iteration index.
    /// Iterations with rejected proposals are excluded from this count.
    current_iteration: u64,

    /// Indicates if a "large step" mutation is taken.
    large_step: bool,

    /// Index of the last iteration where a successful large step took place.
    last_large_step_iteration: u64,

    /// Stream index.
    stream_index: usize,

    /// Index of current sample in the stream.
    sample_index: usize,
}

impl MLTSampler {
    /// Create a new `MLTSampler`.
    ///
    /// * `rng_sequence_index`     - Supplies a unique stream index to the internal
    ///                              random number generator.
    /// * `sigma`                  - Controls the size of “small step” mutations.
    /// * `large_step_probability` - Probability of taking a “large step” mutation.
    /// * `stream_count`           - Number of sample streams to request.
    pub fn new(
        rng_sequence_index: u64,
        sigma: Float,
        large_step_probability: Float,
        stream_count: usize,
    ) -> Self {
        Self {
            rng: RNG::new(rng_sequence_index),
            sigma,
            large_step_probability,
            stream_count,
            x: Vec::new(),
            current_iteration: 0,
            large_step: true,
            last_large_step_iteration: 0,
            stream_index: 0,
            sample_index: 0,
        }
    }

    /// Expands `self.x` as needed and ensures that its contents are in a consistent state.
    ///
    /// * `index` - Index into `self.x`.
    fn ensure_ready(&mut self, index: usize) {
        // Enlarge `MLTSampler::x` if necessary and get current `x_i`.
        if index >= self.x.len() {
            self.x.resize_with(index + 1, Default::default);
        }

        let xi = &mut self.x[index];

        // Reset `x_i` if a large step took place in the meantime.
        if xi.last_modification_iteration < self.last_large_step_iteration {
            xi.value = self.rng.uniform_float();
            xi.last_modification_iteration = self.last_large_step_iteration;
        }

        // Apply remaining sequence of mutations to `sample`.
        xi.backup();
        if self.large_step {
            xi.value = self.rng.uniform_float();
        } else {
            let n_small = self.current_iteration - xi.last_modification_iteration;

            // Sample the standard normal distribution `N(0, 1)`.
            let normal_sample = SQRT2 * erf_inv(2.0 * self.rng.uniform_float() - 1.0);

            // Compute the effective standard deviation and apply perturbation to `x_i`.
            let eff_sigma = self.sigma * (n_small as Float).sqrt();
            xi.value += normal_sample * eff_sigma;
            xi.value -= xi.value.floor();
            xi.value = xi.value.min(ONE_MINUS_EPSILON);
        }
        xi.last_modification_iteration = self.current_iteration;
    }

    /// Call at the beginning of each Metropolis-Hastings iteration. It
    /// increases the iteration counter and determines which type of mutation
    /// (small or large) should be applied to the sample vector in the
    /// current iteration.
    pub fn start_iteration(&mut self) {
        self.current_iteration += 1;
        self.large_step = self.rng.uniform_float() < self.large_step_probability;
    }

    /// Returns true if the current iteration is a large step.
    pub fn is_large_step(&self) -> bool {
        self.large_step
    }

    /// Accept proposed mutation.
    pub fn accept(&mut self) {
        if self.large_step {
            self.last_large_step_iteration = self.current_iteration;
        }
    }

    /// Reject proposed mutation. Restores all `PrimarySamples` modified in
    /// the current iteration and reverts the iteration counter.
    pub fn reject(&mut self) {
        for xi in self.x.iter_mut() {
            if xi.last_modification_iteration == self.current_iteration {
                xi.restore();
            }
        }
        self.current_iteration -= 1;
    }

    /// Indicates that subsequent samples should come from the stream with
    /// the given index. It also resets the index of the current sample in
    /// the stream.
    ///
    /// * `index` - The stream index to start.
    pub fn start_stream(&mut self, index: usize) {
        assert!(index < self.stream_count, "stream index {} out of range", index);
        self.stream_index = index;
        self.sample_index = 0;
    }

    /// Performs corresponding steps through the primary sample vector
    /// components. It interleaves the streams into the global sample vector,
    /// i.e. the first `stream_count` dimensions in `x` are respectively used
    /// for the first dimension of each of the streams, and so forth.
    fn get_next_index(&mut self) -> usize {
        let next_index = self.stream_index + self.stream_count * self.sample_index;
        self.sample_index += 1;
        next_index
    }
}

impl Sampler for MLTSampler {
    /// Returns the sample value for the next dimension of the current sample vector.
    fn get_1d(&mut self) -> Float {
        let index = self.get_next_index();
        self.ensure_ready(index);
        self.x[index].value
    }
}

/// Records the current value of a single component of `X` on the interval [0,1).
#[derive(Copy, Clone, Debug, Default)]
struct PrimarySample {
    /// Sample value.
    value: Float,

    /// Last modification iteration.
    last_modification_iteration: u64,

    /// Backed up sample value.
    value_backup: Float,

    /// Backed up last modification iteration.
    modify_backup: u64,
}

impl PrimarySample {
    /// Backup the sample value.
    fn backup(&mut self) {
        self.value_backup = self.value;
        self.modify_backup = self.last_modification_iteration;
    }

    /// Restore the sample value.
    fn restore(&mut self) {
        self.value = self.value_backup;
        self.last_modification_iteration = self.modify_backup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draw(sampler: &mut MLTSampler, stream: usize, n: usize) -> Vec<Float> {
        sampler.start_stream(stream);
        (0..n).map(|_| sampler.get_1d()).collect()
    }

    #[test]
    fn same_seed_replays_the_same_vector() {
        let mut a = MLTSampler::new(7, 0.01, 0.3, N_SAMPLE_STREAMS);
        let mut b = MLTSampler::new(7, 0.01, 0.3, N_SAMPLE_STREAMS);
        assert_eq!(draw(&mut a, CAMERA_STREAM_INDEX, 5), draw(&mut b, CAMERA_STREAM_INDEX, 5));
    }

    /// Values and modification markers of the given coordinates.
    fn snapshot(sampler: &MLTSampler, indices: &[usize]) -> Vec<(Float, u64)> {
        indices
            .iter()
            .map(|&i| (sampler.x[i].value, sampler.x[i].last_modification_iteration))
            .collect()
    }

    #[test]
    fn rejected_small_step_rolls_back() {
        let mut sampler = MLTSampler::new(3, 0.01, 0.0, N_SAMPLE_STREAMS);
        let indices = [2usize, 5, 8, 11];
        let before = draw(&mut sampler, LIGHT_STREAM_INDEX, 4);
        let saved = snapshot(&sampler, &indices);

        sampler.start_iteration();
        assert!(!sampler.is_large_step());
        let proposed = draw(&mut sampler, LIGHT_STREAM_INDEX, 4);
        assert_ne!(before, proposed);
        assert!(indices.iter().all(|&i| sampler.x[i].last_modification_iteration == 1));
        sampler.reject();
        assert_eq!(snapshot(&sampler, &indices), saved);

        // Reading the vector again in a fresh iteration that is rejected
        // leaves it as it was.
        sampler.start_iteration();
        let _ = draw(&mut sampler, LIGHT_STREAM_INDEX, 4);
        sampler.reject();
        assert_eq!(sampler.current_iteration, 0);
        assert_eq!(snapshot(&sampler, &indices), saved);
        for (xi, v) in indices.iter().zip(before.iter()) {
            assert_eq!(sampler.x[*xi].value, *v);
        }
    }

    #[test]
    fn rejected_large_step_restores_values() {
        let mut sampler = MLTSampler::new(11, 0.01, 1.0, N_SAMPLE_STREAMS);
        let indices = [0usize, 3, 6];
        let before = draw(&mut sampler, PIXEL_STREAM_INDEX, 3);
        let saved = snapshot(&sampler, &indices);

        sampler.start_iteration();
        assert!(sampler.is_large_step());
        let _ = draw(&mut sampler, PIXEL_STREAM_INDEX, 3);
        assert!(indices.iter().all(|&i| sampler.x[i].last_modification_iteration == 1));
        sampler.reject();

        assert_eq!(snapshot(&sampler, &indices), saved);
        let values: Vec<Float> = indices.iter().map(|i| sampler.x[*i].value).collect();
        assert_eq!(values, before);
        assert_eq!(sampler.last_large_step_iteration, 0);
    }

    #[test]
    fn accepted_large_step_marks_stale_coordinates() {
        let mut sampler = MLTSampler::new(5, 0.01, 1.0, N_SAMPLE_STREAMS);
        let _ = draw(&mut sampler, CAMERA_STREAM_INDEX, 2);
        sampler.start_iteration();
        let _ = draw(&mut sampler, PIXEL_STREAM_INDEX, 1);
        sampler.accept();
        assert_eq!(sampler.last_large_step_iteration, 1);
        // The untouched camera coordinates are now older than the last
        // large step and get redrawn on next use.
        let camera_xi = &sampler.x[CAMERA_STREAM_INDEX];
        assert!(camera_xi.last_modification_iteration < sampler.last_large_step_iteration);
    }

    #[test]
    fn streams_are_interleaved() {
        let mut sampler = MLTSampler::new(9, 0.01, 0.3, N_SAMPLE_STREAMS);
        let camera = draw(&mut sampler, CAMERA_STREAM_INDEX, 6);
        let light = draw(&mut sampler, LIGHT_STREAM_INDEX, 2);
        assert_eq!(sampler.x.len(), N_SAMPLE_STREAMS * 5 + CAMERA_STREAM_INDEX + 1);
        assert_eq!(sampler.x[LIGHT_STREAM_INDEX].value, light[0]);
        assert_eq!(sampler.x[LIGHT_STREAM_INDEX + N_SAMPLE_STREAMS].value, light[1]);
        assert_eq!(sampler.x[CAMERA_STREAM_INDEX + N_SAMPLE_STREAMS * 5].value, camera[5]);
    }

    #[test]
    #[should_panic]
    fn unknown_stream_is_a_contract_violation() {
        let mut sampler = MLTSampler::new(0, 0.01, 0.3, N_SAMPLE_STREAMS);
        sampler.start_stream(N_SAMPLE_STREAMS);
    }

    proptest! {
        #[test]
        fn small_steps_stay_in_unit_interval(seed in 0u64..1000, steps in 1usize..50) {
            let mut sampler = MLTSampler::new(seed, 0.5, 0.0, N_SAMPLE_STREAMS);
            let _ = draw(&mut sampler, PIXEL_STREAM_INDEX, 2);
            for _ in 0..steps {
                sampler.start_iteration();
                for v in draw(&mut sampler, PIXEL_STREAM_INDEX, 2) {
                    prop_assert!((0.0..1.0).contains(&v));
                }
                sampler.accept();
            }
        }
    }
}

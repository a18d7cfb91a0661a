//! MLTIntegrator

use crate::bdpt::*;
use lucent_core::camera::*;
use lucent_core::film::*;
use lucent_core::geometry::*;
use lucent_core::integrator::*;
use lucent_core::light::*;
use lucent_core::parallel::*;
use lucent_core::pbrt::*;
use lucent_core::rng::*;
use lucent_core::sampler::*;
use lucent_core::sampling::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

mod mlt_sampler;
pub use mlt_sampler::*;

/// Number of mutations a chain runs between pause checkpoints.
const CHECKPOINT_FREQUENCY: u64 = 4096;

/// Settings for Metropolis light transport.
#[derive(Copy, Clone, Debug)]
pub struct MLTConfig {
    /// Maximum number of bounces.
    pub max_depth: usize,

    /// Number of bootstrap paths per depth used to seed the chains and
    /// estimate the image brightness.
    pub bootstrap_samples: usize,

    /// Number of Markov chains.
    pub chains: usize,

    /// Average number of mutations per pixel.
    pub mutations_per_pixel: usize,

    /// Probability of a large step mutation.
    pub large_step_probability: Float,

    /// Standard deviation of small step mutations.
    pub sigma: Float,

    /// Offset for every random stream.
    pub seed: u64,

    /// How connection strategies are weighted.
    pub mis: MISHeuristic,

    /// Light sampling strategy.
    pub light_strategy: LightSampleStrategy,
}

impl Default for MLTConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            bootstrap_samples: 100_000,
            chains: 1000,
            mutations_per_pixel: 100,
            large_step_probability: 0.3,
            sigma: 0.01,
            seed: 0,
            mis: MISHeuristic::Balance,
            light_strategy: LightSampleStrategy::Uniform,
        }
    }
}

/// Implements Metropolis light transport in primary sample space on top of
/// the bidirectional path tracer's connection strategies.
pub struct MLTIntegrator {
    /// Maximum number of bounces.
    max_depth: usize,

    /// Number of bootstrap paths per depth.
    n_bootstrap: usize,

    /// Number of Markov chains.
    n_chains: usize,

    /// Average number of mutations per pixel.
    mutations_per_pixel: usize,

    /// Probability of a large step mutation.
    large_step_probability: Float,

    /// Standard deviation of small step mutations.
    sigma: Float,

    /// Offset for every random stream.
    seed: u64,

    /// How connection strategies are weighted.
    mis: MISHeuristic,

    /// Light sampling strategy.
    light_strategy: LightSampleStrategy,

    /// Light distribution. Set in `preprocess()`.
    light_distribution: LightDistribution,
}

impl MLTIntegrator {
    /// Create a new `MLTIntegrator`.
    ///
    /// * `config` - The settings.
    pub fn new(config: MLTConfig) -> Result<Self, RenderError> {
        if !(0.0..=1.0).contains(&config.large_step_probability) {
            return Err(RenderError::invalid(
                "large-step-probability",
                format!("{} is outside [0, 1]", config.large_step_probability),
            ));
        }
        if config.sigma.is_nan() || config.sigma <= 0.0 {
            return Err(RenderError::invalid(
                "sigma",
                format!("{} is not positive", config.sigma),
            ));
        }
        if config.bootstrap_samples == 0 {
            return Err(RenderError::invalid("bootstrap-samples", "must be at least 1"));
        }
        if config.chains == 0 {
            return Err(RenderError::invalid("chains", "must be at least 1"));
        }
        if config.mutations_per_pixel == 0 {
            return Err(RenderError::invalid("mutations-per-pixel", "must be at least 1"));
        }

        Ok(Self {
            max_depth: config.max_depth,
            n_bootstrap: config.bootstrap_samples,
            n_chains: config.chains,
            mutations_per_pixel: config.mutations_per_pixel,
            large_step_probability: config.large_step_probability,
            sigma: config.sigma,
            seed: config.seed,
            mis: config.mis,
            light_strategy: config.light_strategy,
            light_distribution: LightDistribution::new(config.light_strategy, &[]),
        })
    }

    /// Returns a new `MLTSampler` for the given random sequence.
    ///
    /// * `rng_index` - Index of the bootstrap sample the sampler replays.
    fn sampler(&self, rng_index: usize) -> MLTSampler {
        MLTSampler::new(
            self.seed.wrapping_add(rng_index as u64),
            self.sigma,
            self.large_step_probability,
            N_SAMPLE_STREAMS,
        )
    }

    /// Computes the radiance `L(X)` for the sample vector held by an
    /// `MLTSampler`. Returns the raster position of the path and its
    /// radiance divided by the probability of the chosen strategy.
    ///
    /// * `scene`   - The scene.
    /// * `camera`  - The camera.
    /// * `sampler` - Primary sample space sampler.
    /// * `depth`   - Number of bounces of the generated path.
    fn l(
        &self,
        scene: &Scene,
        camera: &RasterCamera,
        sampler: &mut MLTSampler,
        depth: usize,
    ) -> (Point2f, Spectrum) {
        sampler.start_stream(PIXEL_STREAM_INDEX);

        // Determine the number of available strategies and pick a specific one.
        let (s, t, n_strategies) = if depth == 0 {
            (2, 0, 1)
        } else {
            let n_strategies = depth + 1;
            let t = ((sampler.get_1d() * n_strategies as Float) as usize).min(n_strategies - 1);
            (depth + 2 - t, t, n_strategies)
        };

        let u = sampler.get_2d();
        let p_raster = Point2f::new(u.x * camera.width() as Float, u.y * camera.height() as Float);

        // Generate a camera subpath with exactly `s` vertices.
        sampler.start_stream(CAMERA_STREAM_INDEX);
        let camera_path = generate_camera_subpath(scene, camera, sampler, s, &p_raster);
        if camera_path.len() != s {
            return (p_raster, Spectrum::ZERO);
        }

        // Generate a light subpath with exactly `t` vertices. Light samples
        // for `t = 1` connections come from the same stream.
        sampler.start_stream(LIGHT_STREAM_INDEX);
        let light_path = generate_light_subpath(scene, sampler, t, &self.light_distribution);
        if light_path.len() != t {
            return (p_raster, Spectrum::ZERO);
        }

        let l = connect(
            scene,
            &camera_path,
            &light_path,
            s,
            t,
            &self.light_distribution,
            self.mis,
            sampler,
        );
        (p_raster, finite_radiance(&p_raster, l * n_strategies as Float))
    }

    /// Computes the luminance of `n_bootstrap` independent samples for every
    /// depth on `n_threads` workers. The weight of bootstrap sample `i` at
    /// depth `d` is stored at `i * (max_depth + 1) + d`.
    ///
    /// * `scene`     - The scene.
    /// * `camera`    - The camera.
    /// * `n_threads` - Number of worker threads.
    fn bootstrap(&self, scene: &Scene, camera: &RasterCamera, n_threads: usize) -> Vec<Float> {
        let n_depths = self.max_depth + 1;
        let mut bootstrap_weights: Vec<Float> = vec![0.0; self.n_bootstrap * n_depths];

        thread::scope(|scope| {
            let chunk_size = (self.n_bootstrap / 128).clamp(1, 8192);
            let (tx_collector, rx_collector) =
                crossbeam_channel::bounded::<(usize, Float)>(chunk_size);
            let (tx_worker, rx_worker) = crossbeam_channel::bounded::<usize>(chunk_size);

            // Spawn collector thread.
            let weights: &mut [Float] = bootstrap_weights.as_mut_slice();
            scope.spawn(move || {
                for (rng_index, weight) in rx_collector.iter() {
                    weights[rng_index] = weight;
                }
            });

            // Spawn worker threads.
            for _ in 0..n_threads.max(1) {
                let rx_worker = rx_worker.clone();
                let tx_collector = tx_collector.clone();
                scope.spawn(move || {
                    for i in rx_worker.iter() {
                        for depth in 0..n_depths {
                            let rng_index = i * n_depths + depth;
                            let mut sampler = self.sampler(rng_index);
                            let (p_raster, l) = self.l(scene, camera, &mut sampler, depth);
                            let weight = bootstrap_weight(&p_raster, &l);
                            if tx_collector.send((rng_index, weight)).is_err() {
                                return;
                            }
                        }
                    }
                });
            }
            drop(rx_worker);
            drop(tx_collector);

            // Send work.
            for i in 0..self.n_bootstrap {
                if tx_worker.send(i).is_err() {
                    break;
                }
            }
        });

        bootstrap_weights
    }

    /// Follows one Markov chain for its share of the mutations, splatting
    /// every iteration into `film` and adding finished mutations to `done`.
    ///
    /// * `chain`             - Index of the chain.
    /// * `scene`             - The scene.
    /// * `camera`            - The camera.
    /// * `bootstrap`         - Distribution of bootstrap sample luminance.
    /// * `film`              - Accumulates contributions.
    /// * `n_total_mutations` - Number of mutations over all chains.
    /// * `done`              - Number of mutations finished over all chains.
    /// * `scheduler`         - Scheduler used to honour pause requests.
    #[allow(clippy::too_many_arguments)]
    fn run_chain(
        &self,
        chain: usize,
        scene: &Scene,
        camera: &RasterCamera,
        bootstrap: &AliasTable,
        film: &SplatFilm,
        n_total_mutations: u64,
        done: &AtomicU64,
        scheduler: &Scheduler<usize>,
    ) {
        let i = chain as u64;
        let n_chains = self.n_chains as u64;
        let chain_end = ((i + 1) * n_total_mutations / n_chains).min(n_total_mutations);
        let n_chain_mutations = chain_end - i * n_total_mutations / n_chains;

        // Select initial state from the set of bootstrap samples.
        let mut rng = RNG::new(self.seed.wrapping_add(i));
        let (bootstrap_index, _) = bootstrap.sample(rng.uniform_float());
        let depth = bootstrap_index % (self.max_depth + 1);

        let mut sampler = self.sampler(bootstrap_index);
        let (mut p_current, mut l_current) = self.l(scene, camera, &mut sampler, depth);
        trace!("Chain {chain} starts at depth {depth} with L: {l_current:?}");

        // Run the Markov chain for `n_chain_mutations` steps.
        let mut pending = 0;
        for _ in 0..n_chain_mutations {
            sampler.start_iteration();
            let (p_proposed, l_proposed) = self.l(scene, camera, &mut sampler, depth);

            // Splat both current and proposed samples to `film`.
            let accept = acceptance(l_current.y(), l_proposed.y());
            if accept > 0.0 && l_proposed.y() > 0.0 {
                film.add_splat(&p_proposed, l_proposed * accept / l_proposed.y());
            }
            if accept < 1.0 && l_current.y() > 0.0 {
                film.add_splat(&p_current, l_current * (1.0 - accept) / l_current.y());
            }

            // Accept or reject the proposal.
            if rng.uniform_float() < accept {
                p_current = p_proposed;
                l_current = l_proposed;
                sampler.accept();
            } else {
                sampler.reject();
            }

            pending += 1;
            if pending == CHECKPOINT_FREQUENCY {
                done.fetch_add(pending, Ordering::Relaxed);
                pending = 0;
                scheduler.checkpoint();
            }
        }
        done.fetch_add(pending, Ordering::Relaxed);
    }
}

/// Returns the Metropolis acceptance probability of moving from a sample
/// with luminance `current` to one with luminance `proposed`. A chain that
/// sits on a black sample always moves, but never to a non-finite one.
///
/// * `current`  - Luminance of the current sample.
/// * `proposed` - Luminance of the proposed sample.
pub fn acceptance(current: Float, proposed: Float) -> Float {
    if !proposed.is_finite() {
        0.0
    } else if current > 0.0 {
        (proposed / current).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Returns `l`, or black if it has no meaningful value. A chain that
/// accepted an infinite sample would never leave it again.
///
/// * `p_raster` - Raster position of the sample.
/// * `l`        - Radiance of the sample.
fn finite_radiance(p_raster: &Point2f, l: Spectrum) -> Spectrum {
    if l.has_nans() {
        error!(
            "Not-a-number radiance value returned for raster position ({}, {}). Setting to black.",
            p_raster.x, p_raster.y
        );
        Spectrum::ZERO
    } else if !l.is_finite() {
        error!(
            "Infinite radiance value returned for raster position ({}, {}). Setting to black.",
            p_raster.x, p_raster.y
        );
        Spectrum::ZERO
    } else {
        l
    }
}

/// Returns the luminance of a bootstrap sample, or 0 if it is not usable.
fn bootstrap_weight(p_raster: &Point2f, l: &Spectrum) -> Float {
    let y = l.y();
    if y.is_finite() && y >= 0.0 {
        y
    } else {
        warn!(
            "Bootstrap sample at ({}, {}) has luminance {}. Ignoring it.",
            p_raster.x, p_raster.y, y
        );
        0.0
    }
}

impl Integrator for MLTIntegrator {
    fn name(&self) -> &'static str {
        "mlt"
    }

    /// Builds the light distribution. Paths need a light to end on so scenes
    /// without lights are rejected.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene) -> Result<(), RenderError> {
        if scene.lights.is_empty() {
            error!("Metropolis light transport needs at least one light");
            return Err(RenderError::NoLights);
        }
        self.light_distribution = LightDistribution::new(self.light_strategy, &scene.lights);
        Ok(())
    }

    /// Render the scene. Chains are the scheduler's work units. Every display
    /// callback first receives a snapshot of the image scaled to the mutations
    /// finished so far.
    ///
    /// * `scene` - The scene.
    /// * `ctx`   - The render context.
    fn render(&self, scene: &Scene, ctx: &mut RenderContext) -> Result<(), RenderError> {
        let camera = ctx.camera;

        // Generate bootstrap samples and compute normalization constant `b`.
        let bootstrap_weights = self.bootstrap(scene, camera, ctx.n_threads);
        let n_samples = bootstrap_weights.len();
        let bootstrap = AliasTable::new(&bootstrap_weights).map_err(|err| {
            error!("Bootstrap distribution unusable: {}", err);
            RenderError::ZeroBootstrap { samples: n_samples }
        })?;
        let b = bootstrap.integral() * (self.max_depth + 1) as Float;
        info!("Bootstrap with {} samples gives b = {}", n_samples, b);

        // Run `n_chains` Markov chains in parallel.
        let (width, height) = (camera.width(), camera.height());
        let film = SplatFilm::new(width, height);
        let n_pixels = (width * height) as u64;
        let n_total_mutations = self.mutations_per_pixel as u64 * n_pixels;
        let done = AtomicU64::new(0);
        debug!(
            "Running {} chains for {} mutations in total",
            self.n_chains, n_total_mutations
        );

        let write_pixel = ctx.write_pixel;
        let display = &mut *ctx.display;
        let scheduler = Scheduler::new(0..self.n_chains);
        scheduler.run(
            ctx.n_threads,
            |_| (),
            |_, chain, scheduler| {
                self.run_chain(
                    chain,
                    scene,
                    camera,
                    &bootstrap,
                    &film,
                    n_total_mutations,
                    &done,
                    scheduler,
                )
            },
            |_| {
                let n_done = done.load(Ordering::Relaxed);
                if n_done > 0 {
                    film.for_each_pixel(b * n_pixels as Float / n_done as Float, write_pixel);
                }
                display(n_done as Float / n_total_mutations as Float);
            },
            ctx.interval,
        );

        // Store final image computed with MLT.
        film.for_each_pixel(b / self.mutations_per_pixel as Float, write_pixel);
        Ok(())
    }
}

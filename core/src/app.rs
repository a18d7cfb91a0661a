//! Application related stuff

use crate::integrator::DirectLighting;
use crate::light::LightSampleStrategy;
use crate::pbrt::Float;
use crate::sampling::MISHeuristic;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Available integrators.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum IntegratorKind {
    /// Unidirectional path tracing.
    #[default]
    Path,

    /// Bidirectional path tracing.
    Bdpt,

    /// Primary sample space Metropolis light transport.
    Mlt,
}

/// System wide options.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Number of threads to use for rendering.
    #[arg(
        long = "nthreads",
        short = 't',
        value_name = "NUM",
        default_value_t = 0,
        help = "Use specified number of threads for rendering (0 uses all cores)."
    )]
    n_threads: usize,

    /// Samples per pixel.
    #[arg(long, value_name = "NUM", default_value_t = 16)]
    pub spp: usize,

    /// The integrator.
    #[arg(long, value_enum, default_value_t = IntegratorKind::Path)]
    pub integrator: IntegratorKind,

    /// Maximum path depth.
    #[arg(long = "maxdepth", value_name = "NUM", default_value_t = 5)]
    pub max_depth: usize,

    /// Image width.
    #[arg(long, value_name = "NUM", default_value_t = 256)]
    pub width: usize,

    /// Image height.
    #[arg(long, value_name = "NUM", default_value_t = 256)]
    pub height: usize,

    /// Tile size.
    #[arg(
        long = "tile-size",
        short = 'p',
        value_name = "NUM",
        default_value_t = 16,
        help = "Size in pixels of square tiles rendered per thread."
    )]
    pub tile_size: usize,

    /// Path to the image file.
    #[arg(
        long = "outfile",
        short = 'o',
        value_name = "FILE",
        default_value = "lucent.png",
        help = "Write the final image to the given filename."
    )]
    pub image_file: String,

    /// Seconds between progress updates.
    #[arg(long = "display-interval", value_name = "SECONDS", default_value_t = 1.0)]
    pub display_interval: f64,

    /// Light selection strategy.
    #[arg(long = "light-strategy", value_enum, default_value_t = LightSampleStrategy::Uniform)]
    pub light_strategy: LightSampleStrategy,

    /// Direct lighting strategy for the path tracer.
    #[arg(long = "direct-lighting", value_enum, default_value_t = DirectLighting::Mis)]
    pub direct_lighting: DirectLighting,

    /// Sample new path directions from a cosine or uniform fallback instead
    /// of the BSDF.
    #[arg(long = "no-bsdf-sampling")]
    pub no_bsdf_sampling: bool,

    /// Russian roulette starts once the path throughput falls below this.
    #[arg(long = "rr-threshold", value_name = "FLOAT", default_value_t = 1.0)]
    pub rr_threshold: Float,

    /// MIS heuristic for bidirectional strategies.
    #[arg(long, value_enum, default_value_t = MISHeuristic::Balance)]
    pub mis: MISHeuristic,

    /// Number of bootstrap paths for Metropolis light transport.
    #[arg(long = "bootstrap-samples", value_name = "NUM", default_value_t = 100_000)]
    pub bootstrap_samples: usize,

    /// Number of Markov chains.
    #[arg(long, value_name = "NUM", default_value_t = 1000)]
    pub chains: usize,

    /// Average number of mutations per pixel.
    #[arg(long = "mutations-per-pixel", value_name = "NUM", default_value_t = 100)]
    pub mutations_per_pixel: usize,

    /// Probability of a large step mutation.
    #[arg(long = "large-step-probability", value_name = "FLOAT", default_value_t = 0.3)]
    pub large_step_probability: Float,

    /// Standard deviation of small step mutations.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.01)]
    pub sigma: Float,

    /// Seed for the random streams.
    #[arg(long, value_name = "NUM", default_value_t = 0)]
    pub seed: u64,

    /// Place a mirror sphere in the demo scene.
    #[arg(long)]
    pub mirror: bool,

    /// Suppress all text output other than error messages.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

impl Options {
    /// Returns the number of threads to use.
    pub fn threads(&self) -> usize {
        let max_threads = num_cpus::get();
        match self.n_threads {
            0 => max_threads,
            n if n > max_threads => {
                warn!("Num threads > max logical CPUs {}", max_threads);
                max_threads
            }
            n => n,
        }
    }

    /// Returns the time between progress updates.
    pub fn display_interval(&self) -> Duration {
        Duration::from_secs_f64(self.display_interval.max(0.01))
    }
}

/// Returns a progress bar counting to `total`.
///
/// * `total` - Number of steps.
pub fn create_progress_reporter(total: u64) -> ProgressBar {
    let progress = ProgressBar::new(total);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent}% {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    progress.set_style(style);
    progress
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = Options::parse_from(["lucent"]);
        assert_eq!(options.integrator, IntegratorKind::Path);
        assert_eq!(options.max_depth, 5);
        assert_eq!(options.bootstrap_samples, 100_000);
        assert_eq!(options.chains, 1000);
        assert_eq!(options.mutations_per_pixel, 100);
        assert_eq!(options.large_step_probability, 0.3);
        assert_eq!(options.sigma, 0.01);
        assert!(options.threads() >= 1);
    }

    #[test]
    fn parses_enums() {
        let options = Options::parse_from([
            "lucent",
            "--integrator",
            "mlt",
            "--light-strategy",
            "power",
            "--direct-lighting",
            "light",
            "--mis",
            "uniform",
            "--nthreads",
            "1",
        ]);
        assert_eq!(options.integrator, IntegratorKind::Mlt);
        assert_eq!(options.light_strategy, LightSampleStrategy::Power);
        assert_eq!(options.direct_lighting, DirectLighting::Light);
        assert_eq!(options.mis, MISHeuristic::Uniform);
        assert_eq!(options.threads(), 1);
    }
}

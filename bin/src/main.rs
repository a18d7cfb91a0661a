//! Lucent

#[macro_use]
extern crate log;

mod cornell;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use indicatif::ProgressDrawTarget;
use integrators::*;
use lucent_core::app::*;
use lucent_core::image_io::*;
use lucent_core::integrator::*;
use lucent_core::spectrum::*;
use std::sync::Mutex;
use std::time::Instant;

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    let options = Options::parse();
    if let Err(e) = render(&options) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

/// Returns the integrator selected on the command line.
///
/// * `options` - Command line options.
fn create_integrator(options: &Options) -> Result<Box<dyn Integrator>, RenderError> {
    let integrator: Box<dyn Integrator> = match options.integrator {
        IntegratorKind::Path => Box::new(PathIntegrator::new(PathConfig {
            max_depth: options.max_depth,
            samples_per_pixel: options.spp,
            seed: options.seed,
            direct_lighting: options.direct_lighting,
            light_strategy: options.light_strategy,
            bsdf_sampling: !options.no_bsdf_sampling,
            rr_threshold: options.rr_threshold,
        })?),
        IntegratorKind::Bdpt => Box::new(BDPTIntegrator::new(BDPTConfig {
            max_depth: options.max_depth,
            samples_per_pixel: options.spp,
            seed: options.seed,
            mis: options.mis,
            light_strategy: options.light_strategy,
        })?),
        IntegratorKind::Mlt => Box::new(MLTIntegrator::new(MLTConfig {
            max_depth: options.max_depth,
            bootstrap_samples: options.bootstrap_samples,
            chains: options.chains,
            mutations_per_pixel: options.mutations_per_pixel,
            large_step_probability: options.large_step_probability,
            sigma: options.sigma,
            seed: options.seed,
            mis: options.mis,
            light_strategy: options.light_strategy,
        })?),
    };
    Ok(integrator)
}

/// Renders the demo scene and writes the image.
///
/// * `options` - Command line options.
fn render(options: &Options) -> Result<()> {
    let scene = cornell::scene(options.mirror);
    let camera = cornell::camera()?;
    let mut renderer = Renderer::new(
        &camera,
        options.width,
        options.height,
        create_integrator(options)?,
        options.threads(),
        options.tile_size,
    )?;

    let image = Mutex::new(RGBImage::new(options.width, options.height));
    let write_pixel = |x: usize, y: usize, v: Spectrum| match image.lock() {
        Ok(mut image) => image.set(x, y, v),
        Err(poisoned) => poisoned.into_inner().set(x, y, v),
    };

    let progress = create_progress_reporter(100);
    if options.quiet {
        progress.set_draw_target(ProgressDrawTarget::hidden());
    }
    progress.set_message("Rendering scene");

    let start = Instant::now();
    renderer.render(
        &scene,
        write_pixel,
        |fraction| progress.set_position((fraction * 100.0) as u64),
        options.display_interval(),
    )?;
    progress.finish_with_message("Render complete");

    let image = image.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    write_image(&options.image_file, &image)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Unable to write '{}'", options.image_file))?;
    info!(
        "Wrote {} in {:.2?}",
        options.image_file,
        start.elapsed()
    );
    Ok(())
}

//! Integrator

mod common;
mod renderer;
mod sampler_integrator;

use crate::camera::*;
use crate::pbrt::*;
use crate::sampling::DistributionError;
use crate::scene::Scene;
use crate::spectrum::*;
use std::time::Duration;
use thiserror::Error;

// Re-export.
pub use common::*;
pub use renderer::*;
pub use sampler_integrator::*;

/// Errors raised while setting up a render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The image has no pixels.
    #[error("image dimensions {width}x{height} are empty")]
    EmptyImage { width: usize, height: usize },

    /// The camera view or projection cannot be inverted.
    #[error("camera view or projection matrix is singular")]
    SingularCamera,

    /// A setting is out of range.
    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    /// The integrator needs light sources but the scene has none.
    #[error("scene has no lights")]
    NoLights,

    /// The Metropolis bootstrap found no path carrying light.
    #[error("bootstrap produced zero luminance over {samples} samples")]
    ZeroBootstrap { samples: usize },

    /// A discrete distribution could not be built.
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

impl RenderError {
    /// Returns an `InvalidSetting` error.
    ///
    /// * `name`   - Name of the setting.
    /// * `reason` - Why the value is rejected.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name,
            reason: reason.into(),
        }
    }
}

/// Everything an integrator needs from the renderer for one render call.
pub struct RenderContext<'a> {
    /// Camera bound to the image resolution.
    pub camera: &'a RasterCamera,

    /// Receives final pixel values. Called concurrently from worker threads
    /// for disjoint pixels.
    pub write_pixel: &'a (dyn Fn(usize, usize, Spectrum) + Sync),

    /// Receives progress in [0, 1] on the calling thread while all workers
    /// are paused.
    pub display: &'a mut dyn FnMut(Float),

    /// Time between display callbacks.
    pub interval: Duration,

    /// Number of worker threads.
    pub n_threads: usize,

    /// Tile edge length in pixels.
    pub tile_size: usize,
}

/// Integrator interface.
pub trait Integrator: Send + Sync {
    /// Returns the integrator name for logging.
    fn name(&self) -> &'static str;

    /// Preprocess the scene before rendering. Fails if the scene cannot be
    /// rendered with this integrator.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, _scene: &Scene) -> Result<(), RenderError> {
        Ok(())
    }

    /// Render the scene. Blocks until every pixel is written.
    ///
    /// * `scene` - The scene.
    /// * `ctx`   - The render context.
    fn render(&self, scene: &Scene, ctx: &mut RenderContext) -> Result<(), RenderError>;
}

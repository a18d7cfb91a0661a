//! Renderer

use super::*;
use std::time::Instant;

/// Drives an integrator over a scene and hands pixels to the caller.
pub struct Renderer {
    /// Camera bound to the image resolution.
    camera: RasterCamera,

    /// The integrator.
    integrator: Box<dyn Integrator>,

    /// Number of worker threads.
    n_threads: usize,

    /// Tile edge length in pixels.
    tile_size: usize,
}

impl Renderer {
    /// Create a new renderer. The camera's view and projection are queried
    /// once here.
    ///
    /// * `camera`     - The camera.
    /// * `width`      - Image width in pixels.
    /// * `height`     - Image height in pixels.
    /// * `integrator` - The integrator.
    /// * `n_threads`  - Number of worker threads.
    /// * `tile_size`  - Tile edge length in pixels.
    pub fn new(
        camera: &dyn Camera,
        width: usize,
        height: usize,
        integrator: Box<dyn Integrator>,
        n_threads: usize,
        tile_size: usize,
    ) -> Result<Self, RenderError> {
        if n_threads == 0 {
            return Err(RenderError::invalid("nthreads", "must be at least 1"));
        }
        if tile_size == 0 {
            return Err(RenderError::invalid("tile-size", "must be at least 1"));
        }
        Ok(Self {
            camera: RasterCamera::new(camera, width, height)?,
            integrator,
            n_threads,
            tile_size,
        })
    }

    /// Returns the camera bound to the image resolution.
    pub fn camera(&self) -> &RasterCamera {
        &self.camera
    }

    /// Render the scene. This blocks until the image is complete.
    ///
    /// * `scene`       - The scene.
    /// * `write_pixel` - Receives pixel values; called concurrently for
    ///                   disjoint pixels.
    /// * `display`     - Receives progress in [0, 1] on the calling thread
    ///                   while no worker is writing.
    /// * `interval`    - Time between display callbacks.
    pub fn render<W, D>(
        &mut self,
        scene: &Scene,
        write_pixel: W,
        mut display: D,
        interval: Duration,
    ) -> Result<(), RenderError>
    where
        W: Fn(usize, usize, Spectrum) + Sync,
        D: FnMut(Float),
    {
        self.integrator.preprocess(scene)?;

        info!(
            "Rendering {}x{} image with {} integrator on {} threads",
            self.camera.width(),
            self.camera.height(),
            self.integrator.name(),
            self.n_threads
        );
        let start = Instant::now();

        let mut ctx = RenderContext {
            camera: &self.camera,
            write_pixel: &write_pixel,
            display: &mut display,
            interval,
            n_threads: self.n_threads,
            tile_size: self.tile_size,
        };
        self.integrator.render(scene, &mut ctx)?;

        info!("Render complete in {:.2?}", start.elapsed());
        Ok(())
    }
}

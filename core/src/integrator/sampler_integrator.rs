//! Sampler Integrator

use super::*;
use crate::geometry::*;
use crate::parallel::*;
use crate::sampler::*;

/// Common data for sampler integrators.
#[derive(Copy, Clone, Debug)]
pub struct SamplerIntegratorData {
    /// Maximum number of bounces.
    pub max_depth: usize,

    /// Samples taken per pixel.
    pub samples_per_pixel: usize,

    /// Seed for the per-worker random streams.
    pub seed: u64,
}

impl SamplerIntegratorData {
    /// Create a new `SamplerIntegratorData`.
    ///
    /// * `max_depth`         - Maximum number of bounces.
    /// * `samples_per_pixel` - Samples taken per pixel.
    /// * `seed`              - Seed for the per-worker random streams.
    pub fn new(max_depth: usize, samples_per_pixel: usize, seed: u64) -> Result<Self, RenderError> {
        if samples_per_pixel == 0 {
            return Err(RenderError::invalid("spp", "must be at least 1"));
        }
        Ok(Self {
            max_depth,
            samples_per_pixel,
            seed,
        })
    }
}

/// Implements the basis of a rendering process driven by a stream of samples
/// from a `Sampler`. Each sample identifies a point on the image plane at
/// which we compute the light arriving from the scene.
pub trait SamplerIntegrator: Send + Sync {
    /// Returns the common data.
    fn get_data(&self) -> &SamplerIntegratorData;

    /// Returns the radiance arriving at the camera through a raster position.
    ///
    /// * `p_raster` - Raster position of the sample.
    /// * `scene`    - The scene.
    /// * `camera`   - The camera.
    /// * `sampler`  - The sampler.
    fn li(
        &self,
        p_raster: &Point2f,
        scene: &Scene,
        camera: &RasterCamera,
        sampler: &mut dyn Sampler,
    ) -> Spectrum;

    /// Render the scene one tile per work unit. Each worker owns a random
    /// stream. Pixels are written with the average of their samples.
    ///
    /// * `scene` - The scene.
    /// * `ctx`   - The render context.
    fn render_tiles(&self, scene: &Scene, ctx: &mut RenderContext) -> Result<(), RenderError> {
        let camera = ctx.camera;
        let tiles = generate_tiles(camera.width(), camera.height(), ctx.tile_size);
        debug!("Rendering {} tiles", tiles.len());

        let seed = self.get_data().seed;
        let scheduler = Scheduler::new(tiles);
        let write_pixel = ctx.write_pixel;
        scheduler.run(
            ctx.n_threads,
            |worker| RandomSampler::new(seed.wrapping_add(worker as u64)),
            |sampler, tile, _| self.render_tile(&tile, scene, camera, sampler, write_pixel),
            &mut *ctx.display,
            ctx.interval,
        );
        Ok(())
    }

    /// Render an image tile.
    ///
    /// * `tile`        - Pixel bounds of the tile.
    /// * `scene`       - Scene.
    /// * `camera`      - The camera.
    /// * `sampler`     - The worker's sampler.
    /// * `write_pixel` - Receives finished pixels.
    fn render_tile(
        &self,
        tile: &Bounds2i,
        scene: &Scene,
        camera: &RasterCamera,
        sampler: &mut RandomSampler,
        write_pixel: &(dyn Fn(usize, usize, Spectrum) + Sync),
    ) {
        let spp = self.get_data().samples_per_pixel;

        // Loop over pixels in tile to render them.
        for pixel in tile.pixels() {
            let mut sum = Spectrum::ZERO;
            for sample in 0..spp {
                sampler.start_pixel_sample();
                let p_raster = Point2f::from(pixel) + sampler.get_2d();
                let l = self.li(&p_raster, scene, camera, sampler);

                // Drop unexpected radiance values.
                if l.has_nans() {
                    error!(
                        "Not-a-number radiance value returned for pixel ({}, {}), sample {}. Setting to black.",
                        pixel.x, pixel.y, sample
                    );
                } else if !l.is_finite() {
                    error!(
                        "Infinite radiance value returned for pixel ({}, {}), sample {}. Setting to black.",
                        pixel.x, pixel.y, sample
                    );
                } else if l.y() < -1e-5 {
                    error!(
                        "Negative luminance value, {}, returned for pixel ({}, {}), sample {}. Setting to black.",
                        l.y(),
                        pixel.x,
                        pixel.y,
                        sample
                    );
                } else {
                    sum += l;
                }
            }
            write_pixel(pixel.x as usize, pixel.y as usize, sum / spp as Float);
        }
    }
}

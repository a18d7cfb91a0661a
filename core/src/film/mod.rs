//! Film

use crate::geometry::*;
use crate::parallel::AtomicFloat;
use crate::pbrt::*;
use crate::spectrum::*;

/// Per-pixel RGB accumulator that many threads can splat into at once
/// without locks.
///
/// Each channel is added atomically. A concurrent reader may observe a pixel
/// with only some of its channels updated; the final sums are exact once
/// all writers are done.
pub struct SplatFilm {
    /// The image resolution in pixels.
    pub resolution: Point2i,

    /// Accumulated sums, 3 channels per pixel in scanline order.
    pixels: Vec<[AtomicFloat; 3]>,
}

impl SplatFilm {
    /// Create a new `SplatFilm` with all pixels black.
    ///
    /// * `width`  - Image width.
    /// * `height` - Image height.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            resolution: Point2i::new(width as i32, height as i32),
            pixels: (0..width * height).map(|_| Default::default()).collect(),
        }
    }

    /// Returns the offset of a pixel or `None` if it is outside the image.
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.resolution.x || y >= self.resolution.y {
            None
        } else {
            Some(y as usize * self.resolution.x as usize + x as usize)
        }
    }

    /// Add a contribution to the pixel containing a continuous film
    /// position. Non-finite contributions and positions off the image are
    /// ignored.
    ///
    /// * `p_film` - Continuous raster position.
    /// * `v`      - The contribution.
    pub fn add_splat(&self, p_film: &Point2f, v: Spectrum) {
        if !v.is_finite() {
            warn!("Ignoring non-finite splat at ({}, {})", p_film.x, p_film.y);
            return;
        }
        let p = p_film.floor();
        if let Some(offset) = self.offset(p.x, p.y) {
            for (c, channel) in self.pixels[offset].iter().enumerate() {
                channel.add(v[c]);
            }
        }
    }

    /// Returns the accumulated value of a pixel.
    ///
    /// * `x` - Column.
    /// * `y` - Row.
    pub fn pixel(&self, x: usize, y: usize) -> Spectrum {
        match self.offset(x as i32, y as i32) {
            Some(offset) => {
                let [r, g, b] = &self.pixels[offset];
                Spectrum::rgb(r.load(), g.load(), b.load())
            }
            None => Spectrum::ZERO,
        }
    }

    /// Calls `f` with every pixel's accumulated value multiplied by `scale`.
    ///
    /// * `scale` - Scale factor.
    /// * `f`     - Receives column, row and value.
    pub fn for_each_pixel<F: FnMut(usize, usize, Spectrum)>(&self, scale: Float, mut f: F) {
        let width = self.resolution.x as usize;
        for (offset, [r, g, b]) in self.pixels.iter().enumerate() {
            let v = Spectrum::rgb(r.load(), g.load(), b.load()) * scale;
            f(offset % width, offset / width, v);
        }
    }
}

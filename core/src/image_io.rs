//! Image I/O

use crate::pbrt::*;
use crate::spectrum::*;
use image::{ImageBuffer, ImageFormat, Rgb};
use std::path::Path;

/// Stores RGB image data.
#[derive(Clone, Debug)]
pub struct RGBImage {
    /// The pixels in scanline order.
    pub pixels: Vec<RGBSpectrum>,

    /// Image width.
    pub width: usize,

    /// Image height.
    pub height: usize,
}

impl RGBImage {
    /// Creates a new black `RGBImage`.
    ///
    /// * `width`  - Width of image.
    /// * `height` - Height of image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![RGBSpectrum::ZERO; width * height],
            width,
            height,
        }
    }

    /// Sets a pixel.
    ///
    /// * `x` - Column.
    /// * `y` - Row.
    /// * `v` - Pixel value.
    pub fn set(&mut self, x: usize, y: usize, v: RGBSpectrum) {
        let offset = y * self.width + x;
        self.pixels[offset] = v;
    }

    /// Returns a pixel.
    ///
    /// * `x` - Column.
    /// * `y` - Row.
    pub fn get(&self, x: usize, y: usize) -> RGBSpectrum {
        self.pixels[y * self.width + x]
    }
}

/// Write the output image to given path. The format is chosen by the file
/// extension.
///
/// * `path`  - Output file path.
/// * `image` - The image.
pub fn write_image(path: &str, image: &RGBImage) -> Result<(), String> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => write_8_bit(path, image, ImageFormat::Png),
        Some("tga") => write_8_bit(path, image, ImageFormat::Tga),
        Some(extension) => Err(format!("Extension .{extension} is not supported")),
        None => Err(format!("Can't determine file type from suffix of filename {path}")),
    }
}

/// Writes the image in an 8-bit image format.
///
/// * `path`         - Output file path.
/// * `image`        - The image.
/// * `image_format` - Image format.
fn write_8_bit(path: &str, image: &RGBImage, image_format: ImageFormat) -> Result<(), String> {
    let (res_x, res_y) = (image.width as u32, image.height as u32);
    info!("Writing image {path} with resolution {res_x}x{res_y}");

    let imgbuf = ImageBuffer::from_fn(res_x, res_y, |x, y| {
        // 8-bit format; apply gamma and clamp.
        Rgb(apply_gamma(&image.get(x as usize, y as usize).to_rgb()))
    });

    // Write the output file.
    match imgbuf.save_with_format(path, image_format) {
        Ok(()) => Ok(()),
        Err(err) => Err(format!("Error saving output image {path}: {err}.")),
    }
}

/// Apply gamma correction to RGB values.
///
/// * `rgb` - Linear RGB values.
fn apply_gamma(rgb: &[Float; 3]) -> [u8; 3] {
    [clamp_byte(rgb[0]), clamp_byte(rgb[1]), clamp_byte(rgb[2])]
}

/// Clamp floating point value to 8-bit range [0, 255].
///
/// * `v` - Value to clamp.
#[inline]
fn clamp_byte(v: Float) -> u8 {
    clamp(255.0 * gamma_correct(v) + 0.5, 0.0, 255.0) as u8
}

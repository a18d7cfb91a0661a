//! Tiles

use crate::geometry::*;
use itertools::iproduct;

/// Split an image into square tiles of at most `tile_size` pixels on a side,
/// in scanline order of tiles. Edge tiles are clipped to the image.
///
/// * `width`     - Image width.
/// * `height`    - Image height.
/// * `tile_size` - Tile edge length in pixels.
pub fn generate_tiles(width: usize, height: usize, tile_size: usize) -> Vec<Bounds2i> {
    assert!(tile_size > 0, "tile size must be positive");

    let (w, h, ts) = (width as i32, height as i32, tile_size as i32);
    let n_tiles = Point2i::new((w + ts - 1) / ts, (h + ts - 1) / ts);
    iproduct!(0..n_tiles.y, 0..n_tiles.x)
        .map(|(ty, tx)| {
            let (x0, y0) = (tx * ts, ty * ts);
            Bounds2i::new(
                Point2i::new(x0, y0),
                Point2i::new((x0 + ts).min(w), (y0 + ts).min(h)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn exact_fit() {
        let tiles = generate_tiles(128, 128, 64);
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles.iter().map(|t| t.area()).sum::<usize>(), 128 * 128);
    }

    #[test]
    fn partial_fit_covers_every_pixel_once() {
        let tiles = generate_tiles(100, 37, 16);
        assert_eq!(tiles.len(), 7 * 3);
        let mut seen = HashSet::new();
        for t in tiles.iter() {
            for p in t.pixels() {
                assert!(seen.insert(p), "pixel {:?} covered twice", p);
            }
        }
        assert_eq!(seen.len(), 100 * 37);
    }

    #[test]
    fn empty_image_has_no_tiles() {
        assert!(generate_tiles(0, 10, 8).is_empty());
    }
}

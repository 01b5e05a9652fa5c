//! Splitting a caller-owned image buffer into disjoint, independently
//! writable bands.  Each `Band` owns a mutable slice of the pixel data
//! covering only its own rows, so bands can be handed to different
//! threads without any locking.

use image::{ImageBuffer, Pixel};

use crate::tiles::Tile;

/// The pixel buffer type the renderer draws into.
pub type Raster<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

/// A writable full-width horizontal slice of a raster.
pub struct Band<'a, P: Pixel> {
    tile: Tile,
    stride: usize,
    data: &'a mut [P::Subpixel],
}

impl<'a, P: Pixel> Band<'a, P> {
    /// The region of the raster this band may write.
    pub fn tile(&self) -> Tile {
        self.tile
    }

    /// Write `pixel` at raster coordinates `(x, y)`, which must lie
    /// inside this band's tile.
    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: P) {
        assert!(
            x >= self.tile.min_x && x < self.tile.max_x && y >= self.tile.min_y && y < self.tile.max_y,
            "pixel ({}, {}) outside band {:?}",
            x,
            y,
            self.tile
        );
        let channels = usize::from(P::CHANNEL_COUNT);
        let offset = (y - self.tile.min_y) as usize * self.stride + x as usize * channels;
        *P::from_slice_mut(&mut self.data[offset..offset + channels]) = pixel;
    }
}

/// Carve `image` into one band per tile.  The tiles must be full-width,
/// in order, and together cover the image exactly, as `tiles::bands`
/// produces them.
pub fn split_bands<'a, P: Pixel>(image: &'a mut Raster<P>, tiles: &[Tile]) -> Vec<Band<'a, P>> {
    let (width, height) = image.dimensions();
    let stride = width as usize * usize::from(P::CHANNEL_COUNT);
    let mut rest: &mut [P::Subpixel] = &mut **image;
    let mut next_row = 0;
    let mut out = Vec::with_capacity(tiles.len());
    for tile in tiles {
        assert!(
            tile.min_x == 0 && tile.max_x == width && tile.min_y == next_row,
            "tile {:?} is not the next full-width band",
            tile
        );
        let (data, tail) = std::mem::take(&mut rest).split_at_mut(tile.height() as usize * stride);
        rest = tail;
        next_row = tile.max_y;
        out.push(Band {
            tile: *tile,
            stride,
            data,
        });
    }
    assert_eq!(next_row, height, "tiles do not cover the image");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::bands;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn bands_write_only_their_rows() {
        let mut image = GrayImage::new(4, 5);
        let tiles = bands(4, 5, 2);
        for (i, mut band) in split_bands(&mut image, &tiles).into_iter().enumerate() {
            let tile = band.tile();
            for y in tile.rows() {
                for x in tile.columns() {
                    band.put_pixel(x, y, Luma([i as u8 + 1]));
                }
            }
        }
        for (_, y, pixel) in image.enumerate_pixels() {
            let expected = if y < 2 { 1 } else { 2 };
            assert_eq!(*pixel, Luma([expected]));
        }
    }

    #[test]
    fn multi_channel_offsets() {
        let mut image = RgbaImage::new(3, 2);
        let tiles = bands(3, 2, 2);
        let mut split = split_bands(&mut image, &tiles);
        split[1].put_pixel(2, 1, Rgba([1, 2, 3, 4]));
        split[0].put_pixel(1, 0, Rgba([5, 6, 7, 8]));
        drop(split);
        assert_eq!(*image.get_pixel(2, 1), Rgba([1, 2, 3, 4]));
        assert_eq!(*image.get_pixel(1, 0), Rgba([5, 6, 7, 8]));
        assert_eq!(*image.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn empty_bands_are_allowed() {
        let mut image = GrayImage::new(2, 1);
        let tiles = bands(2, 1, 3);
        let split = split_bands(&mut image, &tiles);
        assert_eq!(split.len(), 3);
        assert_eq!(split.iter().filter(|b| b.tile().is_empty()).count(), 2);
    }

    #[test]
    #[should_panic]
    fn writes_outside_the_band_panic() {
        let mut image = GrayImage::new(2, 4);
        let tiles = bands(2, 4, 2);
        let mut split = split_bands(&mut image, &tiles);
        split[0].put_pixel(0, 3, Luma([1]));
    }
}

//! Partitioning a raster into disjoint rectangles, one per unit of work.

use std::ops::Range;

/// A half-open rectangle `[min_x, max_x) x [min_y, max_y)` of raster
/// pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    /// First column.
    pub min_x: u32,
    /// One past the last column.
    pub max_x: u32,
    /// First row.
    pub min_y: u32,
    /// One past the last row.
    pub max_y: u32,
}

impl Tile {
    /// The tile covering an entire `width` x `height` raster.
    pub fn full(width: u32, height: u32) -> Tile {
        Tile {
            min_x: 0,
            max_x: width,
            min_y: 0,
            max_y: height,
        }
    }

    /// Columns in this tile.
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    /// Rows in this tile.
    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    /// The column range.
    pub fn columns(&self) -> Range<u32> {
        self.min_x..self.max_x
    }

    /// The row range.
    pub fn rows(&self) -> Range<u32> {
        self.min_y..self.max_y
    }

    /// Number of pixels in this tile.
    pub fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    /// True if the tile holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Splits a `width` x `height` raster into `count` full-width horizontal
/// bands.  Band `i` starts at row `floor(height * i / count)`, so the
/// bands are contiguous and cover every row exactly once even when
/// `height` isn't a multiple of `count`.  If `count` exceeds `height`
/// some bands are empty.  A `count` of zero yields no bands.
pub fn bands(width: u32, height: u32, count: usize) -> Vec<Tile> {
    if count == 0 {
        return Vec::new();
    }
    let boundary = |i: usize| (u128::from(height) * i as u128 / count as u128) as u32;
    (0..count)
        .map(|i| Tile {
            min_x: 0,
            max_x: width,
            min_y: boundary(i),
            max_y: boundary(i + 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_height_exactly() {
        for height in 1..=200u32 {
            for count in 1..=64usize {
                let tiles = bands(3, height, count);
                assert_eq!(tiles.len(), count);
                assert_eq!(tiles[0].min_y, 0);
                assert_eq!(tiles[count - 1].max_y, height);
                for pair in tiles.windows(2) {
                    assert_eq!(pair[0].max_y, pair[1].min_y);
                }
                let total: u32 = tiles.iter().map(Tile::height).sum();
                assert_eq!(total, height, "height {} count {}", height, count);
                assert!(tiles.iter().all(|t| t.min_y <= t.max_y));
            }
        }
    }

    #[test]
    fn bands_span_full_width() {
        for tile in bands(17, 10, 4) {
            assert_eq!(tile.columns(), 0..17);
        }
    }

    #[test]
    fn uneven_split() {
        let heights: Vec<u32> = bands(1, 10, 3).iter().map(Tile::height).collect();
        assert_eq!(heights, vec![3, 3, 4]);
    }

    #[test]
    fn more_bands_than_rows() {
        let tiles = bands(4, 2, 5);
        assert_eq!(tiles.iter().filter(|t| !t.is_empty()).count(), 2);
        assert_eq!(tiles.iter().map(Tile::len).sum::<usize>(), 8);
    }

    #[test]
    fn zero_bands_is_empty() {
        assert!(bands(8, 6, 0).is_empty());
    }

    #[test]
    fn single_band_is_full_tile() {
        assert_eq!(bands(8, 6, 1), vec![Tile::full(8, 6)]);
    }
}

//! Atlas addressing, geometry planning and pixel storage.
//!
//! An atlas is one RGBA8 bitmap packing many fixed-size glyph cells for
//! single-texture GPU sampling. The grid is at most 255x255 cells so a
//! renderer can address any cell with a single byte per axis; cell (0,0)
//! is permanently reserved blank as the missing-glyph fallback.

pub mod blit;

use crate::error::Error;
use log::{error, trace};
use std::collections::HashMap;

/// Bytes per atlas pixel (RGBA).
pub(crate) const BYTES_PER_PIXEL: usize = 4;

/// Addressing limit per grid axis: one unsigned byte.
const MAX_GRID_SIDE: usize = u8::MAX as usize;

/// One glyph cell in the atlas grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasPosition {
    /// Cell column, 0-based.
    pub col: u8,
    /// Cell row, 0-based.
    pub row: u8,
}

/// Mapping from code point to atlas cell, built exactly once by a Regular
/// or DoubleWidth font build in face-enumeration order and immutable
/// afterwards. Overlay fonts share the Regular map and never add to it.
#[derive(Debug, Default, Clone)]
pub struct AtlasMap {
    map: HashMap<u32, AtlasPosition>,
}

impl AtlasMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, charcode: u32, pos: AtlasPosition) {
        self.map.insert(charcode, pos);
    }

    /// Cell assigned to `charcode`, if the build recorded one.
    pub fn get(&self, charcode: u32) -> Option<AtlasPosition> {
        self.map.get(&charcode).copied()
    }

    pub fn contains(&self, charcode: u32) -> bool {
        self.map.contains_key(&charcode)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All recorded (code point, cell) assignments, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, AtlasPosition)> + '_ {
        self.map.iter().map(|(&c, &p)| (c, p))
    }
}

/// Grid dimensions of one atlas: `nx` columns by `ny` rows of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasGeometry {
    pub nx: usize,
    pub ny: usize,
}

impl AtlasGeometry {
    /// Compute grid dimensions holding `n_glyphs` cells of `px` by `py`
    /// pixels while keeping the atlas's pixel dimensions close to square.
    ///
    /// Seeds `nx`/`ny` from the square root of the total pixel area, then
    /// grows whichever pixel side is currently shorter until the grid has
    /// capacity. Fails if either axis leaves single-byte addressing range.
    pub fn plan(n_glyphs: usize, px: usize, py: usize) -> Result<Self, Error> {
        let total_pixels = (n_glyphs * px * py) as f64;
        let side = total_pixels.sqrt();
        let mut nx = (side / px as f64) as usize;
        let mut ny = (side / py as f64) as usize;
        while nx * ny < n_glyphs {
            if px * nx < py * ny {
                nx += 1;
            } else {
                ny += 1;
            }
        }

        if nx > MAX_GRID_SIDE || ny > MAX_GRID_SIDE {
            error!(
                "Atlas geometry not addressable by single byte coords. \
                 Please report this as a bug with your font attached!"
            );
            return Err(Error::ImpossibleAtlasGeometry { nx, ny });
        }

        trace!(
            "Atlas texture geometry: {}x{} glyphs of {}x{} each, yielding pixel size {}x{}.",
            nx,
            ny,
            px,
            py,
            nx * px,
            ny * py
        );
        trace!(
            "Atlas holds space for {} glyphs, {} will be used, empty: {} ({:.1}%)",
            nx * ny,
            n_glyphs,
            nx * ny - n_glyphs,
            100.0 * (nx * ny - n_glyphs) as f64 / (nx * ny) as f64
        );

        Ok(Self { nx, ny })
    }

    /// Cell of the `seq`-th glyph in sequential fill order.
    pub(crate) fn position(&self, seq: usize) -> AtlasPosition {
        let row = seq / self.nx;
        let col = seq - self.nx * row;
        AtlasPosition {
            col: col as u8,
            row: row as u8,
        }
    }

    /// Total cell capacity of the grid.
    pub fn capacity(&self) -> usize {
        self.nx * self.ny
    }
}

/// Contiguous RGBA8 pixel storage for one atlas, row-major over the whole
/// texture. Logically a grid of `nx` by `ny` cells of `px` by `py` pixels.
#[derive(Debug, Clone)]
pub struct AtlasBuffer {
    px: usize,
    py: usize,
    nx: usize,
    ny: usize,
    data: Vec<u8>,
}

impl AtlasBuffer {
    /// Allocate a zeroed buffer for the given grid. Leaving the memory
    /// zeroed is what keeps cell (0,0), and every never-written cell,
    /// blank.
    pub fn new(geometry: AtlasGeometry, px: usize, py: usize) -> Self {
        let bytes = BYTES_PER_PIXEL * geometry.nx * px * geometry.ny * py;
        trace!("Allocating {} bytes for atlas buffer", bytes);
        Self {
            px,
            py,
            nx: geometry.nx,
            ny: geometry.ny,
            data: vec![0; bytes],
        }
    }

    /// Texture width in pixels.
    pub fn width(&self) -> usize {
        self.nx * self.px
    }

    /// Texture height in pixels.
    pub fn height(&self) -> usize {
        self.ny * self.py
    }

    /// Cell width in pixels.
    pub fn cell_width(&self) -> usize {
        self.px
    }

    /// Cell height in pixels.
    pub fn cell_height(&self) -> usize {
        self.py
    }

    /// The raw RGBA bytes, row-major over the full texture.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Byte offset of the top-left pixel of a cell.
    pub(crate) fn cell_offset(&self, pos: AtlasPosition) -> usize {
        let row_stride = BYTES_PER_PIXEL * self.nx * self.px * self.py;
        pos.row as usize * row_stride + BYTES_PER_PIXEL * pos.col as usize * self.px
    }

    /// Byte stride from one pixel row to the next.
    pub(crate) fn row_stride(&self) -> usize {
        BYTES_PER_PIXEL * self.nx * self.px
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy of one cell's pixel region as RGBA bytes, `px * py * 4` long.
    /// Intended for tests and diagnostics, not the render path.
    pub fn cell_pixels(&self, pos: AtlasPosition) -> Vec<u8> {
        let mut out = Vec::with_capacity(BYTES_PER_PIXEL * self.px * self.py);
        let base = self.cell_offset(pos);
        for j in 0..self.py {
            let start = base + j * self.row_stride();
            out.extend_from_slice(&self.data[start..start + BYTES_PER_PIXEL * self.px]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_guarantees_capacity_near_square() {
        // 3 loadable glyphs + 1 reserved blank, 10x20 cells.
        let geo = AtlasGeometry::plan(4, 10, 20).unwrap();
        assert!(geo.capacity() >= 4);
        assert_eq!((geo.nx, geo.ny), (2, 2));
        // 20x40 pixels vs 40x20: both axes stay balanced.
        assert!(geo.nx * 10 <= 2 * geo.ny * 20);
    }

    #[test]
    fn planner_covers_single_glyph() {
        let geo = AtlasGeometry::plan(1, 8, 16).unwrap();
        assert!(geo.capacity() >= 1);
        assert!(geo.nx >= 1 && geo.ny >= 1);
    }

    #[test]
    fn planner_capacity_holds_across_sizes() {
        for n in [2, 17, 128, 1000, 4096] {
            for (px, py) in [(8, 16), (10, 20), (7, 13)] {
                let geo = AtlasGeometry::plan(n, px, py).unwrap();
                assert!(
                    geo.capacity() >= n,
                    "n={} px={} py={} -> {:?}",
                    n,
                    px,
                    py,
                    geo
                );
                assert!(geo.nx <= 255 && geo.ny <= 255);
            }
        }
    }

    #[test]
    fn planner_rejects_unaddressable_grids() {
        // 1x1 pixel cells force the grid side past 255.
        let err = AtlasGeometry::plan(100_000, 1, 1).unwrap_err();
        assert!(matches!(err, Error::ImpossibleAtlasGeometry { .. }));
    }

    #[test]
    fn sequential_positions_fill_rows_first() {
        let geo = AtlasGeometry { nx: 3, ny: 2 };
        let positions: Vec<_> = (0..6).map(|s| geo.position(s)).collect();
        assert_eq!(positions[0], AtlasPosition { col: 0, row: 0 });
        assert_eq!(positions[1], AtlasPosition { col: 1, row: 0 });
        assert_eq!(positions[2], AtlasPosition { col: 2, row: 0 });
        assert_eq!(positions[3], AtlasPosition { col: 0, row: 1 });
        assert_eq!(positions[5], AtlasPosition { col: 2, row: 1 });
    }

    #[test]
    fn buffer_starts_blank() {
        let geo = AtlasGeometry { nx: 2, ny: 2 };
        let buf = AtlasBuffer::new(geo, 4, 6);
        assert_eq!(buf.data().len(), 4 * 8 * 12);
        assert!(buf.data().iter().all(|&b| b == 0));
        assert_eq!(buf.width(), 8);
        assert_eq!(buf.height(), 12);
    }

    #[test]
    fn cell_offset_addresses_grid_cells() {
        let geo = AtlasGeometry { nx: 4, ny: 3 };
        let buf = AtlasBuffer::new(geo, 5, 7);
        assert_eq!(buf.cell_offset(AtlasPosition { col: 0, row: 0 }), 0);
        // One cell to the right: 4 bytes * 5 pixels.
        assert_eq!(buf.cell_offset(AtlasPosition { col: 1, row: 0 }), 20);
        // One cell row down: full pixel rows of the texture times py.
        assert_eq!(
            buf.cell_offset(AtlasPosition { col: 0, row: 1 }),
            4 * 4 * 5 * 7
        );
    }

    #[test]
    fn map_records_assignments() {
        let mut map = AtlasMap::new();
        map.insert(0x41, AtlasPosition { col: 1, row: 0 });
        map.insert(0xFFFD, AtlasPosition { col: 2, row: 0 });
        assert_eq!(map.len(), 2);
        assert!(map.contains(0x41));
        assert_eq!(map.get(0x41), Some(AtlasPosition { col: 1, row: 0 }));
        assert_eq!(map.get(0x42), None);
    }
}

//! Pixel decode of rasterized glyphs into atlas cells.
//!
//! One call writes one glyph bitmap into its destination cell, decoding
//! the engine's pixel encoding into RGBA bytes. The RGB channels carry
//! the coverage; the fourth byte is the renderer's to define and is never
//! written by the decoders (only an overlay pre-clear zeroes it).
//!
//! Placement rules:
//! - a positive horizontal bearing shifts the write right within the cell;
//!   a negative bearing is compensated by skipping source columns, never
//!   by writing left of the cell;
//! - when the font has a baseline, the glyph top is positioned against it;
//! - oversized glyphs are cropped at the cell bounds, never allowed to
//!   bleed into neighboring cells.

use crate::atlas::{AtlasBuffer, AtlasPosition, BYTES_PER_PIXEL};
use crate::face::{PixelFormat, RasterizedGlyph};

/// Write one rasterized glyph into its cell.
///
/// `overlay` marks a rewrite of a cell the primary font already populated
/// in its own buffer: the full cell region is zeroed first so no stale
/// pixels survive around a smaller overlay glyph.
pub fn blit_glyph(
    atlas: &mut AtlasBuffer,
    pos: AtlasPosition,
    glyph: &RasterizedGlyph,
    baseline: usize,
    overlay: bool,
) {
    let px = atlas.cell_width();
    let py = atlas.cell_height();

    // Destination pixel offset within the cell.
    let xskip = (-glyph.bearing_x).max(0) as usize;
    let dx = glyph.bearing_x.max(0) as usize;
    let dy = if baseline != 0 && (baseline as i64) > i64::from(glyph.top) {
        (baseline as i64 - i64::from(glyph.top)) as usize
    } else {
        0
    };

    // Written extent: clipped to the cell and to the source columns that
    // remain after the left-overflow skip.
    let bw = glyph
        .pixel_width()
        .saturating_sub(xskip)
        .min(px.saturating_sub(dx));
    let bh = glyph.rows.min(py.saturating_sub(dy));

    let stride = atlas.row_stride();
    let cell_offset = atlas.cell_offset(pos);

    if overlay {
        for j in 0..py {
            let start = cell_offset + j * stride;
            atlas.data_mut()[start..start + BYTES_PER_PIXEL * px].fill(0);
        }
    }

    let write_offset = cell_offset + stride * dy + BYTES_PER_PIXEL * dx;
    let data = atlas.data_mut();

    match glyph.format {
        PixelFormat::Mono => {
            for j in 0..bh {
                let src_row = j * glyph.pitch;
                let dst_row = write_offset + j * stride;
                for k in 0..bw {
                    // 1 bit per pixel, MSB-first within each byte.
                    let bit = xskip + k;
                    let byte = glyph.data[src_row + bit / 8];
                    let val = if byte & (0x80 >> (bit % 8)) != 0 {
                        0xFF
                    } else {
                        0
                    };
                    let p = dst_row + BYTES_PER_PIXEL * k;
                    data[p] = val;
                    data[p + 1] = val;
                    data[p + 2] = val;
                }
            }
        }
        PixelFormat::Gray => {
            for j in 0..bh {
                let src_row = j * glyph.pitch + xskip;
                let dst_row = write_offset + j * stride;
                for k in 0..bw {
                    let val = glyph.data[src_row + k];
                    let p = dst_row + BYTES_PER_PIXEL * k;
                    data[p] = val;
                    data[p + 1] = val;
                    data[p + 2] = val;
                }
            }
        }
        PixelFormat::Lcd => {
            // 3 bytes per pixel, already in display channel order.
            for j in 0..bh {
                let src_row = j * glyph.pitch + 3 * xskip;
                let dst_row = write_offset + j * stride;
                for k in 0..bw {
                    let s = src_row + 3 * k;
                    let p = dst_row + BYTES_PER_PIXEL * k;
                    data[p] = glyph.data[s];
                    data[p + 1] = glyph.data[s + 1];
                    data[p + 2] = glyph.data[s + 2];
                }
            }
        }
    }
}

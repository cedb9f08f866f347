//! Engine and face seams for glyph rasterization.
//!
//! This module defines the traits the atlas builder programs against:
//! a [`FontEngine`] opens faces from matched descriptors and owns any
//! engine-global state (there are no ambient globals; the engine is an
//! explicitly constructed, caller-owned context), and a [`FontFace`]
//! exposes exactly the primitives one build needs: code-point
//! enumeration in the face's native order, fixed bitmap strikes, scalable
//! outline metrics, pixel-size selection and per-glyph rasterization.
//!
//! The production implementation is FreeType ([`freetype::FreeTypeEngine`]);
//! tests substitute an in-memory mock.

pub mod freetype;

#[cfg(test)]
pub(crate) mod mock;

use crate::descriptor::{FontDescriptor, LcdFilterKind};
use crate::error::Error;

pub use self::freetype::FreeTypeEngine;

/// Load-time grid-fitting target derived from the descriptor's
/// antialias/hinting attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    Normal,
    Light,
    Mono,
}

/// Rasterization mode a glyph is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterMode {
    Normal,
    Light,
    Mono,
    Lcd,
}

/// Hinting and antialiasing decisions, derived once per font build from
/// the descriptor and applied to every glyph of that build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPlan {
    /// Force the autohinter over native font hints.
    pub force_autohint: bool,
    /// Disable hinting entirely.
    pub no_hinting: bool,
    /// Grid-fitting target for outline loading.
    pub target: LoadTarget,
    /// Rasterization mode for outline rendering.
    pub mode: RasterMode,
}

/// Pixel encodings the blitter can decode. A closed set: the engine maps
/// its native pixel modes into this enum and anything else is the fatal
/// unsupported-format error before a build can touch the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 1 bit per pixel, MSB-first within each byte.
    Mono,
    /// 8-bit grayscale coverage.
    Gray,
    /// Horizontal subpixel coverage, 3 bytes per pixel in display channel
    /// order.
    Lcd,
}

/// One fixed bitmap strike embedded in a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strike {
    pub width: usize,
    pub height: usize,
}

/// Global metrics of a scalable face, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlineMetrics {
    pub units_per_em: u32,
    pub ascender: i32,
    pub height: i32,
    pub max_advance_width: i32,
}

/// One rasterized glyph bitmap plus its placement against the pen origin.
#[derive(Debug, Clone)]
pub struct RasterizedGlyph {
    pub format: PixelFormat,
    /// Raw bitmap width in *samples*; for [`PixelFormat::Lcd`] this is
    /// three samples per pixel.
    pub width: usize,
    /// Bitmap height in rows.
    pub rows: usize,
    /// Bytes from one bitmap row to the next (may include padding).
    pub pitch: usize,
    /// Raw bitmap bytes, `rows * pitch` long.
    pub data: Vec<u8>,
    /// Horizontal bearing: left edge of the bitmap relative to the cell
    /// origin. Negative values overhang the cell to the left.
    pub bearing_x: i32,
    /// Vertical bearing: top edge of the bitmap above the baseline.
    pub top: i32,
}

impl RasterizedGlyph {
    /// Width in destination pixels (folds LCD's 3 samples per pixel).
    pub fn pixel_width(&self) -> usize {
        match self.format {
            PixelFormat::Lcd => self.width / 3,
            _ => self.width,
        }
    }
}

/// One opened font face, scoped to a single font build.
pub trait FontFace {
    /// Family name reported by the face, if any.
    fn family_name(&self) -> Option<String>;

    /// Style name reported by the face, if any.
    fn style_name(&self) -> Option<String>;

    /// Total glyph count of the face (all code points, pre-filter).
    fn num_glyphs(&self) -> usize;

    /// All code points in the face's character map, in the face's native
    /// order. This order, not code-point order, determines atlas fill
    /// order.
    fn charcodes(&self) -> Vec<u32>;

    /// Whether the face maps this code point to a glyph.
    fn has_charcode(&self, charcode: u32) -> bool;

    /// Fixed bitmap strikes embedded in the face, empty for pure outline
    /// fonts.
    fn strikes(&self) -> Vec<Strike>;

    /// Global scalable metrics, or `None` for bitmap-only faces.
    fn outline_metrics(&self) -> Option<OutlineMetrics>;

    /// Select the face's pixel size (height).
    fn set_pixel_size(&mut self, height: u32) -> Result<(), Error>;

    /// Load and rasterize one code point under the given plan.
    ///
    /// Failures to load or render a particular glyph come back as
    /// [`Error::GlyphLoad`]/[`Error::GlyphRender`] and are treated by
    /// builds as skip-and-continue; an unsupported pixel encoding is
    /// fatal.
    fn rasterize(&mut self, charcode: u32, plan: &RenderPlan) -> Result<RasterizedGlyph, Error>;
}

/// A rasterizer engine: opens faces and owns engine-global state.
pub trait FontEngine {
    type Face: FontFace;

    /// Open the face a descriptor points at.
    fn open_face(&self, descriptor: &FontDescriptor) -> Result<Self::Face, Error>;

    /// Apply an LCD filter engine-wide. Engines without LCD filtering
    /// support log and ignore the request.
    fn set_lcd_filter(&self, filter: LcdFilterKind);
}

//! Glyph enumeration, loadability and sizing over one opened face.
//!
//! A [`GlyphSource`] wraps one [`FontFace`] for the duration of a single
//! font build. It decides which of the face's code points a terminal
//! atlas wants (the width-based loadability filter), derives the
//! hinting/antialiasing plan from the matched descriptor, and selects the
//! face's pixel size, preferring an embedded fixed bitmap strike when
//! one is close enough to the requested size, scaling outlines otherwise.

use crate::descriptor::{FontDescriptor, HintStyle};
use crate::error::Error;
use crate::face::{FontFace, LoadTarget, RasterMode, RasterizedGlyph, RenderPlan};
use log::{info, trace};
use unicode_width::UnicodeWidthChar;

/// Largest code point of the Basic Multilingual Plane.
pub const BMP_MAX: u32 = 0xFFFF;

/// Terminal-side sentinel for "glyph not found"; always rasterized.
pub const MISSING_GLYPH_MARKER: u32 = 0xFFFF;

/// U+FFFD; always rasterized.
pub const REPLACEMENT_CHARACTER: u32 = 0xFFFD;

/// Terminal display width of a code point: 0 for zero-width and control
/// characters, 1 for narrow, 2 for wide (East-Asian-width classification).
pub fn display_width(charcode: u32) -> usize {
    char::from_u32(charcode)
        .and_then(|c| c.width())
        .unwrap_or(0)
}

/// Whether a code point belongs in an atlas build.
///
/// The missing-glyph marker and the replacement character are loadable in
/// every build. Everything else partitions by display width: wide (2)
/// code points load only into double-width builds, the rest only into
/// normal-width builds.
pub fn is_loadable(charcode: u32, dwidth: bool) -> bool {
    if charcode == MISSING_GLYPH_MARKER || charcode == REPLACEMENT_CHARACTER {
        return true;
    }
    let width = display_width(charcode);
    if dwidth {
        width == 2
    } else {
        width < 2
    }
}

/// Derive the per-build hinting/antialiasing plan from the descriptor.
pub fn render_plan(descriptor: &FontDescriptor) -> RenderPlan {
    let force_autohint = descriptor.autohint;
    let no_hinting = !descriptor.hinting || descriptor.hint_style == HintStyle::None;

    if !descriptor.antialias {
        return RenderPlan {
            force_autohint,
            no_hinting,
            target: LoadTarget::Mono,
            mode: RasterMode::Mono,
        };
    }

    let light =
        descriptor.hint_style > HintStyle::None && descriptor.hint_style < HintStyle::Full;
    let lcd = descriptor.subpixel.is_horizontal_lcd();
    if light {
        RenderPlan {
            force_autohint,
            no_hinting,
            target: LoadTarget::Light,
            mode: if lcd { RasterMode::Lcd } else { RasterMode::Light },
        }
    } else {
        RenderPlan {
            force_autohint,
            no_hinting,
            target: LoadTarget::Normal,
            mode: if lcd { RasterMode::Lcd } else { RasterMode::Normal },
        }
    }
}

/// What an already-built primary font imposes on this build's cell size.
#[derive(Debug, Clone, Copy)]
pub enum SizeConstraint {
    /// First build of a pack: adopt whatever the face yields.
    Primary,
    /// Overlay build: the face must reproduce the primary cell exactly.
    Overlay { px: usize, py: usize },
    /// Double-width build: the cell is fixed at twice the primary width;
    /// a fixed strike must match it exactly.
    DoubleWidth { px: usize, py: usize },
}

impl SizeConstraint {
    fn label(&self) -> &'static str {
        match self {
            SizeConstraint::Primary => "primary",
            SizeConstraint::Overlay { .. } => "overlay",
            SizeConstraint::DoubleWidth { .. } => "double-width",
        }
    }
}

/// Cell metrics produced by size selection. `baseline` is `None` for
/// overlay builds, which keep the primary's baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizedCell {
    pub px: usize,
    pub py: usize,
    pub baseline: Option<usize>,
}

/// One face plus the build-wide decisions made over it.
pub struct GlyphSource<F: FontFace> {
    face: F,
    dwidth: bool,
    plan: RenderPlan,
}

impl<F: FontFace> GlyphSource<F> {
    pub fn new(face: F, descriptor: &FontDescriptor, dwidth: bool) -> Self {
        Self {
            face,
            dwidth,
            plan: render_plan(descriptor),
        }
    }

    pub fn plan(&self) -> RenderPlan {
        self.plan
    }

    pub fn family_name(&self) -> Option<String> {
        self.face.family_name()
    }

    pub fn style_name(&self) -> Option<String> {
        self.face.style_name()
    }

    pub fn num_glyphs(&self) -> usize {
        self.face.num_glyphs()
    }

    /// The face's loadable code points, in the face's native enumeration
    /// order. This order determines atlas fill order.
    pub fn loadable_charcodes(&self) -> Vec<u32> {
        self.face
            .charcodes()
            .into_iter()
            .filter(|&c| is_loadable(c, self.dwidth))
            .collect()
    }

    pub fn has_charcode(&self, charcode: u32) -> bool {
        self.face.has_charcode(charcode)
    }

    /// Rasterize one code point under this build's plan.
    pub fn rasterize(&mut self, charcode: u32) -> Result<RasterizedGlyph, Error> {
        let plan = self.plan;
        self.face.rasterize(charcode, &plan)
    }

    /// Select the face's pixel size against the requested size and the
    /// pack's constraint, returning the resulting cell metrics.
    pub fn select_size(
        &mut self,
        pixel_size: u32,
        constraint: SizeConstraint,
    ) -> Result<SizedCell, Error> {
        if self.face.strikes().is_empty() {
            self.select_scaled(pixel_size, constraint)
        } else {
            self.select_fixed(pixel_size, constraint)
        }
    }

    /// Fixed-strike path: pick the strike whose height is closest to the
    /// requested size; fall back to outline scaling when the best strike
    /// is more than one pixel off and the face is also scalable.
    fn select_fixed(
        &mut self,
        pixel_size: u32,
        constraint: SizeConstraint,
    ) -> Result<SizedCell, Error> {
        let strikes = self.face.strikes();
        let mut best = strikes[0];
        let mut best_diff = i64::MAX;
        {
            let mut listing = String::from("Available sizes:");
            for strike in &strikes {
                listing.push_str(&format!(" {}x{}", strike.width, strike.height));
                let diff = (i64::from(pixel_size) - strike.height as i64).abs();
                if diff < best_diff {
                    best = *strike;
                    best_diff = diff;
                }
            }
            trace!("{}", listing);
        }
        trace!(
            "Configured size: {}; best matching fixed size: {}x{}",
            pixel_size,
            best.width,
            best.height
        );

        if best_diff > 1 && self.face.outline_metrics().is_some() {
            trace!("Size mismatch too large, fallback to rendering outlines.");
            return self.select_scaled(pixel_size, constraint);
        }

        let (px, py) = match constraint {
            SizeConstraint::Primary => (best.width, best.height),
            SizeConstraint::Overlay { px, py } | SizeConstraint::DoubleWidth { px, py } => {
                if best.width != px || best.height != py {
                    return Err(Error::DimensionMismatch {
                        style: constraint.label(),
                        expected_px: px,
                        expected_py: py,
                        got_px: best.width,
                        got_py: best.height,
                    });
                }
                (px, py)
            }
        };
        info!("Glyph size {}x{}", px, py);

        self.face.set_pixel_size(py as u32)?;

        // A fixed strike of an otherwise scalable font still needs the
        // baseline metric from the outline data.
        let baseline = match constraint {
            SizeConstraint::Overlay { .. } => None,
            _ => Some(
                self.face
                    .outline_metrics()
                    .filter(|m| m.height != 0)
                    .map(|m| (py as f64 * f64::from(m.ascender) / f64::from(m.height)) as usize)
                    .unwrap_or(0),
            ),
        };

        Ok(SizedCell { px, py, baseline })
    }

    /// Scaled path: derive the cell from the face's global metrics.
    fn select_scaled(
        &mut self,
        pixel_size: u32,
        constraint: SizeConstraint,
    ) -> Result<SizedCell, Error> {
        let metrics = self.face.outline_metrics().ok_or(Error::UnscalableFace)?;
        let tpx = (f64::from(pixel_size) * f64::from(metrics.max_advance_width)
            / f64::from(metrics.units_per_em)) as usize;
        let tpy = (tpx as f64 * f64::from(metrics.height)
            / f64::from(metrics.max_advance_width)) as usize
            + 1;

        let (px, py) = match constraint {
            SizeConstraint::Primary => (tpx, tpy),
            SizeConstraint::Overlay { px, py } => {
                if tpx != px || tpy != py {
                    return Err(Error::DimensionMismatch {
                        style: constraint.label(),
                        expected_px: px,
                        expected_py: py,
                        got_px: tpx,
                        got_py: tpy,
                    });
                }
                (px, py)
            }
            // A scaled double-width face keeps the imposed cell; glyphs
            // wider than it are cropped by the blitter.
            SizeConstraint::DoubleWidth { px, py } => (px, py),
        };

        let baseline = match constraint {
            SizeConstraint::Overlay { .. } => None,
            _ => Some(
                (tpy as f64 * f64::from(metrics.ascender) / f64::from(metrics.height)) as usize,
            ),
        };

        info!("Glyph size {}x{}", px, py);
        self.face.set_pixel_size(pixel_size)?;

        Ok(SizedCell { px, py, baseline })
    }
}

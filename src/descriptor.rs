//! Matched-font descriptors.
//!
//! A [`FontDescriptor`] is what the font matcher hands back for one family
//! name: the resolved font file plus the rendering attributes that were
//! configured or defaulted during matching. The atlas builder consumes it
//! read-only; nothing in this crate writes a descriptor after resolution.

use std::path::PathBuf;

/// How the requested size was expressed by the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeSource {
    /// Point size at a given DPI.
    Points { pt: f64, dpi: f64 },
    /// Direct pixel size.
    Pixels(u32),
}

impl SizeSource {
    /// The requested size in pixels.
    pub fn pixel_size(&self) -> u32 {
        match *self {
            SizeSource::Points { pt, dpi } => (pt * dpi / 72.0) as u32,
            SizeSource::Pixels(px) => px,
        }
    }
}

/// Hinting strength, mirroring fontconfig's hint-style values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HintStyle {
    None,
    Slight,
    Medium,
    Full,
}

/// Physical subpixel channel layout of the target display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubpixelOrder {
    Unknown,
    Rgb,
    Bgr,
    Vrgb,
    Vbgr,
    None,
}

impl SubpixelOrder {
    /// Whether this layout supports horizontal LCD (subpixel) rendering.
    pub fn is_horizontal_lcd(&self) -> bool {
        matches!(self, SubpixelOrder::Rgb | SubpixelOrder::Bgr)
    }
}

/// LCD filter applied by the rasterizer for subpixel rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LcdFilterKind {
    None,
    Default,
    Light,
    Legacy,
}

/// One matched font: a file on disk plus resolved rendering attributes.
#[derive(Debug, Clone)]
pub struct FontDescriptor {
    /// Path of the font file the matcher resolved.
    pub path: PathBuf,
    /// Requested size.
    pub size: SizeSource,
    /// Whether glyphs are antialiased at all.
    pub antialias: bool,
    /// Whether hinting is enabled.
    pub hinting: bool,
    /// Hinting strength; only meaningful when `hinting` is set.
    pub hint_style: HintStyle,
    /// Subpixel layout of the display.
    pub subpixel: SubpixelOrder,
    /// LCD filter for subpixel rendering.
    pub lcd_filter: LcdFilterKind,
    /// Force the autohinter over the font's native hints.
    pub autohint: bool,
}

impl FontDescriptor {
    /// A descriptor with fontconfig's defaults for everything but the path
    /// and size: antialiased, fully hinted, unknown subpixel order,
    /// default LCD filter, no autohint.
    pub fn with_defaults(path: PathBuf, size: SizeSource) -> Self {
        Self {
            path,
            size,
            antialias: true,
            hinting: true,
            hint_style: HintStyle::Full,
            subpixel: SubpixelOrder::Unknown,
            lcd_filter: LcdFilterKind::Default,
            autohint: false,
        }
    }
}

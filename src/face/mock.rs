//! In-memory engine and face doubles for unit tests.
//!
//! Everything is scripted up front: which code points a face maps, which
//! strikes and metrics it reports, which glyphs fail, and what bitmap
//! each rasterization yields. No FFI, fully deterministic.

use crate::descriptor::{FontDescriptor, LcdFilterKind};
use crate::error::Error;
use crate::face::{
    FontEngine, FontFace, OutlineMetrics, PixelFormat, RasterizedGlyph, RenderPlan, Strike,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// A scripted font face.
#[derive(Debug, Clone)]
pub(crate) struct MockFace {
    family: String,
    style: String,
    chars: Vec<u32>,
    strikes: Vec<Strike>,
    metrics: Option<OutlineMetrics>,
    glyphs: HashMap<u32, RasterizedGlyph>,
    failing: HashSet<u32>,
    unsupported: HashSet<u32>,
}

impl MockFace {
    pub(crate) fn new(family: &str, style: &str) -> Self {
        Self {
            family: family.to_string(),
            style: style.to_string(),
            chars: Vec::new(),
            strikes: Vec::new(),
            metrics: None,
            glyphs: HashMap::new(),
            failing: HashSet::new(),
            unsupported: HashSet::new(),
        }
    }

    pub(crate) fn with_chars(mut self, chars: Vec<u32>) -> Self {
        self.chars = chars;
        self
    }

    pub(crate) fn with_strikes(mut self, strikes: Vec<Strike>) -> Self {
        self.strikes = strikes;
        self
    }

    pub(crate) fn with_metrics(mut self, metrics: OutlineMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Script a specific bitmap for one code point.
    pub(crate) fn with_glyph(mut self, charcode: u32, glyph: RasterizedGlyph) -> Self {
        self.glyphs.insert(charcode, glyph);
        self
    }

    /// Script a load failure for one code point.
    pub(crate) fn with_failing(mut self, charcode: u32) -> Self {
        self.failing.insert(charcode);
        self
    }

    /// Script an unsupported pixel encoding for one code point.
    pub(crate) fn with_unsupported(mut self, charcode: u32) -> Self {
        self.unsupported.insert(charcode);
        self
    }

    /// A plain full-coverage grayscale glyph.
    pub(crate) fn gray_glyph(width: usize, rows: usize, value: u8) -> RasterizedGlyph {
        RasterizedGlyph {
            format: PixelFormat::Gray,
            width,
            rows,
            pitch: width,
            data: vec![value; width * rows],
            bearing_x: 0,
            top: 0,
        }
    }
}

impl FontFace for MockFace {
    fn family_name(&self) -> Option<String> {
        Some(self.family.clone())
    }

    fn style_name(&self) -> Option<String> {
        Some(self.style.clone())
    }

    fn num_glyphs(&self) -> usize {
        self.chars.len()
    }

    fn charcodes(&self) -> Vec<u32> {
        self.chars.clone()
    }

    fn has_charcode(&self, charcode: u32) -> bool {
        self.chars.contains(&charcode)
    }

    fn strikes(&self) -> Vec<Strike> {
        self.strikes.clone()
    }

    fn outline_metrics(&self) -> Option<OutlineMetrics> {
        self.metrics
    }

    fn set_pixel_size(&mut self, _height: u32) -> Result<(), Error> {
        Ok(())
    }

    fn rasterize(&mut self, charcode: u32, _plan: &RenderPlan) -> Result<RasterizedGlyph, Error> {
        if self.unsupported.contains(&charcode) {
            return Err(Error::UnsupportedPixelFormat(7));
        }
        if self.failing.contains(&charcode) || !self.has_charcode(charcode) {
            return Err(Error::GlyphLoad(charcode, freetype::Error::InvalidGlyphIndex));
        }
        Ok(self
            .glyphs
            .get(&charcode)
            .cloned()
            .unwrap_or_else(|| Self::gray_glyph(1, 1, 0xFF)))
    }
}

/// A scripted engine: a map from font file path to the face it opens.
#[derive(Debug, Default)]
pub(crate) struct MockEngine {
    faces: HashMap<PathBuf, MockFace>,
    lcd_filters: RefCell<Vec<LcdFilterKind>>,
}

impl MockEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_face(mut self, path: &str, face: MockFace) -> Self {
        self.faces.insert(PathBuf::from(path), face);
        self
    }

    /// LCD filters applied so far, in order.
    pub(crate) fn applied_lcd_filters(&self) -> Vec<LcdFilterKind> {
        self.lcd_filters.borrow().clone()
    }
}

impl FontEngine for MockEngine {
    type Face = MockFace;

    fn open_face(&self, descriptor: &FontDescriptor) -> Result<MockFace, Error> {
        self.faces
            .get(&descriptor.path)
            .cloned()
            .ok_or_else(|| Error::FaceOpen {
                path: descriptor.path.clone(),
                source: freetype::Error::CannotOpenResource,
            })
    }

    fn set_lcd_filter(&self, filter: LcdFilterKind) {
        self.lcd_filters.borrow_mut().push(filter);
    }
}

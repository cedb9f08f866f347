//! FreeType-backed engine and face.
//!
//! Thin wrapper over `freetype-rs`, dropping to the raw FFI layer only
//! where the safe bindings stop (character-map enumeration and the fixed
//! bitmap strike table). All handles are RAII: the `Library` lives as
//! long as the engine, each `Face` as long as one font build, and both
//! are released on every exit path.

use crate::descriptor::{FontDescriptor, LcdFilterKind};
use crate::error::Error;
use crate::face::{
    FontEngine, FontFace, LoadTarget, OutlineMetrics, PixelFormat, RasterMode, RasterizedGlyph,
    RenderPlan, Strike,
};
use freetype::bitmap::PixelMode;
use freetype::face::{Face, LoadFlag};
use freetype::{ffi, LcdFilter, Library, RenderMode};
use log::trace;

/// The production rasterizer: one explicitly constructed FreeType
/// library instance, confined to the thread building fonts.
pub struct FreeTypeEngine {
    library: Library,
}

impl FreeTypeEngine {
    pub fn new() -> Result<Self, Error> {
        let library = Library::init().map_err(Error::EngineInit)?;
        Ok(Self { library })
    }
}

impl FontEngine for FreeTypeEngine {
    type Face = FreeTypeFace;

    fn open_face(&self, descriptor: &FontDescriptor) -> Result<FreeTypeFace, Error> {
        let face = self
            .library
            .new_face(&descriptor.path, 0)
            .map_err(|source| Error::FaceOpen {
                path: descriptor.path.clone(),
                source,
            })?;
        Ok(FreeTypeFace { face })
    }

    fn set_lcd_filter(&self, filter: LcdFilterKind) {
        let filter = match filter {
            LcdFilterKind::None => LcdFilter::LcdFilterNone,
            LcdFilterKind::Default => LcdFilter::LcdFilterDefault,
            LcdFilterKind::Light => LcdFilter::LcdFilterLight,
            LcdFilterKind::Legacy => LcdFilter::LcdFilterLegacy,
        };
        // LCD filtering may be compiled out of the FreeType build; glyphs
        // then render unfiltered, which is a degradation, not an error.
        if let Err(e) = self.library.set_lcd_filter(filter) {
            trace!("FreeType: LCD filter not applied: {}", e);
        }
    }
}

/// One opened FreeType face.
pub struct FreeTypeFace {
    face: Face,
}

impl FreeTypeFace {
    fn raw_face(&self) -> ffi::FT_Face {
        self.face.raw() as *const ffi::FT_FaceRec as ffi::FT_Face
    }
}

impl FontFace for FreeTypeFace {
    fn family_name(&self) -> Option<String> {
        self.face.family_name()
    }

    fn style_name(&self) -> Option<String> {
        self.face.style_name()
    }

    fn num_glyphs(&self) -> usize {
        self.face.raw().num_glyphs as usize
    }

    fn charcodes(&self) -> Vec<u32> {
        let mut codes = Vec::new();
        let face = self.raw_face();
        let mut gindex: ffi::FT_UInt = 0;
        // SAFETY: `face` is a live FT_Face owned by `self.face`;
        // FT_Get_First_Char/FT_Get_Next_Char only read the charmap.
        unsafe {
            let mut charcode = ffi::FT_Get_First_Char(face, &mut gindex);
            while gindex != 0 {
                codes.push(charcode as u32);
                charcode = ffi::FT_Get_Next_Char(face, charcode, &mut gindex);
            }
        }
        codes
    }

    fn has_charcode(&self, charcode: u32) -> bool {
        // SAFETY: read-only charmap lookup on a live face.
        unsafe { ffi::FT_Get_Char_Index(self.raw_face(), charcode as ffi::FT_ULong) != 0 }
    }

    fn strikes(&self) -> Vec<Strike> {
        let raw = self.face.raw();
        if raw.num_fixed_sizes <= 0 || raw.available_sizes.is_null() {
            return Vec::new();
        }
        // SAFETY: available_sizes points at num_fixed_sizes entries for
        // the lifetime of the face.
        let sizes = unsafe {
            std::slice::from_raw_parts(raw.available_sizes, raw.num_fixed_sizes as usize)
        };
        sizes
            .iter()
            .map(|s| Strike {
                width: s.width as usize,
                height: s.height as usize,
            })
            .collect()
    }

    fn outline_metrics(&self) -> Option<OutlineMetrics> {
        let raw = self.face.raw();
        if raw.units_per_EM == 0 {
            return None;
        }
        Some(OutlineMetrics {
            units_per_em: raw.units_per_EM as u32,
            ascender: raw.ascender as i32,
            height: raw.height as i32,
            max_advance_width: raw.max_advance_width as i32,
        })
    }

    fn set_pixel_size(&mut self, height: u32) -> Result<(), Error> {
        self.face.set_pixel_sizes(0, height).map_err(Error::PixelSize)
    }

    fn rasterize(&mut self, charcode: u32, plan: &RenderPlan) -> Result<RasterizedGlyph, Error> {
        self.face
            .load_char(charcode as usize, load_flags(plan))
            .map_err(|e| Error::GlyphLoad(charcode, e))?;

        let slot = self.face.glyph();
        if slot.raw().format != ffi::FT_GLYPH_FORMAT_BITMAP {
            slot.render_glyph(render_mode(plan.mode))
                .map_err(|e| Error::GlyphRender(charcode, e))?;
        }

        let bitmap = slot.bitmap();
        let format = match bitmap.pixel_mode() {
            Ok(PixelMode::Mono) => PixelFormat::Mono,
            Ok(PixelMode::Gray) => PixelFormat::Gray,
            Ok(PixelMode::Lcd) => PixelFormat::Lcd,
            Ok(other) => return Err(Error::UnsupportedPixelFormat(other as i32)),
            Err(e) => return Err(Error::GlyphRender(charcode, e)),
        };

        Ok(RasterizedGlyph {
            format,
            width: bitmap.width() as usize,
            rows: bitmap.rows() as usize,
            pitch: bitmap.pitch().unsigned_abs() as usize,
            data: bitmap.buffer().to_vec(),
            bearing_x: slot.bitmap_left(),
            top: slot.bitmap_top(),
        })
    }
}

fn load_flags(plan: &RenderPlan) -> LoadFlag {
    let mut flags = match plan.target {
        LoadTarget::Normal => LoadFlag::TARGET_NORMAL,
        LoadTarget::Light => LoadFlag::TARGET_LIGHT,
        LoadTarget::Mono => LoadFlag::TARGET_MONO,
    };
    if plan.force_autohint {
        flags |= LoadFlag::FORCE_AUTOHINT;
    }
    if plan.no_hinting {
        flags |= LoadFlag::NO_HINTING;
    }
    flags
}

fn render_mode(mode: RasterMode) -> RenderMode {
    match mode {
        RasterMode::Normal => RenderMode::Normal,
        RasterMode::Light => RenderMode::Light,
        RasterMode::Mono => RenderMode::Mono,
        RasterMode::Lcd => RenderMode::Lcd,
    }
}

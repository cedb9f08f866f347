//! Fontconfig-backed name resolution.
//!
//! Mirrors the classic fc-match flow: parse the configured name into a
//! pattern, layer style and DPI edits on top, run config and default
//! substitution, match, then read the resolved file path and rendering
//! attributes out of the matched pattern. All fontconfig objects are
//! owned by RAII guards so every early return releases them.

use crate::descriptor::{FontDescriptor, HintStyle, LcdFilterKind, SizeSource, SubpixelOrder};
use crate::error::Error;
use crate::matcher::{FontMatcher, MatchRequest, StyleFlags};
use fontconfig_sys::constants::{
    FC_ANTIALIAS, FC_AUTOHINT, FC_DPI, FC_FILE, FC_HINTING, FC_HINT_STYLE, FC_LCD_FILTER,
    FC_PIXEL_SIZE, FC_RGBA, FC_SIZE, FC_SLANT, FC_WEIGHT,
};
use fontconfig_sys::{
    FcBool, FcChar8, FcConfig, FcConfigDestroy, FcConfigSubstitute, FcDefaultSubstitute,
    FcFontMatch, FcInitLoadConfigAndFonts, FcMatchPattern, FcNameParse, FcPattern,
    FcPatternAddDouble, FcPatternAddInteger, FcPatternDel, FcPatternDestroy, FcPatternDuplicate,
    FcPatternGetBool, FcPatternGetDouble, FcPatternGetInteger, FcPatternGetString, FcResultMatch,
};
use log::trace;
use std::ffi::{c_int, CStr, CString};
use std::path::PathBuf;
use std::ptr;

// Property values from fontconfig.h; the sys bindings only export the
// property name strings.
const FC_SLANT_ITALIC: c_int = 100;
const FC_WEIGHT_BOLD: c_int = 200;
const FC_HINT_NONE: c_int = 0;
const FC_HINT_SLIGHT: c_int = 1;
const FC_HINT_MEDIUM: c_int = 2;
const FC_HINT_FULL: c_int = 3;
const FC_RGBA_UNKNOWN: c_int = 0;
const FC_RGBA_RGB: c_int = 1;
const FC_RGBA_BGR: c_int = 2;
const FC_RGBA_VRGB: c_int = 3;
const FC_RGBA_VBGR: c_int = 4;
const FC_RGBA_NONE: c_int = 5;
const FC_LCD_NONE: c_int = 0;
const FC_LCD_DEFAULT: c_int = 1;
const FC_LCD_LIGHT: c_int = 2;
const FC_LCD_LEGACY: c_int = 3;

struct OwnedConfig(*mut FcConfig);

impl Drop for OwnedConfig {
    fn drop(&mut self) {
        // SAFETY: the pointer came from FcInitLoadConfigAndFonts and is
        // destroyed exactly once.
        unsafe { FcConfigDestroy(self.0) };
    }
}

struct OwnedPattern(*mut FcPattern);

impl Drop for OwnedPattern {
    fn drop(&mut self) {
        // SAFETY: the pattern is owned by this guard and destroyed once.
        unsafe { FcPatternDestroy(self.0) };
    }
}

/// The production matcher: one loaded fontconfig configuration.
pub struct FcMatcher {
    config: OwnedConfig,
}

impl FcMatcher {
    pub fn new() -> Result<Self, Error> {
        // SAFETY: plain library initialization; a null return is the
        // documented failure mode.
        let config = unsafe { FcInitLoadConfigAndFonts() };
        if config.is_null() {
            return Err(Error::MatcherInit);
        }
        Ok(Self {
            config: OwnedConfig(config),
        })
    }

    /// Run substitution and matching over an edited pattern.
    fn match_pattern(&self, pattern: &OwnedPattern) -> Option<OwnedPattern> {
        // SAFETY: both patterns are live; the duplicate is destroyed on
        // every path and the match result is adopted by the caller.
        unsafe {
            let configured = FcPatternDuplicate(pattern.0);
            if configured.is_null() {
                return None;
            }
            let configured = OwnedPattern(configured);
            FcConfigSubstitute(self.config.0, configured.0, FcMatchPattern);
            FcDefaultSubstitute(configured.0);
            let mut result = FcResultMatch;
            let matched = FcFontMatch(self.config.0, configured.0, &mut result);
            if matched.is_null() {
                None
            } else {
                Some(OwnedPattern(matched))
            }
        }
    }

    /// Read the resolved file path and rendering attributes out of a
    /// matched pattern, defaulting each absent attribute the way
    /// fontconfig consumers conventionally do.
    fn extract(&self, matched: &OwnedPattern, family: &str) -> Result<FontDescriptor, Error> {
        let pat = matched.0;

        // SAFETY: all getters are read-only lookups on a live pattern;
        // the string buffer is owned by the pattern and copied before
        // the guard drops.
        unsafe {
            let mut buf: *mut FcChar8 = ptr::null_mut();
            if FcPatternGetString(pat, FC_FILE.as_ptr(), 0, &mut buf) != FcResultMatch
                || buf.is_null()
            {
                return Err(Error::MissingFilePath(family.to_string()));
            }
            let path = PathBuf::from(
                CStr::from_ptr(buf as *const _).to_string_lossy().into_owned(),
            );

            let mut pt = 0f64;
            let size = if FcPatternGetDouble(pat, FC_SIZE.as_ptr(), 0, &mut pt) == FcResultMatch {
                let mut dpi = 75f64;
                FcPatternGetDouble(pat, FC_DPI.as_ptr(), 0, &mut dpi);
                trace!("Font size {} @ {} DPI", pt, dpi);
                SizeSource::Points { pt, dpi }
            } else {
                let mut px: c_int = 16;
                FcPatternGetInteger(pat, FC_PIXEL_SIZE.as_ptr(), 0, &mut px);
                SizeSource::Pixels(px.max(1) as u32)
            };

            let mut antialias: FcBool = 1;
            FcPatternGetBool(pat, FC_ANTIALIAS.as_ptr(), 0, &mut antialias);
            let mut hinting: FcBool = 1;
            FcPatternGetBool(pat, FC_HINTING.as_ptr(), 0, &mut hinting);
            let mut autohint: FcBool = 0;
            FcPatternGetBool(pat, FC_AUTOHINT.as_ptr(), 0, &mut autohint);

            let mut hint_style = FC_HINT_FULL;
            FcPatternGetInteger(pat, FC_HINT_STYLE.as_ptr(), 0, &mut hint_style);
            let mut rgba = FC_RGBA_UNKNOWN;
            FcPatternGetInteger(pat, FC_RGBA.as_ptr(), 0, &mut rgba);
            let mut lcd_filter = FC_LCD_DEFAULT;
            FcPatternGetInteger(pat, FC_LCD_FILTER.as_ptr(), 0, &mut lcd_filter);

            Ok(FontDescriptor {
                path,
                size,
                antialias: antialias != 0,
                hinting: hinting != 0,
                hint_style: match hint_style {
                    FC_HINT_NONE => HintStyle::None,
                    FC_HINT_SLIGHT => HintStyle::Slight,
                    FC_HINT_MEDIUM => HintStyle::Medium,
                    _ => HintStyle::Full,
                },
                subpixel: match rgba {
                    FC_RGBA_RGB => SubpixelOrder::Rgb,
                    FC_RGBA_BGR => SubpixelOrder::Bgr,
                    FC_RGBA_VRGB => SubpixelOrder::Vrgb,
                    FC_RGBA_VBGR => SubpixelOrder::Vbgr,
                    FC_RGBA_NONE => SubpixelOrder::None,
                    _ => SubpixelOrder::Unknown,
                },
                lcd_filter: match lcd_filter {
                    FC_LCD_NONE => LcdFilterKind::None,
                    FC_LCD_LIGHT => LcdFilterKind::Light,
                    FC_LCD_LEGACY => LcdFilterKind::Legacy,
                    _ => LcdFilterKind::Default,
                },
                autohint: autohint != 0,
            })
        }
    }
}

impl FontMatcher for FcMatcher {
    fn resolve(&self, request: &MatchRequest) -> Result<FontDescriptor, Error> {
        let name = CString::new(request.family.as_str())
            .map_err(|_| Error::NameUnparsable(request.family.clone()))?;

        // SAFETY: the name is a valid NUL-terminated string; the parsed
        // pattern is adopted by an RAII guard.
        let pattern = unsafe { FcNameParse(name.as_ptr() as *const FcChar8) };
        if pattern.is_null() {
            return Err(Error::NameUnparsable(request.family.clone()));
        }
        let pattern = OwnedPattern(pattern);

        // SAFETY: the pattern is live; Del/Add replace one property each.
        unsafe {
            if let Some(dpi) = request.dpi {
                FcPatternDel(pattern.0, FC_DPI.as_ptr());
                FcPatternAddDouble(pattern.0, FC_DPI.as_ptr(), dpi);
            }
            if request.style.contains(StyleFlags::ITALIC) {
                FcPatternDel(pattern.0, FC_SLANT.as_ptr());
                FcPatternAddInteger(pattern.0, FC_SLANT.as_ptr(), FC_SLANT_ITALIC);
            }
            if request.style.contains(StyleFlags::BOLD) {
                FcPatternDel(pattern.0, FC_WEIGHT.as_ptr());
                FcPatternAddInteger(pattern.0, FC_WEIGHT.as_ptr(), FC_WEIGHT_BOLD);
            }
        }

        let matched = self
            .match_pattern(&pattern)
            .ok_or_else(|| Error::NameUnresolved(request.family.clone()))?;
        self.extract(&matched, &request.family)
    }
}

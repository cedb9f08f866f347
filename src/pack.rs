//! The font pack: one resolved family rendered as a set of atlases.
//!
//! A [`Fontpack`] is what a renderer consumes: the regular font plus
//! whatever style variants and double-width companion could be resolved
//! and built. Only the regular font is mandatory; every variant degrades
//! to "not available" with a warning, and the renderer then reuses the
//! regular atlas for that style.

use crate::config::FontConfig;
use crate::error::Error;
use crate::face::FontEngine;
use crate::font::Font;
use crate::matcher::{FontMatcher, MatchRequest, StyleFlags};
use log::{trace, warn};

/// Style slot of a font pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Regular,
    Bold,
    Italic,
    BoldItalic,
    DoubleWidth,
}

/// One family's worth of atlas builds.
#[derive(Debug)]
pub struct Fontpack {
    regular: Font,
    bold: Option<Font>,
    italic: Option<Font>,
    bold_italic: Option<Font>,
    double_width: Option<Font>,
}

impl Fontpack {
    /// Resolve and build all fonts of a pack.
    ///
    /// The regular font must resolve and build; any failure there is the
    /// caller's problem. Style variants and the double-width font are
    /// attempted and logged away on failure.
    pub fn build<E, M>(engine: &E, matcher: &M, config: &FontConfig) -> Result<Self, Error>
    where
        E: FontEngine,
        M: FontMatcher,
    {
        trace!(
            "Fontpack: fontname={:?}, dwfontname={:?}",
            config.font_name,
            config.dwfont_name
        );
        let dpi = config.dpi_override();

        let descriptor =
            matcher.resolve(&MatchRequest::new(&config.font_name).with_dpi(dpi))?;
        let regular = Font::regular(engine, &descriptor)?;

        let italic = Self::build_overlay(
            engine,
            matcher,
            config,
            dpi,
            StyleFlags::ITALIC,
            &regular,
            "italic",
        );
        let bold_italic = Self::build_overlay(
            engine,
            matcher,
            config,
            dpi,
            StyleFlags::BOLD | StyleFlags::ITALIC,
            &regular,
            "bold italic",
        );
        let bold = Self::build_overlay(
            engine,
            matcher,
            config,
            dpi,
            StyleFlags::BOLD,
            &regular,
            "bold",
        );

        let double_width = config.dwfont_name.as_ref().and_then(|name| {
            // The double-width name is matched as written, without the
            // DPI override; its cell is pinned to the regular font's.
            let request = MatchRequest::new(name);
            match matcher
                .resolve(&request)
                .and_then(|desc| Font::double_width(engine, &desc, &regular))
            {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!("Failed to load double-width font '{}': {}", name, e);
                    None
                }
            }
        });

        Ok(Self {
            regular,
            bold,
            italic,
            bold_italic,
            double_width,
        })
    }

    fn build_overlay<E, M>(
        engine: &E,
        matcher: &M,
        config: &FontConfig,
        dpi: Option<f64>,
        style: StyleFlags,
        regular: &Font,
        label: &str,
    ) -> Option<Font>
    where
        E: FontEngine,
        M: FontMatcher,
    {
        let request = MatchRequest::new(&config.font_name)
            .with_style(style)
            .with_dpi(dpi);
        match matcher
            .resolve(&request)
            .and_then(|desc| Font::overlay(engine, &desc, regular))
        {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(
                    "Failed to load {} variant of '{}': {}",
                    label, config.font_name, e
                );
                None
            }
        }
    }

    /// Cell width of the pack, in pixels.
    pub fn px(&self) -> usize {
        self.regular.px()
    }

    /// Cell height of the pack, in pixels.
    pub fn py(&self) -> usize {
        self.regular.py()
    }

    /// The mandatory regular font.
    pub fn regular(&self) -> &Font {
        &self.regular
    }

    pub fn bold(&self) -> Option<&Font> {
        self.bold.as_ref()
    }

    pub fn italic(&self) -> Option<&Font> {
        self.italic.as_ref()
    }

    pub fn bold_italic(&self) -> Option<&Font> {
        self.bold_italic.as_ref()
    }

    pub fn double_width(&self) -> Option<&Font> {
        self.double_width.as_ref()
    }

    /// The font built for a style slot, if it resolved.
    pub fn get(&self, style: Style) -> Option<&Font> {
        match style {
            Style::Regular => Some(&self.regular),
            Style::Bold => self.bold.as_ref(),
            Style::Italic => self.italic.as_ref(),
            Style::BoldItalic => self.bold_italic.as_ref(),
            Style::DoubleWidth => self.double_width.as_ref(),
        }
    }
}

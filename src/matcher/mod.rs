//! Font name resolution.
//!
//! A [`FontMatcher`] turns a configured family name plus style toggles
//! into a [`FontDescriptor`]: a concrete font file with resolved
//! rendering attributes. The production implementation queries
//! fontconfig; tests substitute a table-driven matcher.

pub mod fontconfig;

pub use fontconfig::FcMatcher;

use crate::descriptor::FontDescriptor;
use crate::error::Error;
use bitflags::bitflags;

bitflags! {
    /// Style toggles applied on top of a family name during matching.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StyleFlags: u8 {
        const BOLD = 1 << 0;
        const ITALIC = 1 << 1;
    }
}

/// One font resolution request.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    /// Family name or full fontconfig-style pattern, e.g. `monospace`
    /// or `DejaVu Sans Mono:size=11`.
    pub family: String,
    /// Style toggles layered over the name.
    pub style: StyleFlags,
    /// DPI override forced into the pattern before matching, if any.
    pub dpi: Option<f64>,
}

impl MatchRequest {
    pub fn new(family: &str) -> Self {
        Self {
            family: family.to_string(),
            style: StyleFlags::empty(),
            dpi: None,
        }
    }

    pub fn with_style(mut self, style: StyleFlags) -> Self {
        self.style = style;
        self
    }

    pub fn with_dpi(mut self, dpi: Option<f64>) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Resolves font names to font files.
pub trait FontMatcher {
    fn resolve(&self, request: &MatchRequest) -> Result<FontDescriptor, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_flags_combine() {
        let style = StyleFlags::BOLD | StyleFlags::ITALIC;
        assert!(style.contains(StyleFlags::BOLD));
        assert!(style.contains(StyleFlags::ITALIC));
        assert!(!StyleFlags::BOLD.contains(StyleFlags::ITALIC));
    }

    #[test]
    fn request_builder_composes() {
        let req = MatchRequest::new("monospace")
            .with_style(StyleFlags::ITALIC)
            .with_dpi(Some(144.0));
        assert_eq!(req.family, "monospace");
        assert_eq!(req.style, StyleFlags::ITALIC);
        assert_eq!(req.dpi, Some(144.0));
    }
}

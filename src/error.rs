//! Fatal build failures.
//!
//! Every condition that aborts a [`Font`](crate::font::Font) or
//! [`Fontpack`](crate::pack::Fontpack) build is a variant here, so callers
//! can tell geometry overflow apart from a missing font file. Non-fatal
//! degradations (a glyph that fails to render, a style variant that does
//! not resolve) are logged and never surface as an `Error`.

use std::path::PathBuf;
use thiserror::Error;

/// A fatal failure while constructing a font or font pack.
#[derive(Debug, Error)]
pub enum Error {
    /// The rasterizer engine could not be initialized.
    #[error("could not initialize FreeType library: {0}")]
    EngineInit(#[source] freetype::Error),

    /// A font file could not be opened as a face.
    #[error("failed to load font {path}: {source}")]
    FaceOpen {
        path: PathBuf,
        #[source]
        source: freetype::Error,
    },

    /// Configuring the face's pixel size failed.
    #[error("could not set pixel sizes: {0}")]
    PixelSize(#[source] freetype::Error),

    /// The atlas grid converged beyond single-byte cell addressing.
    #[error("impossible atlas geometry: {nx}x{ny} exceeds 255x255")]
    ImpossibleAtlasGeometry { nx: usize, ny: usize },

    /// An overlay or double-width face does not match the primary cell size.
    #[error(
        "{style} font size mismatch, expected {expected_px}x{expected_py}, got {got_px}x{got_py}"
    )]
    DimensionMismatch {
        style: &'static str,
        expected_px: usize,
        expected_py: usize,
        got_px: usize,
        got_py: usize,
    },

    /// The engine produced a bitmap in an encoding the blitter cannot decode.
    #[error("unhandled pixel_mode={0}")]
    UnsupportedPixelFormat(i32),

    /// A glyph failed to load from the face. Treated as skip-and-continue
    /// by atlas builds; the cell is left blank.
    #[error("failed to load glyph for char {0}: {1}")]
    GlyphLoad(u32, #[source] freetype::Error),

    /// A loaded glyph failed to rasterize. Treated as skip-and-continue by
    /// atlas builds.
    #[error("failed to render glyph for char {0}: {1}")]
    GlyphRender(u32, #[source] freetype::Error),

    /// The face exposes neither fixed bitmap strikes nor scalable
    /// outlines, so no pixel size can be chosen.
    #[error("face has neither fixed strikes nor scalable outlines")]
    UnscalableFace,

    /// The font matcher could not be initialized.
    #[error("cannot initialize fontconfig library")]
    MatcherInit,

    /// A configured font name did not parse as a match request.
    #[error("cannot parse font reference '{0}'")]
    NameUnparsable(String),

    /// No installed font matched the request.
    #[error("cannot locate font file for '{0}'")]
    NameUnresolved(String),

    /// The matcher produced a pattern without a resolvable file path.
    #[error("matched pattern for '{0}' carries no file path")]
    MissingFilePath(String),
}

impl Error {
    /// Whether an atlas build treats this rasterization outcome as a
    /// skip-and-continue condition rather than an abort.
    pub fn is_glyph_failure(&self) -> bool {
        matches!(self, Error::GlyphLoad(..) | Error::GlyphRender(..))
    }
}

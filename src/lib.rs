//! Glyph-atlas construction for a GPU-rendered terminal emulator.
//!
//! Given a matched font description, this crate rasterizes the subset of
//! code points a monospace terminal needs and packs them into one shared
//! RGBA8 bitmap texture that a renderer later samples per cell:
//!
//! ```text
//! family names   ->  [FontMatcher]          ->  FontDescriptor
//! FontDescriptor ->  [FontEngine/FontFace]  ->  rasterized glyph bitmaps
//! bitmaps        ->  [Fontpack/Font/blit]   ->  AtlasBuffer + AtlasMap
//! ```
//!
//! A [`Fontpack`] assembles up to five style variants of one logical font
//! family: the mandatory Regular font plus optional Italic, Bold,
//! BoldItalic (overlays sharing Regular's cell geometry and glyph
//! placement) and an optional DoubleWidth font for wide characters. All
//! construction is synchronous and eager; every built type is immutable
//! afterwards and safe to share across renderer threads.
//!
//! Font discovery policy, texture upload, shaping/ligatures and color
//! emoji are out of scope: matching is reached through the [`FontMatcher`]
//! seam (with a fontconfig-backed production implementation) and the
//! finished atlas is handed to the rendering layer as plain bytes.

pub mod atlas;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod face;
pub mod font;
pub mod matcher;
pub mod pack;
pub mod source;

pub use atlas::{AtlasBuffer, AtlasGeometry, AtlasMap, AtlasPosition};
pub use config::FontConfig;
pub use descriptor::{FontDescriptor, HintStyle, LcdFilterKind, SizeSource, SubpixelOrder};
pub use error::Error;
pub use face::{FontEngine, FontFace};
pub use font::Font;
pub use matcher::{FontMatcher, MatchRequest, StyleFlags};
pub use pack::{Fontpack, Style};

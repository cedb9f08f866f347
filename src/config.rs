//! Font configuration handed in by the embedding application.
//!
//! This is the crate's slice of the terminal's configuration file: which
//! font family to build the pack from, an optional second family for wide
//! (double-width) characters, and an optional DPI override applied to the
//! regular match request.

use serde::{Deserialize, Serialize};

/// Font selection settings for one [`Fontpack`](crate::pack::Fontpack) build.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Family name (fontconfig pattern syntax) of the regular font.
    pub font_name: String,
    /// Family name of the double-width font; `None` disables the
    /// double-width variant entirely.
    pub dwfont_name: Option<String>,
    /// DPI override for size resolution. `None` or a non-positive value
    /// leaves the matcher's DPI untouched.
    pub dpi: Option<f64>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_name: default_font_name(),
            dwfont_name: None,
            dpi: None,
        }
    }
}

fn default_font_name() -> String {
    "monospace".to_string()
}

impl FontConfig {
    /// The DPI override, if one is set and positive.
    pub fn dpi_override(&self) -> Option<f64> {
        self.dpi.filter(|d| *d > 0.0)
    }
}

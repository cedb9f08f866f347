//! One font build: a sized face rendered into one atlas texture.
//!
//! A [`Font`] owns the finished atlas buffer plus the cell metrics a
//! renderer needs to consume it. Regular and DoubleWidth builds establish
//! their own code-point-to-cell map in the face's native enumeration
//! order; an Overlay build adopts the map of the Regular font it styles
//! and only repaints pixels, so a renderer can swap styles per cell
//! without re-resolving coordinates.

use crate::atlas::blit::blit_glyph;
use crate::atlas::{AtlasBuffer, AtlasGeometry, AtlasMap, AtlasPosition};
use crate::descriptor::FontDescriptor;
use crate::error::Error;
use crate::face::FontEngine;
use crate::source::{GlyphSource, SizeConstraint, BMP_MAX};
use log::{info, trace, warn};
use std::sync::Arc;

/// A finished atlas build.
#[derive(Debug)]
pub struct Font {
    px: usize,
    py: usize,
    baseline: usize,
    geometry: AtlasGeometry,
    atlas: AtlasBuffer,
    map: Arc<AtlasMap>,
}

impl Font {
    /// Build the primary font of a pack. Establishes the cell size, the
    /// baseline and the code-point-to-cell map every overlay will share.
    pub fn regular<E: FontEngine>(engine: &E, descriptor: &FontDescriptor) -> Result<Self, Error> {
        Self::build_mapped(engine, descriptor, SizeConstraint::Primary, false, "primary")
    }

    /// Build a style variant (italic, bold, bold italic) over the primary
    /// font's cell grid. The face must reproduce the primary cell size
    /// exactly; its glyphs are painted at the primary's map positions.
    pub fn overlay<E: FontEngine>(
        engine: &E,
        descriptor: &FontDescriptor,
        primary: &Font,
    ) -> Result<Self, Error> {
        info!("Loading overlay font from {}", descriptor.path.display());
        let face = engine.open_face(descriptor)?;
        let mut source = GlyphSource::new(face, descriptor, false);
        trace!(
            "Family: {:?}, style: {:?}",
            source.family_name(),
            source.style_name()
        );

        source.select_size(
            descriptor.size.pixel_size(),
            SizeConstraint::Overlay {
                px: primary.px,
                py: primary.py,
            },
        )?;
        engine.set_lcd_filter(descriptor.lcd_filter);

        let map = Arc::clone(&primary.map);
        let mut atlas = AtlasBuffer::new(primary.geometry, primary.px, primary.py);
        let mut skipped = 0usize;
        for (charcode, pos) in map.iter() {
            // Cells the overlay face has no glyph for stay blank; the
            // renderer falls back to the regular font there.
            if !source.has_charcode(charcode) {
                continue;
            }
            if charcode > BMP_MAX {
                skipped += 1;
                continue;
            }
            match source.rasterize(charcode) {
                Ok(glyph) => blit_glyph(&mut atlas, pos, &glyph, primary.baseline, true),
                Err(e) if e.is_glyph_failure() => {
                    warn!("{}; leaving cell blank", e);
                }
                Err(e) => return Err(e),
            }
        }
        if skipped > 0 {
            info!("Skipped {} code points above U+FFFF", skipped);
        }

        Ok(Self {
            px: primary.px,
            py: primary.py,
            baseline: primary.baseline,
            geometry: primary.geometry,
            atlas,
            map,
        })
    }

    /// Build the double-width font of a pack: its own map over the wide
    /// code points, in a cell twice the primary's width.
    pub fn double_width<E: FontEngine>(
        engine: &E,
        descriptor: &FontDescriptor,
        primary: &Font,
    ) -> Result<Self, Error> {
        Self::build_mapped(
            engine,
            descriptor,
            SizeConstraint::DoubleWidth {
                px: 2 * primary.px,
                py: primary.py,
            },
            true,
            "double-width",
        )
    }

    /// Shared Regular/DoubleWidth path: size the face, plan a fresh grid,
    /// assign cells in enumeration order starting at 1, rasterize and blit.
    fn build_mapped<E: FontEngine>(
        engine: &E,
        descriptor: &FontDescriptor,
        constraint: SizeConstraint,
        dwidth: bool,
        kind: &str,
    ) -> Result<Self, Error> {
        info!("Loading {} font from {}", kind, descriptor.path.display());
        let face = engine.open_face(descriptor)?;
        let mut source = GlyphSource::new(face, descriptor, dwidth);
        trace!(
            "Family: {:?}, style: {:?}, {} glyphs in face",
            source.family_name(),
            source.style_name(),
            source.num_glyphs()
        );

        let charcodes = source.loadable_charcodes();
        trace!("{} loadable code points", charcodes.len());

        let cell = source.select_size(descriptor.size.pixel_size(), constraint)?;
        engine.set_lcd_filter(descriptor.lcd_filter);
        let (px, py) = (cell.px, cell.py);
        let baseline = cell.baseline.unwrap_or(0);

        // One extra cell: (0,0) stays blank as the missing-glyph fallback.
        let geometry = AtlasGeometry::plan(charcodes.len() + 1, px, py)?;
        let mut atlas = AtlasBuffer::new(geometry, px, py);
        let mut map = AtlasMap::new();

        let mut seq = 1usize;
        let mut skipped = 0usize;
        for charcode in charcodes {
            let pos = geometry.position(seq);
            map.insert(charcode, pos);
            seq += 1;

            if charcode > BMP_MAX {
                skipped += 1;
                continue;
            }
            match source.rasterize(charcode) {
                Ok(glyph) => blit_glyph(&mut atlas, pos, &glyph, baseline, false),
                Err(e) if e.is_glyph_failure() => {
                    warn!("{}; leaving cell blank", e);
                }
                Err(e) => return Err(e),
            }
        }
        if skipped > 0 {
            info!("Skipped {} code points above U+FFFF", skipped);
        }

        Ok(Self {
            px,
            py,
            baseline,
            geometry,
            atlas,
            map: Arc::new(map),
        })
    }

    /// Cell width in pixels.
    pub fn px(&self) -> usize {
        self.px
    }

    /// Cell height in pixels.
    pub fn py(&self) -> usize {
        self.py
    }

    /// Baseline row within a cell, measured from the cell top.
    pub fn baseline(&self) -> usize {
        self.baseline
    }

    /// Atlas grid columns.
    pub fn nx(&self) -> usize {
        self.geometry.nx
    }

    /// Atlas grid rows.
    pub fn ny(&self) -> usize {
        self.geometry.ny
    }

    /// The finished atlas texture.
    pub fn atlas(&self) -> &AtlasBuffer {
        &self.atlas
    }

    /// Code-point-to-cell assignments. For an overlay font this is the
    /// same map as the regular font it was built over.
    pub fn atlas_map(&self) -> &Arc<AtlasMap> {
        &self.map
    }

    /// Atlas cell of a code point, if this font's build recorded one.
    pub fn position(&self, charcode: u32) -> Option<AtlasPosition> {
        self.map.get(charcode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FontDescriptor, SizeSource};
    use crate::face::mock::{MockEngine, MockFace};
    use crate::face::OutlineMetrics;
    use std::path::PathBuf;
    use test_log::test; // For logging within tests

    const BPP: usize = 4;

    fn descriptor(path: &str) -> FontDescriptor {
        FontDescriptor::with_defaults(PathBuf::from(path), SizeSource::Pixels(16))
    }

    fn scalable(family: &str, style: &str) -> MockFace {
        // tpx = 16 * 600 / 1000 = 9; tpy = 9 * 1200 / 600 + 1 = 19;
        // baseline = 19 * 800 / 1200 = 12.
        MockFace::new(family, style).with_metrics(OutlineMetrics {
            units_per_em: 1000,
            ascender: 800,
            height: 1200,
            max_advance_width: 600,
        })
    }

    fn cell_is_blank(font: &Font, pos: AtlasPosition) -> bool {
        font.atlas().cell_pixels(pos).iter().all(|&b| b == 0)
    }

    #[test]
    fn regular_build_maps_in_enumeration_order() {
        let face =
            scalable("Mock Mono", "Regular").with_chars(vec!['z' as u32, 'a' as u32, 'm' as u32]);
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let font = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();

        assert_eq!((font.px(), font.py()), (9, 19));
        assert_eq!(font.baseline(), 12);
        assert_eq!(font.atlas_map().len(), 3);
        // 4 cells needed (3 glyphs + reserved blank): planner yields 3x2.
        assert_eq!((font.nx(), font.ny()), (3, 2));
        // Enumeration order, not code point order, starting at cell 1.
        assert_eq!(font.position('z' as u32), Some(AtlasPosition { col: 1, row: 0 }));
        assert_eq!(font.position('a' as u32), Some(AtlasPosition { col: 2, row: 0 }));
        assert_eq!(font.position('m' as u32), Some(AtlasPosition { col: 0, row: 1 }));
        assert_eq!(font.position('q' as u32), None);
    }

    #[test]
    fn reserved_cell_stays_blank_and_glyph_cells_do_not() {
        let face = scalable("Mock Mono", "Regular").with_chars(vec!['a' as u32]);
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let font = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();

        assert!(cell_is_blank(&font, AtlasPosition { col: 0, row: 0 }));
        let pos = font.position('a' as u32).unwrap();
        assert!(!cell_is_blank(&font, pos));
    }

    #[test]
    fn atlas_dimensions_match_grid_times_cell() {
        let face = scalable("Mock Mono", "Regular")
            .with_chars(('a' as u32..='z' as u32).collect());
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let font = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();

        assert!(font.nx() * font.ny() >= 27);
        assert_eq!(font.atlas().width(), font.nx() * font.px());
        assert_eq!(font.atlas().height(), font.ny() * font.py());
        assert_eq!(
            font.atlas().data().len(),
            BPP * font.atlas().width() * font.atlas().height()
        );
    }

    #[test]
    fn glyph_pixels_land_at_the_mapped_cell() {
        let mut glyph = MockFace::gray_glyph(2, 2, 0xCC);
        glyph.top = 12; // flush against the baseline: dy = 0
        let face = scalable("Mock Mono", "Regular")
            .with_chars(vec!['a' as u32, 'b' as u32])
            .with_glyph('b' as u32, glyph);
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let font = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();

        let cell = font.atlas().cell_pixels(font.position('b' as u32).unwrap());
        // Top-left pixel of the cell carries the scripted coverage.
        assert_eq!(&cell[0..3], &[0xCC, 0xCC, 0xCC]);
    }

    #[test]
    fn code_points_above_bmp_get_cells_but_no_pixels() {
        let face = scalable("Mock Mono", "Regular").with_chars(vec!['a' as u32, 0x1F600]);
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let font = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();

        let pos = font.position(0x1F600).unwrap();
        assert!(cell_is_blank(&font, pos));
        assert!(!cell_is_blank(&font, font.position('a' as u32).unwrap()));
    }

    #[test]
    fn glyph_failure_leaves_cell_blank_and_build_succeeds() {
        let face = scalable("Mock Mono", "Regular")
            .with_chars(vec!['a' as u32, 'b' as u32])
            .with_failing('b' as u32);
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let font = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();

        // The failed glyph keeps its map entry; only the pixels are missing.
        let pos = font.position('b' as u32).unwrap();
        assert!(cell_is_blank(&font, pos));
    }

    #[test]
    fn unsupported_pixel_format_aborts_the_build() {
        let face = scalable("Mock Mono", "Regular")
            .with_chars(vec!['a' as u32])
            .with_unsupported('a' as u32);
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let err = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedPixelFormat(_)));
    }

    #[test]
    fn missing_font_file_aborts_the_build() {
        let engine = MockEngine::new();
        let err = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap_err();
        assert!(matches!(err, Error::FaceOpen { .. }));
    }

    #[test]
    fn overlay_shares_map_and_metrics_with_primary() {
        let regular =
            scalable("Mock Mono", "Regular").with_chars(vec!['a' as u32, 'b' as u32]);
        let italic = scalable("Mock Mono", "Italic").with_chars(vec!['a' as u32]);
        let engine = MockEngine::new()
            .with_face("/fake/mono.ttf", regular)
            .with_face("/fake/mono-italic.ttf", italic);

        let primary = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();
        let overlay =
            Font::overlay(&engine, &descriptor("/fake/mono-italic.ttf"), &primary).unwrap();

        assert!(Arc::ptr_eq(primary.atlas_map(), overlay.atlas_map()));
        assert_eq!((overlay.px(), overlay.py()), (primary.px(), primary.py()));
        assert_eq!(overlay.baseline(), primary.baseline());
        assert_eq!((overlay.nx(), overlay.ny()), (primary.nx(), primary.ny()));

        // Same coordinates, overlay's own pixels.
        let pos_a = primary.position('a' as u32).unwrap();
        assert_eq!(overlay.position('a' as u32), Some(pos_a));
        assert!(!cell_is_blank(&overlay, pos_a));

        // 'b' exists in the primary only: the overlay cell stays blank.
        let pos_b = primary.position('b' as u32).unwrap();
        assert!(!cell_is_blank(&primary, pos_b));
        assert!(cell_is_blank(&overlay, pos_b));
    }

    #[test]
    fn overlay_with_wrong_cell_size_is_rejected() {
        let regular = scalable("Mock Mono", "Regular").with_chars(vec!['a' as u32]);
        // Wider advance yields an 11x23 cell instead of 9x19.
        let bold = MockFace::new("Mock Mono", "Bold")
            .with_metrics(OutlineMetrics {
                units_per_em: 1000,
                ascender: 800,
                height: 1200,
                max_advance_width: 700,
            })
            .with_chars(vec!['a' as u32]);
        let engine = MockEngine::new()
            .with_face("/fake/mono.ttf", regular)
            .with_face("/fake/mono-bold.ttf", bold);

        let primary = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();
        let err = Font::overlay(&engine, &descriptor("/fake/mono-bold.ttf"), &primary).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn double_width_cell_is_twice_the_primary_width() {
        let regular = scalable("Mock Mono", "Regular").with_chars(vec!['a' as u32]);
        let wide = scalable("Mock CJK", "Regular").with_chars(vec!['あ' as u32, 'a' as u32]);
        let engine = MockEngine::new()
            .with_face("/fake/mono.ttf", regular)
            .with_face("/fake/cjk.ttf", wide);

        let primary = Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap();
        let dw = Font::double_width(&engine, &descriptor("/fake/cjk.ttf"), &primary).unwrap();

        assert_eq!(dw.px(), 2 * primary.px());
        assert_eq!(dw.py(), primary.py());
        // Only the wide code point loads; narrow 'a' is filtered out.
        assert!(dw.position('あ' as u32).is_some());
        assert!(dw.position('a' as u32).is_none());
        // Its map is independent of the primary's.
        assert!(!Arc::ptr_eq(primary.atlas_map(), dw.atlas_map()));
    }

    #[test]
    fn lcd_filter_is_applied_once_per_build() {
        let face = scalable("Mock Mono", "Regular").with_chars(vec!['a' as u32]);
        let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
        let desc = descriptor("/fake/mono.ttf");
        Font::regular(&engine, &desc).unwrap();
        assert_eq!(engine.applied_lcd_filters(), vec![desc.lcd_filter]);
    }

    #[test]
    fn builds_are_deterministic() {
        let chars: Vec<u32> = ('!' as u32..='~' as u32).collect();
        let build = || {
            let face = scalable("Mock Mono", "Regular").with_chars(chars.clone());
            let engine = MockEngine::new().with_face("/fake/mono.ttf", face);
            Font::regular(&engine, &descriptor("/fake/mono.ttf")).unwrap()
        };
        let a = build();
        let b = build();
        assert_eq!(a.atlas().data(), b.atlas().data());
        for &c in &chars {
            assert_eq!(a.position(c), b.position(c));
        }
    }
}

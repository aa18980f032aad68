//! Font loading and glyph rasterization
//!
//! One font, one size, one glyph per cell. Uses fontdue for simple, fast
//! rasterization; no shaping and no fallback fonts.

use std::collections::HashMap;
use std::path::Path;

use fontdue::{Font, FontSettings};
use log::info;

use crate::error::{Error, Result};

/// Monospace fonts tried when no font path is configured
const SYSTEM_FONTS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "/System/Library/Fonts/Menlo.ttc",
];

/// A rasterized glyph, positioned relative to the cell origin
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Coverage, one byte per pixel, row-major
    pub bitmap: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// Horizontal offset from the cell's left edge
    pub xmin: i32,
    /// Offset of the bitmap's bottom edge from the baseline
    pub ymin: i32,
}

/// Font renderer that handles glyph rasterization and caching
pub struct FontRenderer {
    font: Font,
    font_size: f32,
    glyph_cache: HashMap<char, Glyph>,
    cell_width: u32,
    cell_height: u32,
    /// Baseline offset from the top of a cell
    baseline: i32,
}

impl FontRenderer {
    /// Load the configured font, or the first usable system font
    pub fn load(path: Option<&Path>, font_size: f32) -> Result<Self> {
        match path {
            Some(path) => Self::new(path, font_size),
            None => Self::with_default_font(font_size),
        }
    }

    /// Create a new font renderer with the given font file and size
    pub fn new(font_path: &Path, font_size: f32) -> Result<Self> {
        let font_data = std::fs::read(font_path)
            .map_err(|e| Error::Font(format!("{}: {}", font_path.display(), e)))?;

        Self::from_bytes(&font_data, font_size)
    }

    /// Create a font renderer from font data bytes
    pub fn from_bytes(font_data: &[u8], font_size: f32) -> Result<Self> {
        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| Error::Font(e.to_string()))?;

        // 'M' is the widest ASCII glyph in most monospace faces.
        let cell_width = font.metrics('M', font_size).advance_width.ceil();

        let line_metrics = font
            .horizontal_line_metrics(font_size)
            .ok_or_else(|| Error::Font("font has no horizontal line metrics".to_string()))?;

        let cell_height = line_metrics.new_line_size.ceil();
        let baseline = line_metrics.ascent.ceil();

        Ok(Self {
            font,
            font_size,
            glyph_cache: HashMap::new(),
            cell_width: (cell_width as u32).max(1),
            cell_height: (cell_height as u32).max(1),
            baseline: baseline as i32,
        })
    }

    /// Create a font renderer from the first system font that loads
    pub fn with_default_font(font_size: f32) -> Result<Self> {
        for path in &SYSTEM_FONTS {
            if let Ok(renderer) = Self::new(Path::new(path), font_size) {
                info!("Loaded font: {}", path);
                return Ok(renderer);
            }
        }

        Err(Error::Font(
            "no usable monospace font found; set gui.font_path".to_string(),
        ))
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    /// Rasterize `c` into the cache if it is not there yet
    pub fn ensure_cached(&mut self, c: char) {
        if self.glyph_cache.contains_key(&c) {
            return;
        }
        let (metrics, bitmap) = self.font.rasterize(c, self.font_size);
        self.glyph_cache.insert(
            c,
            Glyph {
                bitmap,
                width: metrics.width,
                height: metrics.height,
                xmin: metrics.xmin,
                ymin: metrics.ymin,
            },
        );
    }

    /// A previously cached glyph
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyph_cache.get(&c)
    }

    /// Whole cells that fit in the given pixel size, at least one each way
    pub fn grid_size(&self, pixel_width: u32, pixel_height: u32) -> (usize, usize) {
        let cols = (pixel_width / self.cell_width) as usize;
        let rows = (pixel_height / self.cell_height) as usize;
        (cols.max(1), rows.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FontRenderer::new(&dir.path().join("absent.ttf"), 16.0)
            .err()
            .unwrap();
        assert!(matches!(err, Error::Font(_)));
    }

    #[test]
    fn test_garbage_font_data() {
        assert!(matches!(
            FontRenderer::from_bytes(b"not a font", 16.0),
            Err(Error::Font(_))
        ));
    }

    #[test]
    fn test_grid_size() {
        // Needs a system font; nothing to check without one.
        if let Ok(renderer) = FontRenderer::with_default_font(16.0) {
            let (cols, rows) = renderer.grid_size(800, 600);
            assert!(cols > 1);
            assert!(rows > 1);
            assert_eq!(renderer.grid_size(0, 0), (1, 1));
        }
    }

    #[test]
    fn test_glyph_cache() {
        if let Ok(mut renderer) = FontRenderer::with_default_font(16.0) {
            assert!(renderer.glyph('A').is_none());
            renderer.ensure_cached('A');
            let glyph = renderer.glyph('A').unwrap();
            assert_eq!(glyph.bitmap.len(), glyph.width * glyph.height);
        }
    }
}

//! Screen renderer using softbuffer (CPU rendering)
//!
//! Paints a [`ScreenBuffer`] into the window's pixel buffer. Every present
//! repaints the full grid.
//!
//! Attribute bits are interpreted here:
//! - `BOLD` and `BRIGHT` brighten the foreground
//! - `DIM` pulls the foreground halfway to the background
//! - `REVERSE` swaps foreground and background
//! - `UNDERLINE` draws a rule under the baseline
//! - `ITALIC` is drawn upright (there is no slanted face)
//!
//! A visible cursor inverts the colors of the cell it sits on.

use std::num::NonZeroU32;
use std::rc::Rc;

use softbuffer::{Context, Surface};
use winit::window::Window;

use super::font::{FontRenderer, Glyph};
use crate::core::{attr, Attr, ScreenBuffer};
use crate::error::{Error, Result};

pub type Rgb = (u8, u8, u8);

/// Default colors and the per-attribute adjustments applied to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: Rgb,
    pub background: Rgb,
}

impl Palette {
    /// Foreground and background for a cell
    pub fn cell_colors(&self, bits: Attr, cursor: bool) -> (Rgb, Rgb) {
        let mut fg = self.foreground;
        let mut bg = self.background;

        if bits & (attr::BOLD | attr::BRIGHT) != 0 {
            fg = blend(fg, (255, 255, 255), 0.35);
        }
        if bits & attr::DIM != 0 {
            fg = blend(fg, bg, 0.5);
        }
        if bits & attr::REVERSE != 0 {
            std::mem::swap(&mut fg, &mut bg);
        }
        if cursor {
            std::mem::swap(&mut fg, &mut bg);
        }

        (fg, bg)
    }
}

/// Window renderer
pub struct Renderer {
    window: Rc<Window>,
    #[allow(dead_code)]
    context: Context<Rc<Window>>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    font: FontRenderer,
    palette: Palette,
}

impl Renderer {
    pub fn new(window: Rc<Window>, font: FontRenderer, palette: Palette) -> Result<Self> {
        let context = Context::new(window.clone()).map_err(|e| Error::Renderer(e.to_string()))?;
        let surface =
            Surface::new(&context, window.clone()).map_err(|e| Error::Renderer(e.to_string()))?;

        // Pre-cache printable ASCII for a faster first frame
        let mut font = font;
        for c in '!'..='~' {
            font.ensure_cached(c);
        }

        Ok(Self {
            window,
            context,
            surface,
            font,
            palette,
        })
    }

    pub fn font(&self) -> &FontRenderer {
        &self.font
    }

    /// Paint `screen` and present it
    pub fn render(&mut self, screen: &ScreenBuffer) -> Result<()> {
        let size = self.window.inner_size();
        let (Some(nz_width), Some(nz_height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized
            return Ok(());
        };
        let (width, height) = (size.width, size.height);

        self.surface
            .resize(nz_width, nz_height)
            .map_err(|e| Error::Renderer(e.to_string()))?;

        for cell in screen.cells() {
            if !cell.is_blank() {
                self.font.ensure_cached(cell.c);
            }
        }

        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| Error::Renderer(e.to_string()))?;

        let bg = self.palette.background;
        buffer.fill(rgb_to_pixel(bg.0, bg.1, bg.2));

        let cell_w = self.font.cell_width() as i32;
        let cell_h = self.font.cell_height() as i32;
        let baseline = self.font.baseline();
        let underline = (cell_h / 14).max(1);
        let cursor = screen.cursor().drawn_at(screen.width(), screen.height());

        for (row, cells) in screen.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let x = col as i32 * cell_w;
                let y = row as i32 * cell_h;
                let (fg, bg) = self
                    .palette
                    .cell_colors(cell.attr, cursor == Some((col, row)));

                fill_rect(&mut buffer, x, y, cell_w, cell_h, bg, width, height);

                if !cell.is_blank() {
                    if let Some(glyph) = self.font.glyph(cell.c) {
                        draw_glyph(&mut buffer, x, y, glyph, fg, baseline, width, height);
                    }
                }

                if cell.has(attr::UNDERLINE) {
                    let uy = (y + baseline + 1).min(y + cell_h - underline);
                    fill_rect(&mut buffer, x, uy, cell_w, underline, fg, width, height);
                }
            }
        }

        buffer
            .present()
            .map_err(|e| Error::Renderer(e.to_string()))?;

        Ok(())
    }
}

/// Convert RGB to pixel value (ARGB format)
fn rgb_to_pixel(r: u8, g: u8, b: u8) -> u32 {
    0xFF000000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

fn blend(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

#[allow(clippy::too_many_arguments)]
fn fill_rect(
    buffer: &mut [u32],
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: Rgb,
    buf_width: u32,
    buf_height: u32,
) {
    let pixel = rgb_to_pixel(color.0, color.1, color.2);

    for py in y.max(0)..(y + h).min(buf_height as i32) {
        for px in x.max(0)..(x + w).min(buf_width as i32) {
            let idx = (py as u32 * buf_width + px as u32) as usize;
            if let Some(slot) = buffer.get_mut(idx) {
                *slot = pixel;
            }
        }
    }
}

/// Alpha-blend a glyph onto the buffer with its baseline at `y + baseline`
#[allow(clippy::too_many_arguments)]
fn draw_glyph(
    buffer: &mut [u32],
    x: i32,
    y: i32,
    glyph: &Glyph,
    color: Rgb,
    baseline: i32,
    buf_width: u32,
    buf_height: u32,
) {
    if glyph.width == 0 || glyph.height == 0 {
        return;
    }

    let gx = x + glyph.xmin;
    let gy = y + baseline - glyph.ymin - glyph.height as i32;

    for dy in 0..glyph.height {
        let py = gy + dy as i32;
        if py < 0 || py >= buf_height as i32 {
            continue;
        }

        for dx in 0..glyph.width {
            let px = gx + dx as i32;
            if px < 0 || px >= buf_width as i32 {
                continue;
            }

            let alpha = glyph.bitmap[dy * glyph.width + dx];
            if alpha == 0 {
                continue;
            }

            let idx = (py as u32 * buf_width + px as u32) as usize;
            let Some(slot) = buffer.get_mut(idx) else {
                continue;
            };

            if alpha == 255 {
                *slot = rgb_to_pixel(color.0, color.1, color.2);
            } else {
                let existing = *slot;
                let er = ((existing >> 16) & 0xFF) as u32;
                let eg = ((existing >> 8) & 0xFF) as u32;
                let eb = (existing & 0xFF) as u32;

                let a = alpha as u32;
                let ia = 255 - a;

                let r = ((color.0 as u32 * a + er * ia) / 255) as u8;
                let g = ((color.1 as u32 * a + eg * ia) / 255) as u8;
                let b = ((color.2 as u32 * a + eb * ia) / 255) as u8;

                *slot = rgb_to_pixel(r, g, b);
            }
        }
    }
}

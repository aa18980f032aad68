//! Windowed Backend
//!
//! Uses winit for window management and input, softbuffer for presentation,
//! and fontdue for glyph rasterization.
//!
//! Configuration keys read at start:
//!
//! | Key | Default |
//! | --- | --- |
//! | `window_width`, `window_height` | 800 x 600 pixels |
//! | `font_path` | first monospace system font found |
//! | `font_size` | 16 pixels |
//! | `columns`, `rows` | as many cells as fit in the window |
//! | `foreground`, `background` | `#d4d4d4` on `#1e1e1e` |
//! | `title` | program name from `init` |
//!
//! The event loop is created on first start and kept for the life of the
//! backend; winit allows one per process.

mod events;
mod font;
mod renderer;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use log::{debug, info, warn};
use winit::dpi::PhysicalSize;
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

pub use font::FontRenderer;
pub use renderer::Palette;

use self::events::WinitSource;
use self::renderer::Renderer;
use super::{grid_size, Backend};
use crate::app::{parse_hex, ConfigError, ConfigSource, MAX_GRID_EDGE};
use crate::core::ScreenBuffer;
use crate::error::{Error, Result};
use crate::input::{self, NativeEvent};
use crate::keys::{Modifiers, VirtualKey};

const DEFAULT_TITLE: &str = "grinder";

/// Everything that exists only between start and shutdown
struct Session {
    window: Rc<Window>,
    renderer: Renderer,
    buffer: ScreenBuffer,
    /// Copy of the buffer at the last sync, for expose repaints
    presented: Option<ScreenBuffer>,
    pending: VecDeque<NativeEvent>,
    mods: Modifiers,
}

/// A display in a native window
#[derive(Default)]
pub struct GuiBackend {
    title: Option<String>,
    event_loop: Option<EventLoop<()>>,
    session: Option<Session>,
}

impl GuiBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Startup parameters, resolved and validated
struct Settings {
    window_width: u32,
    window_height: u32,
    font_path: Option<PathBuf>,
    font_size: u32,
    palette: Palette,
    title: String,
}

impl Settings {
    fn read(config: &dyn ConfigSource, default_title: &str) -> Result<Self> {
        let font_path = match config.string("font_path") {
            Ok(path) => Some(PathBuf::from(path)),
            Err(ConfigError::Missing { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            window_width: positive(config, "window_width", 800)?,
            window_height: positive(config, "window_height", 600)?,
            font_path,
            font_size: positive(config, "font_size", 16)?,
            palette: Palette {
                foreground: color(config, "foreground", "#d4d4d4")?,
                background: color(config, "background", "#1e1e1e")?,
            },
            title: config.string_or("title", default_title)?,
        })
    }
}

fn positive(config: &dyn ConfigSource, key: &str, default: i64) -> Result<u32> {
    let value = config.int_or(key, default)?;
    match u32::try_from(value) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            field: key.to_string(),
            message: format!("must be a positive integer, got {}", value),
        }
        .into()),
    }
}

fn color(config: &dyn ConfigSource, key: &str, default: &str) -> Result<(u8, u8, u8)> {
    let value = config.string_or(key, default)?;
    parse_hex(&value).ok_or_else(|| {
        ConfigError::Invalid {
            field: key.to_string(),
            message: format!("invalid hex color '{}'", value),
        }
        .into()
    })
}

impl Backend for GuiBackend {
    fn init(&mut self, args: &[String]) {
        let program = args
            .first()
            .map(|arg0| {
                std::path::Path::new(arg0)
                    .file_name()
                    .map_or_else(|| arg0.clone(), |name| name.to_string_lossy().into_owned())
            })
            .filter(|name| !name.is_empty());
        debug!("gui init, program name {:?}", program);
        self.title = program;
    }

    fn start(&mut self, config: &dyn ConfigSource) -> Result<()> {
        if self.session.is_some() {
            return Err(Error::AlreadyStarted);
        }

        let settings = Settings::read(config, self.title.as_deref().unwrap_or(DEFAULT_TITLE))?;
        let (columns, rows) = grid_size(config)?;

        let font = FontRenderer::load(settings.font_path.as_deref(), settings.font_size as f32)?;

        let event_loop = match self.event_loop.take() {
            Some(event_loop) => event_loop,
            None => EventLoop::new().map_err(|e| Error::Subsystem(e.to_string()))?,
        };
        let event_loop = self.event_loop.insert(event_loop);

        let window = WindowBuilder::new()
            .with_title(settings.title.as_str())
            .with_inner_size(PhysicalSize::new(
                settings.window_width,
                settings.window_height,
            ))
            .build(event_loop)
            .map_err(|e| Error::Window(e.to_string()))?;
        let window = Rc::new(window);

        let renderer = Renderer::new(window.clone(), font, settings.palette)?;

        let (fit_cols, fit_rows) = renderer
            .font()
            .grid_size(settings.window_width, settings.window_height);
        let max = MAX_GRID_EDGE as usize;
        let width = columns.unwrap_or(fit_cols.min(max));
        let height = rows.unwrap_or(fit_rows.min(max));

        info!(
            "window display started: {}x{} cells in {}x{} pixels",
            width, height, settings.window_width, settings.window_height
        );

        self.session = Some(Session {
            window,
            renderer,
            buffer: ScreenBuffer::new(width, height),
            presented: None,
            pending: VecDeque::new(),
            mods: Modifiers::NONE,
        });
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.session.take().is_some() {
            info!("window display shut down");
        }
    }

    fn buffer(&self) -> Option<&ScreenBuffer> {
        self.session.as_ref().map(|s| &s.buffer)
    }

    fn buffer_mut(&mut self) -> Option<&mut ScreenBuffer> {
        self.session.as_mut().map(|s| &mut s.buffer)
    }

    fn sync(&mut self) {
        let Some(session) = &mut self.session else {
            return;
        };
        if let Err(e) = session.renderer.render(&session.buffer) {
            warn!("Render failed: {}", e);
        }
        match &mut session.presented {
            Some(presented) => presented.clone_from(&session.buffer),
            None => session.presented = Some(session.buffer.clone()),
        }
    }

    fn read_key(&mut self, timeout: Option<Duration>) -> VirtualKey {
        let (Some(event_loop), Some(session)) = (self.event_loop.as_mut(), self.session.as_mut())
        else {
            warn!("read_key on a display that is not running");
            return VirtualKey::QUIT;
        };

        let mut source = WinitSource {
            event_loop,
            window_id: session.window.id(),
            renderer: &mut session.renderer,
            presented: session.presented.as_ref(),
            pending: &mut session.pending,
            mods: &mut session.mods,
        };
        input::read_key(&mut source, timeout)
    }
}

//! Display Backends
//!
//! The caller-facing contract shared by every backend. An editor talks only
//! to [`Backend`]; which native library sits underneath is decided when the
//! backend is constructed.
//!
//! # Lifecycle
//!
//! `init(args)` → `start(config)` → buffer calls / `sync` / `read_key` →
//! `shutdown()`.
//!
//! Buffer calls made before `start` or after `shutdown` are ignored.
//! Nothing drawn is visible until `sync`.

use std::time::Duration;

use log::error;

use crate::app::{ConfigError, ConfigSource, MAX_GRID_EDGE};
use crate::core::{Attr, ScreenBuffer};
use crate::error::Result;
use crate::keys::{self, VirtualKey};

#[cfg(feature = "gui")]
pub mod gui;
pub mod headless;

#[cfg(feature = "gui")]
pub use gui::GuiBackend;
pub use headless::{HeadlessBackend, Injector, DEFAULT_FRAME_HISTORY};

/// Default buffer size when the configuration does not name one
pub const DEFAULT_COLUMNS: usize = 80;
pub const DEFAULT_ROWS: usize = 25;

/// A character-cell display with keyboard input
pub trait Backend {
    /// Prepare from process arguments. Creates no native resources.
    fn init(&mut self, args: &[String]);

    /// Create the native display and a fresh screen buffer.
    ///
    /// The attribute register starts at zero and the cursor hidden at the
    /// origin.
    fn start(&mut self, config: &dyn ConfigSource) -> Result<()>;

    /// Release native resources and drop the screen buffer
    fn shutdown(&mut self);

    /// The screen buffer, once started
    fn buffer(&self) -> Option<&ScreenBuffer>;

    fn buffer_mut(&mut self) -> Option<&mut ScreenBuffer>;

    /// Make the current buffer contents and cursor visible
    fn sync(&mut self);

    /// Wait for the next key, resize, quit or timeout.
    ///
    /// `None` waits forever, `Some(Duration::ZERO)` polls.
    fn read_key(&mut self, timeout: Option<Duration>) -> VirtualKey;

    /// Width and height in cells, `(0, 0)` before start
    fn screen_size(&self) -> (i32, i32) {
        self.buffer().map_or((0, 0), ScreenBuffer::size)
    }

    /// `current = (current & andmask) | ormask`
    fn set_attr(&mut self, andmask: Attr, ormask: Attr) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.set_attr(andmask, ormask);
        }
    }

    fn write_char(&mut self, x: i32, y: i32, c: char) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.write_char(x, y, c);
        }
    }

    /// Blank the inclusive rectangle with the current attribute
    fn clear_area(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.clear_area(x1, y1, x2, y2);
        }
    }

    fn clear_screen(&mut self) {
        let (w, h) = self.screen_size();
        self.clear_area(0, 0, w - 1, h - 1);
    }

    fn set_cursor(&mut self, x: i32, y: i32, shown: bool) {
        if let Some(buffer) = self.buffer_mut() {
            buffer.set_cursor(x, y, shown);
        }
    }

    fn key_name(&self, code: i32) -> String {
        keys::key_name(code)
    }
}

/// Start `backend` or terminate the process.
///
/// On failure the error is logged, printed to stderr, and the process exits
/// with status 1.
pub fn start_or_exit(backend: &mut dyn Backend, config: &dyn ConfigSource) {
    if let Err(e) = backend.start(config) {
        error!("Display start failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Optional `columns`/`rows` from the configuration, each validated.
///
/// Every source is checked here, not only configs that went through
/// `Config::validate`, so no edge can exceed [`MAX_GRID_EDGE`].
pub(crate) fn grid_size(config: &dyn ConfigSource) -> Result<(Option<usize>, Option<usize>)> {
    Ok((cells(config, "columns")?, cells(config, "rows")?))
}

fn cells(config: &dyn ConfigSource, key: &str) -> Result<Option<usize>> {
    let value = match config.int(key) {
        Ok(value) => value,
        Err(ConfigError::Missing { .. }) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match u32::try_from(value) {
        Ok(n) if (1..=MAX_GRID_EDGE).contains(&n) => Ok(Some(n as usize)),
        _ => Err(ConfigError::Invalid {
            field: key.to_string(),
            message: format!("must be between 1 and {}, got {}", MAX_GRID_EDGE, value),
        }
        .into()),
    }
}

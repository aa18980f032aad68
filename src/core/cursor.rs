//! Cursor state
//!
//! Advisory position and visibility. It never changes buffer contents and is
//! only read when a backend presents a frame.

use serde::{Deserialize, Serialize};

/// Cursor position and visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorState {
    /// Column (0-indexed, may lie outside the buffer)
    pub x: i32,
    /// Row (0-indexed, may lie outside the buffer)
    pub y: i32,
    /// Whether the cursor should be drawn
    pub visible: bool,
}

impl CursorState {
    /// Hidden, at the origin
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, x: i32, y: i32, visible: bool) {
        self.x = x;
        self.y = y;
        self.visible = visible;
    }

    /// Cell the cursor should be drawn on, if it is shown and inside the grid
    pub fn drawn_at(&self, width: usize, height: usize) -> Option<(usize, usize)> {
        if !self.visible {
            return None;
        }
        let x = usize::try_from(self.x).ok().filter(|&x| x < width)?;
        let y = usize::try_from(self.y).ok().filter(|&y| y < height)?;
        Some((x, y))
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

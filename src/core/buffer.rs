//! Screen Buffer
//!
//! A fixed-size, row-major grid of cells together with the cursor and the
//! attribute register. The size is set once at construction; a display resize
//! is reported to the caller as a key code and never reshapes the grid.
//!
//! Every coordinate outside the grid is clipped silently. Layout code is
//! allowed to overshoot the edges.

use super::cell::{AttributeRegister, Attr, Cell};
use super::cursor::CursorState;

/// The in-memory screen owned by a backend
#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    cells: Vec<Cell>,
    width: usize,
    height: usize,
    attr: AttributeRegister,
    cursor: CursorState,
}

impl ScreenBuffer {
    /// A blank buffer with a zeroed attribute register and a hidden cursor
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![Cell::default(); width * height],
            width,
            height,
            attr: AttributeRegister::new(),
            cursor: CursorState::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Dimensions as reported to the caller
    pub fn size(&self) -> (i32, i32) {
        let w = i32::try_from(self.width).unwrap_or(i32::MAX);
        let h = i32::try_from(self.height).unwrap_or(i32::MAX);
        (w, h)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        // chunks() panics on zero, an empty grid simply has no rows.
        self.cells.chunks(self.width.max(1))
    }

    pub fn attr(&self) -> Attr {
        self.attr.get()
    }

    pub fn set_attr(&mut self, andmask: Attr, ormask: Attr) {
        self.attr.apply(andmask, ormask);
    }

    pub fn cursor(&self) -> &CursorState {
        &self.cursor
    }

    pub fn set_cursor(&mut self, x: i32, y: i32, shown: bool) {
        self.cursor.set(x, y, shown);
    }

    /// Store one character with the current attribute
    pub fn write_char(&mut self, x: i32, y: i32, c: char) {
        let attr = self.attr.get();
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell::new(c, attr);
        }
    }

    /// Blank the inclusive rectangle with the current attribute
    pub fn clear_area(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let Some((left, right)) = clip_span(x1, x2, self.width) else {
            return;
        };
        let Some((top, bottom)) = clip_span(y1, y2, self.height) else {
            return;
        };

        let blank = Cell::blank(self.attr.get());
        for y in top..=bottom {
            let start = y * self.width;
            self.cells[start + left..=start + right].fill(blank);
        }
    }

    /// Blank the whole grid with the current attribute
    pub fn clear(&mut self) {
        self.cells.fill(Cell::blank(self.attr.get()));
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = usize::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y * self.width + x)
    }
}

/// Clip the inclusive span `[a, b]` to `[0, len)`
fn clip_span(a: i32, b: i32, len: usize) -> Option<(usize, usize)> {
    if a > b || len == 0 || b < 0 {
        return None;
    }
    let start = usize::try_from(a.max(0)).ok()?;
    if start >= len {
        return None;
    }
    let end = usize::try_from(b).ok()?.min(len - 1);
    Some((start, end))
}

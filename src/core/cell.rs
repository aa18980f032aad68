//! Screen Cell
//!
//! One glyph position in the screen buffer: a character and the display
//! attribute it was written with.

use serde::{Deserialize, Serialize};

/// Display attribute bitmask
pub type Attr = u8;

/// Attribute bits understood by the renderers
pub mod attr {
    use super::Attr;

    pub const ITALIC: Attr = 1 << 0;
    pub const UNDERLINE: Attr = 1 << 1;
    pub const REVERSE: Attr = 1 << 2;
    pub const BOLD: Attr = 1 << 3;
    pub const BRIGHT: Attr = 1 << 4;
    pub const DIM: Attr = 1 << 5;
}

/// A single cell in the screen buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell
    pub c: char,
    /// Attribute active when the cell was written
    pub attr: Attr,
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank(0)
    }
}

impl Cell {
    pub fn new(c: char, attr: Attr) -> Self {
        Self { c, attr }
    }

    /// A space with the given attribute
    pub fn blank(attr: Attr) -> Self {
        Self { c: ' ', attr }
    }

    pub fn is_blank(&self) -> bool {
        self.c == ' '
    }

    pub fn has(&self, bits: Attr) -> bool {
        self.attr & bits == bits
    }
}

/// The attribute applied to every subsequent write and clear
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRegister(Attr);

impl AttributeRegister {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn get(&self) -> Attr {
        self.0
    }

    /// `current = (current & andmask) | ormask`
    pub fn apply(&mut self, andmask: Attr, ormask: Attr) {
        self.0 = (self.0 & andmask) | ormask;
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

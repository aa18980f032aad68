//! Display Core Module
//!
//! Platform-independent screen state shared by every backend:
//! - Cells and display attribute bits
//! - The attribute register
//! - Cursor state
//! - The fixed-size screen buffer
//! - Deterministic snapshot generation
//!
//! Nothing here talks to a window or a keyboard. Backends own a
//! [`ScreenBuffer`] and decide when its contents become visible.

mod buffer;
mod cell;
mod cursor;
mod snapshot;

pub use buffer::ScreenBuffer;
pub use cell::{attr, Attr, AttributeRegister, Cell};
pub use cursor::CursorState;
pub use snapshot::{AttrSnapshot, CellSnapshot, Snapshot};

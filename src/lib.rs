//! Grinder Display Library
//!
//! The character-cell display and keyboard input layer beneath a text
//! editor. The editor draws into a fixed grid of attributed cells and reads
//! one integer key code at a time; this crate hides which windowing library
//! does the work.
//!
//! - `core`: cells, attribute bits, cursor, screen buffer, snapshots
//! - `keys`: the virtual key code namespace and `key_name`
//! - `input`: native event model and the shared blocking key pump
//! - `backend`: the `Backend` contract, headless and windowed backends
//! - `app`: configuration sources and CLI arguments
//!
//! The windowed backend needs the `gui` feature.

pub mod app;
pub mod backend;
pub mod core;
pub mod error;
pub mod input;
pub mod keys;

pub use backend::{start_or_exit, Backend, HeadlessBackend};
pub use error::{Error, Result};
pub use keys::{key_name, VirtualKey};

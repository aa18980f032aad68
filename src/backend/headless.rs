//! Headless Backend
//!
//! A backend with no window. Native events come from a channel fed through
//! [`Injector`] handles, and every `sync` records a [`Snapshot`] of what a
//! real display would have shown. Useful for testing and for producing
//! deterministic screen dumps.
//!
//! ```
//! use grinder_display::app::Config;
//! use grinder_display::backend::{Backend, HeadlessBackend};
//!
//! let mut display = HeadlessBackend::new();
//! display.start(&Config::default()).unwrap();
//! display.write_char(5, 5, 'X');
//! display.sync();
//! assert_eq!(display.last_frame().unwrap().cell(5, 5).unwrap().c, 'X');
//! ```

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use log::{debug, info};

use super::{grid_size, Backend, DEFAULT_COLUMNS, DEFAULT_ROWS};
use crate::app::ConfigSource;
use crate::core::{ScreenBuffer, Snapshot};
use crate::error::{Error, Result};
use crate::input::{self, EventSource, NativeEvent, NativeKey};
use crate::keys::{Modifiers, VirtualKey};

/// Sends native events to a [`HeadlessBackend`], from any thread
#[derive(Debug, Clone)]
pub struct Injector {
    tx: Sender<NativeEvent>,
}

impl Injector {
    /// Queue a raw native event. Returns false once the backend is gone.
    pub fn send(&self, event: NativeEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Committed text, as an input method would deliver it
    pub fn text(&self, text: &str) -> bool {
        self.send(NativeEvent::Text(text.to_string()))
    }

    pub fn key(&self, key: NativeKey, mods: Modifiers) -> bool {
        self.send(NativeEvent::KeyDown { key, mods })
    }

    /// A printable key press: the key-down followed by its text
    pub fn type_char(&self, c: char) -> bool {
        self.key(NativeKey::Char(c), Modifiers::NONE) && self.text(&c.to_string())
    }

    pub fn resize(&self) -> bool {
        self.send(NativeEvent::Resized)
    }

    pub fn close(&self) -> bool {
        self.send(NativeEvent::CloseRequested)
    }
}

/// Channel end the key pump waits on
struct ChannelSource<'a>(&'a Receiver<NativeEvent>);

impl EventSource for ChannelSource<'_> {
    fn wait_event(&mut self, timeout: Option<Duration>) -> Option<NativeEvent> {
        match timeout {
            None => self.0.recv().ok(),
            Some(timeout) => match self.0.recv_timeout(timeout) {
                Ok(event) => Some(event),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
            },
        }
    }
}

/// Frames kept by default before the oldest are dropped
pub const DEFAULT_FRAME_HISTORY: usize = 64;

/// A display that renders into memory
pub struct HeadlessBackend {
    args: Vec<String>,
    buffer: Option<ScreenBuffer>,
    events: Receiver<NativeEvent>,
    // Held so the channel never disconnects while the backend lives.
    injector: Injector,
    frames: Vec<Snapshot>,
    frame_history: usize,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        let (tx, events) = mpsc::channel();
        Self {
            args: Vec::new(),
            buffer: None,
            events,
            injector: Injector { tx },
            frames: Vec::new(),
            frame_history: DEFAULT_FRAME_HISTORY,
        }
    }

    /// Keep at most `limit` presented frames (at least one).
    ///
    /// Older frames are dropped as new ones are presented.
    pub fn with_frame_history(mut self, limit: usize) -> Self {
        self.frame_history = limit.max(1);
        self.trim_frames();
        self
    }

    fn trim_frames(&mut self) {
        let excess = self.frames.len().saturating_sub(self.frame_history);
        if excess > 0 {
            self.frames.drain(..excess);
        }
    }

    /// A new handle for feeding events to this backend
    pub fn injector(&self) -> Injector {
        self.injector.clone()
    }

    /// Arguments recorded by `init`
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_started(&self) -> bool {
        self.buffer.is_some()
    }

    /// The most recent frames presented by `sync`, oldest first.
    ///
    /// Bounded by the frame history, [`DEFAULT_FRAME_HISTORY`] unless set
    /// with [`with_frame_history`](Self::with_frame_history).
    pub fn frames(&self) -> &[Snapshot] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Snapshot> {
        self.frames.last()
    }

    /// Drain the recorded frames
    pub fn take_frames(&mut self) -> Vec<Snapshot> {
        std::mem::take(&mut self.frames)
    }
}

impl Backend for HeadlessBackend {
    fn init(&mut self, args: &[String]) {
        debug!("headless init with {} args", args.len());
        self.args = args.to_vec();
    }

    fn start(&mut self, config: &dyn ConfigSource) -> Result<()> {
        if self.is_started() {
            return Err(Error::AlreadyStarted);
        }

        let (columns, rows) = grid_size(config)?;
        let width = columns.unwrap_or(DEFAULT_COLUMNS);
        let height = rows.unwrap_or(DEFAULT_ROWS);

        info!("headless display started: {}x{}", width, height);
        self.buffer = Some(ScreenBuffer::new(width, height));
        self.frames.clear();
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.buffer.take().is_some() {
            info!("headless display shut down");
        }
    }

    fn buffer(&self) -> Option<&ScreenBuffer> {
        self.buffer.as_ref()
    }

    fn buffer_mut(&mut self) -> Option<&mut ScreenBuffer> {
        self.buffer.as_mut()
    }

    fn sync(&mut self) {
        if let Some(buffer) = &self.buffer {
            self.frames.push(Snapshot::from_buffer(buffer));
            self.trim_frames();
        }
    }

    fn read_key(&mut self, timeout: Option<Duration>) -> VirtualKey {
        input::read_key(&mut ChannelSource(&self.events), timeout)
    }
}

//! Input Pump Module
//!
//! Turns a backend's native events into virtual key codes.
//!
//! Each backend only has to describe how to wait for its next native event
//! (the [`EventSource`] trait). The shared [`read_key`] loop does the rest:
//! deadline bookkeeping, dropping irrelevant events, and translation into the
//! virtual key namespace.
//!
//! # Event mapping
//!
//! | Native event | Result |
//! | --- | --- |
//! | text entry | first character, as a positive code |
//! | key-down | [`translate_key_down`], or keep waiting if it yields nothing |
//! | window close | `QUIT` |
//! | window resize | `RESIZE` |
//! | anything else | keep waiting |
//!
//! When the deadline passes without a relevant event the result is `TIMEOUT`.

use std::time::{Duration, Instant};

use log::trace;

pub use crate::keys::NativeKey;
use crate::keys::{translate_key_down, Modifiers, VirtualKey};

/// A native event, already reduced to what the key pump cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// Committed text input
    Text(String),
    /// A key went down
    KeyDown { key: NativeKey, mods: Modifiers },
    /// The user asked to close the window
    CloseRequested,
    /// The display surface changed size
    Resized,
    /// Anything else (focus, mouse, expose, key release)
    Other,
}

/// Something `read_key` can wait on
pub trait EventSource {
    /// Block until the next native event or until `timeout` elapses.
    ///
    /// `None` waits indefinitely. Returns `None` when the timeout elapsed
    /// without an event.
    fn wait_event(&mut self, timeout: Option<Duration>) -> Option<NativeEvent>;
}

/// Convert a legacy seconds value into a read timeout.
///
/// Any negative (or NaN) value means wait forever.
pub fn timeout_from_secs(secs: f64) -> Option<Duration> {
    if secs.is_nan() || secs < 0.0 {
        return None;
    }
    Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}

/// Wait for the next relevant event and translate it.
///
/// `Some(Duration::ZERO)` polls: it drains whatever is already pending and
/// returns `TIMEOUT` if none of it was relevant.
pub fn read_key<S: EventSource + ?Sized>(source: &mut S, timeout: Option<Duration>) -> VirtualKey {
    // Checked before any arithmetic: "forever" has no deadline.
    let deadline = timeout.map(|t| Instant::now().checked_add(t));

    loop {
        let remaining = match deadline {
            None => None,
            Some(Some(deadline)) => Some(deadline.saturating_duration_since(Instant::now())),
            // Too far in the future to represent.
            Some(None) => None,
        };

        if let Some(event) = source.wait_event(remaining) {
            trace!("native event: {:?}", event);
            if let Some(key) = translate_event(event) {
                return key;
            }
        }

        match deadline {
            Some(Some(deadline)) if Instant::now() >= deadline => return VirtualKey::TIMEOUT,
            _ => {}
        }
    }
}

fn translate_event(event: NativeEvent) -> Option<VirtualKey> {
    match event {
        NativeEvent::Text(text) => text
            .chars()
            .next()
            .filter(|&c| c != '\0')
            .map(VirtualKey::text),
        NativeEvent::KeyDown { key, mods } => translate_key_down(key, mods),
        NativeEvent::CloseRequested => Some(VirtualKey::QUIT),
        NativeEvent::Resized => Some(VirtualKey::RESIZE),
        NativeEvent::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{Key, CTRL, CTRL_ASCII, SHIFT};
    use std::collections::VecDeque;

    /// Replays a fixed list of events, then reports timeouts
    #[derive(Default)]
    struct Scripted {
        events: VecDeque<NativeEvent>,
        waits: Vec<Option<Duration>>,
    }

    impl Scripted {
        fn new(events: impl IntoIterator<Item = NativeEvent>) -> Self {
            Self {
                events: events.into_iter().collect(),
                waits: Vec::new(),
            }
        }
    }

    impl EventSource for Scripted {
        fn wait_event(&mut self, timeout: Option<Duration>) -> Option<NativeEvent> {
            self.waits.push(timeout);
            let event = self.events.pop_front();
            if event.is_none() {
                // An indefinite wait on an exhausted script would hang forever.
                assert!(timeout.is_some(), "blocking wait on an empty script");
                if let Some(t) = timeout {
                    std::thread::sleep(t.min(Duration::from_millis(5)));
                }
            }
            event
        }
    }

    fn key_down(key: NativeKey, mods: Modifiers) -> NativeEvent {
        NativeEvent::KeyDown { key, mods }
    }

    #[test]
    fn test_poll_with_nothing_pending() {
        let mut source = Scripted::default();
        assert_eq!(read_key(&mut source, Some(Duration::ZERO)), VirtualKey::TIMEOUT);
        assert_eq!(source.waits.len(), 1);
    }

    #[test]
    fn test_short_timeout_elapses() {
        let mut source = Scripted::default();
        let start = Instant::now();
        let key = read_key(&mut source, Some(Duration::from_millis(20)));
        assert_eq!(key, VirtualKey::TIMEOUT);
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_text_event() {
        let mut source = Scripted::new([NativeEvent::Text("a".into())]);
        assert_eq!(read_key(&mut source, None).raw(), 'a' as i32);
    }

    #[test]
    fn test_text_event_uses_first_char() {
        let mut source = Scripted::new([NativeEvent::Text("é!".into())]);
        assert_eq!(read_key(&mut source, None).raw(), 0xE9);
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut source = Scripted::new([
            NativeEvent::Text(String::new()),
            NativeEvent::Text("\0".into()),
            NativeEvent::Text("z".into()),
        ]);
        assert_eq!(read_key(&mut source, None), VirtualKey::text('z'));
    }

    #[test]
    fn test_key_down_shift_left() {
        let mut source = Scripted::new([key_down(NativeKey::Named(Key::Left), Modifiers::SHIFT)]);
        let key = read_key(&mut source, None);
        assert_eq!(key.raw(), -(0xF702 | SHIFT));
        assert_eq!(key.name(), "KEY_SLEFT");
    }

    #[test]
    fn test_ctrl_letter_through_pump() {
        let mut source = Scripted::new([key_down(NativeKey::Char('a'), Modifiers::CTRL)]);
        let key = read_key(&mut source, None);
        assert_eq!(key.raw(), -(CTRL_ASCII | 1));
        assert_eq!(key.name(), "KEY_^A");
    }

    #[test]
    fn test_irrelevant_events_are_skipped() {
        let mut source = Scripted::new([
            NativeEvent::Other,
            key_down(NativeKey::Char('a'), Modifiers::NONE),
            key_down(NativeKey::Char('a'), Modifiers::SHIFT),
            NativeEvent::Text("A".into()),
        ]);
        assert_eq!(read_key(&mut source, None), VirtualKey::text('A'));
        assert_eq!(source.waits.len(), 4);
    }

    #[test]
    fn test_irrelevant_events_do_not_extend_deadline() {
        let mut source = Scripted::new(std::iter::repeat(NativeEvent::Other).take(3));
        assert_eq!(read_key(&mut source, Some(Duration::ZERO)), VirtualKey::TIMEOUT);
        assert_eq!(source.waits.len(), 1);
    }

    #[test]
    fn test_close_and_resize() {
        let mut source = Scripted::new([NativeEvent::Resized, NativeEvent::CloseRequested]);
        assert_eq!(read_key(&mut source, None), VirtualKey::RESIZE);
        assert_eq!(read_key(&mut source, None), VirtualKey::QUIT);
    }

    #[test]
    fn test_pending_event_beats_zero_timeout() {
        let mut source = Scripted::new([key_down(NativeKey::Named(Key::F(5)), Modifiers::CTRL)]);
        let key = read_key(&mut source, Some(Duration::ZERO));
        assert_eq!(key.raw(), -((0xF704 + 4) | CTRL));
    }

    #[test]
    fn test_block_forever_waits_without_timeout() {
        let mut source = Scripted::new([NativeEvent::Other, NativeEvent::Text("x".into())]);
        read_key(&mut source, None);
        assert_eq!(source.waits, vec![None, None]);
    }

    #[test]
    fn test_timeout_from_secs() {
        assert_eq!(timeout_from_secs(-1.0), None);
        assert_eq!(timeout_from_secs(-0.5), None);
        assert_eq!(timeout_from_secs(f64::NAN), None);
        assert_eq!(timeout_from_secs(0.0), Some(Duration::ZERO));
        assert_eq!(timeout_from_secs(1.5), Some(Duration::from_millis(1500)));
        assert_eq!(timeout_from_secs(f64::INFINITY), Some(Duration::MAX));
    }

    #[test]
    fn test_huge_timeout_does_not_overflow() {
        let mut source = Scripted::new([NativeEvent::Text("q".into())]);
        assert_eq!(read_key(&mut source, Some(Duration::MAX)), VirtualKey::text('q'));
    }
}

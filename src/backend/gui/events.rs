//! winit event translation
//!
//! Reduces winit window events to [`NativeEvent`]s and implements the
//! blocking wait the shared key pump needs, on top of
//! `EventLoopExtPumpEvents::pump_events`.
//!
//! A printable key press is reported twice, as a key-down and as its text,
//! the same shape the key pump expects from every backend. Named keys
//! report only the key-down; the text winit attaches to them (`"\r"`,
//! `"\t"`, ...) is dropped.

use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, warn};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::WindowId;

use super::renderer::Renderer;
use crate::core::ScreenBuffer;
use crate::input::{EventSource, NativeEvent, NativeKey};
use crate::keys::{Key, Modifiers};

/// How a winit named key maps onto the shared table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Named {
    Key(NativeKey),
    /// A bare modifier press, never reported
    Modifier,
    Unmapped,
}

fn map_named(named: NamedKey) -> Named {
    let key = match named {
        NamedKey::ArrowUp => Key::Up,
        NamedKey::ArrowDown => Key::Down,
        NamedKey::ArrowLeft => Key::Left,
        NamedKey::ArrowRight => Key::Right,
        NamedKey::Home => Key::Home,
        NamedKey::End => Key::End,
        NamedKey::Backspace => Key::Backspace,
        NamedKey::Delete => Key::Delete,
        NamedKey::Insert => Key::Insert,
        NamedKey::PageUp => Key::PageUp,
        NamedKey::PageDown => Key::PageDown,
        NamedKey::Tab => Key::Tab,
        NamedKey::Enter => Key::Return,
        NamedKey::Escape => Key::Escape,
        NamedKey::ContextMenu => Key::Menu,
        NamedKey::F1 => Key::F(1),
        NamedKey::F2 => Key::F(2),
        NamedKey::F3 => Key::F(3),
        NamedKey::F4 => Key::F(4),
        NamedKey::F5 => Key::F(5),
        NamedKey::F6 => Key::F(6),
        NamedKey::F7 => Key::F(7),
        NamedKey::F8 => Key::F(8),
        NamedKey::F9 => Key::F(9),
        NamedKey::F10 => Key::F(10),
        NamedKey::F11 => Key::F(11),
        NamedKey::F12 => Key::F(12),
        NamedKey::F13 => Key::F(13),
        NamedKey::F14 => Key::F(14),
        NamedKey::F15 => Key::F(15),
        NamedKey::F16 => Key::F(16),
        NamedKey::F17 => Key::F(17),
        NamedKey::F18 => Key::F(18),
        NamedKey::F19 => Key::F(19),
        NamedKey::F20 => Key::F(20),
        NamedKey::F21 => Key::F(21),
        NamedKey::F22 => Key::F(22),
        NamedKey::F23 => Key::F(23),
        NamedKey::F24 => Key::F(24),
        NamedKey::Space => return Named::Key(NativeKey::Char(' ')),
        NamedKey::Shift
        | NamedKey::Control
        | NamedKey::Alt
        | NamedKey::AltGraph
        | NamedKey::Super
        | NamedKey::Meta
        | NamedKey::Hyper
        | NamedKey::CapsLock
        | NamedKey::NumLock
        | NamedKey::ScrollLock
        | NamedKey::Fn
        | NamedKey::FnLock
        | NamedKey::Symbol
        | NamedKey::SymbolLock => return Named::Modifier,
        _ => return Named::Unmapped,
    };
    Named::Key(NativeKey::Named(key))
}

pub(super) fn modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
    }
}

/// Native scan code, for keys outside the shared table
#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn scancode(physical: PhysicalKey) -> u32 {
    use winit::platform::scancode::PhysicalKeyExtScancode;
    physical.to_scancode().unwrap_or(0)
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn scancode(_physical: PhysicalKey) -> u32 {
    0
}

/// Queue the native events for one key press
fn push_key_press(
    logical: &WinitKey,
    text: Option<&str>,
    scancode: impl FnOnce() -> u32,
    mods: Modifiers,
    out: &mut VecDeque<NativeEvent>,
) {
    let key = match logical {
        WinitKey::Named(named) => match map_named(*named) {
            Named::Key(key) => key,
            Named::Modifier => return,
            Named::Unmapped => NativeKey::Unknown(scancode()),
        },
        WinitKey::Character(s) => match s.chars().next() {
            Some(c) => NativeKey::Char(c),
            None => return,
        },
        WinitKey::Unidentified(_) => NativeKey::Unknown(scancode()),
        // Half of a compose sequence; the composed text arrives later.
        WinitKey::Dead(_) => return,
    };

    out.push_back(NativeEvent::KeyDown { key, mods });

    let printable = matches!(key, NativeKey::Char(c) if !c.is_control());
    if printable && !mods.ctrl {
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            out.push_back(NativeEvent::Text(text.to_string()));
        }
    }
}

fn push_key_event(event: &KeyEvent, mods: Modifiers, out: &mut VecDeque<NativeEvent>) {
    if event.state != ElementState::Pressed {
        return;
    }
    let physical = event.physical_key;
    push_key_press(
        &event.logical_key,
        event.text.as_deref(),
        || scancode(physical),
        mods,
        out,
    );
}

/// Blocking wait over a winit event loop.
///
/// Events arriving while the caller is blocked are queued. Expose events
/// repaint the last synced frame without waking the caller.
pub(super) struct WinitSource<'a> {
    pub event_loop: &'a mut EventLoop<()>,
    pub window_id: WindowId,
    pub renderer: &'a mut Renderer,
    pub presented: Option<&'a ScreenBuffer>,
    pub pending: &'a mut VecDeque<NativeEvent>,
    pub mods: &'a mut Modifiers,
}

impl EventSource for WinitSource<'_> {
    fn wait_event(&mut self, timeout: Option<Duration>) -> Option<NativeEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let WinitSource {
            event_loop,
            window_id,
            renderer,
            presented,
            pending,
            mods,
        } = self;
        let window_id = *window_id;
        let presented = *presented;

        let status = event_loop.pump_events(timeout, |event, _elwt| {
            let Event::WindowEvent { window_id: id, event } = event else {
                return;
            };
            if id != window_id {
                return;
            }

            match event {
                WindowEvent::CloseRequested => pending.push_back(NativeEvent::CloseRequested),
                WindowEvent::Resized(size) => {
                    debug!("window resized to {}x{}", size.width, size.height);
                    pending.push_back(NativeEvent::Resized);
                }
                WindowEvent::ModifiersChanged(state) => **mods = modifiers(state.state()),
                WindowEvent::KeyboardInput { event, .. } => push_key_event(&event, **mods, pending),
                WindowEvent::RedrawRequested => {
                    if let Some(frame) = presented {
                        if let Err(e) = renderer.render(frame) {
                            warn!("Redraw failed: {}", e);
                        }
                    }
                }
                _ => {}
            }
        });

        if let PumpStatus::Exit(code) = status {
            debug!("event loop exited with {}", code);
            pending.push_back(NativeEvent::CloseRequested);
        }

        pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    fn press(logical: WinitKey, text: Option<&str>, mods: Modifiers) -> Vec<NativeEvent> {
        let mut out = VecDeque::new();
        push_key_press(&logical, text, || 0x7e, mods, &mut out);
        out.into_iter().collect()
    }

    #[test]
    fn test_named_keys() {
        assert_eq!(
            press(WinitKey::Named(NamedKey::ArrowLeft), None, Modifiers::SHIFT),
            vec![NativeEvent::KeyDown {
                key: NativeKey::Named(Key::Left),
                mods: Modifiers::SHIFT
            }]
        );
        assert_eq!(
            map_named(NamedKey::ContextMenu),
            Named::Key(NativeKey::Named(Key::Menu))
        );
        assert_eq!(
            map_named(NamedKey::F24),
            Named::Key(NativeKey::Named(Key::F(24)))
        );
    }

    #[test]
    fn test_named_key_text_is_dropped() {
        let events = press(WinitKey::Named(NamedKey::Enter), Some("\r"), Modifiers::NONE);
        assert_eq!(
            events,
            vec![NativeEvent::KeyDown {
                key: NativeKey::Named(Key::Return),
                mods: Modifiers::NONE
            }]
        );
    }

    #[test]
    fn test_character_reports_key_and_text() {
        let events = press(
            WinitKey::Character(SmolStr::new("a")),
            Some("a"),
            Modifiers::NONE,
        );
        assert_eq!(
            events,
            vec![
                NativeEvent::KeyDown {
                    key: NativeKey::Char('a'),
                    mods: Modifiers::NONE
                },
                NativeEvent::Text("a".to_string()),
            ]
        );
    }

    #[test]
    fn test_ctrl_character_has_no_text() {
        let events = press(
            WinitKey::Character(SmolStr::new("q")),
            Some("\u{11}"),
            Modifiers::CTRL,
        );
        assert_eq!(
            events,
            vec![NativeEvent::KeyDown {
                key: NativeKey::Char('q'),
                mods: Modifiers::CTRL
            }]
        );
    }

    #[test]
    fn test_space() {
        let events = press(WinitKey::Named(NamedKey::Space), Some(" "), Modifiers::NONE);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], NativeEvent::Text(" ".to_string()));
    }

    #[test]
    fn test_modifier_only_is_ignored() {
        assert!(press(WinitKey::Named(NamedKey::Shift), None, Modifiers::SHIFT).is_empty());
        assert!(press(WinitKey::Named(NamedKey::Control), None, Modifiers::CTRL).is_empty());
    }

    #[test]
    fn test_unmapped_key_uses_scancode() {
        let events = press(WinitKey::Named(NamedKey::PrintScreen), None, Modifiers::NONE);
        assert_eq!(
            events,
            vec![NativeEvent::KeyDown {
                key: NativeKey::Unknown(0x7e),
                mods: Modifiers::NONE
            }]
        );
    }

    #[test]
    fn test_modifiers_state() {
        let state = ModifiersState::SHIFT | ModifiersState::CONTROL;
        assert_eq!(modifiers(state), Modifiers::CTRL_SHIFT);
        assert_eq!(modifiers(ModifiersState::ALT), Modifiers::NONE);
    }
}

//! Virtual Key Codes
//!
//! Everything `read_key` can report lives in one signed integer namespace:
//!
//! - A positive value is a literal Unicode scalar value (text entry).
//! - A negative value is a key-down event or a sentinel. Its magnitude is a
//!   base key code OR'd with modifier flags.
//! - Three magnitudes above every real key code are sentinels (resize,
//!   timeout, quit) and never carry modifier flags.
//!
//! Backends map their native key identifiers onto the shared [`Key`] table
//! before any flags are applied, so names decoded by [`key_name`] are the same
//! whichever backend produced the code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shift was held.
pub const SHIFT: i32 = 0x10000;
/// Ctrl was held on a non-letter key.
pub const CTRL: i32 = 0x20000;
/// Ctrl+letter: the base code is the ASCII control byte, not the key.
pub const CTRL_ASCII: i32 = 0x40000;
/// All modifier flags.
pub const MODIFIER_MASK: i32 = SHIFT | CTRL | CTRL_ASCII;

/// The display changed size; re-query the screen size.
pub const RESIZE: i32 = 0x80000;
/// The read deadline passed with no input.
pub const TIMEOUT: i32 = 0x80001;
/// The user asked to close the window.
pub const QUIT: i32 = 0x80002;

/// Strips modifier flags and the sentinel bit from a magnitude.
const KEY_MASK: i32 = !(MODIFIER_MASK | RESIZE);

/// Base code of F1; F1..=F24 are contiguous.
const F1_CODE: i32 = 0xF704;
const MAX_FUNCTION_KEY: u8 = 24;

/// First base code for unmapped native keys.
///
/// Unmapped keys get `UNKNOWN_BASE + native % UNKNOWN_SPAN`, a block that
/// sits between the control bytes and the symbolic table at 0xF700, so an
/// unmapped key can never decode as a named key or as code 0.
pub const UNKNOWN_BASE: i32 = 0x1000;
const UNKNOWN_SPAN: u32 = 0xE000;

/// Backend-independent non-printable keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Backspace,
    Delete,
    Insert,
    PageUp,
    PageDown,
    Tab,
    Return,
    Escape,
    Menu,
    /// Function key, numbered from 1
    F(u8),
}

/// Symbolic key table: key, base code, canonical name.
///
/// Page Up decodes as `PGUP` and Page Down as `PGDN`. The SDL build this
/// layer replaces had the two names swapped; bindings written against that
/// build need to swap them back.
static NAMED_KEYS: [(Key, i32, &str); 15] = [
    (Key::Down, 0xF701, "DOWN"),
    (Key::Up, 0xF700, "UP"),
    (Key::Left, 0xF702, "LEFT"),
    (Key::Right, 0xF703, "RIGHT"),
    (Key::Home, 0xF729, "HOME"),
    (Key::End, 0xF72B, "END"),
    (Key::Backspace, 0x08, "BACKSPACE"),
    (Key::Delete, 0xF728, "DELETE"),
    (Key::Insert, 0xF727, "INSERT"),
    (Key::PageUp, 0xF72C, "PGUP"),
    (Key::PageDown, 0xF72D, "PGDN"),
    (Key::Tab, 0x09, "TAB"),
    (Key::Return, 0x0D, "RETURN"),
    (Key::Escape, 0x1B, "ESCAPE"),
    (Key::Menu, 0xF735, "MENU"),
];

impl Key {
    /// Every key in the symbolic table, excluding function keys
    pub fn named() -> impl Iterator<Item = Key> {
        NAMED_KEYS.iter().map(|(key, _, _)| *key)
    }

    /// Every supported function key
    pub fn function_keys() -> impl Iterator<Item = Key> {
        (1..=MAX_FUNCTION_KEY).map(Key::F)
    }

    /// Base key code, before modifier flags are applied.
    ///
    /// Function keys outside 1..=24 have no code.
    pub fn code(self) -> Option<i32> {
        match self {
            Key::F(n) if (1..=MAX_FUNCTION_KEY).contains(&n) => Some(F1_CODE + i32::from(n) - 1),
            Key::F(_) => None,
            key => NAMED_KEYS
                .iter()
                .find(|(k, _, _)| *k == key)
                .map(|(_, code, _)| *code),
        }
    }

    /// Look up a base key code
    pub fn from_code(code: i32) -> Option<Key> {
        if let Some((key, _, _)) = NAMED_KEYS.iter().find(|(_, c, _)| *c == code) {
            return Some(*key);
        }
        let last = F1_CODE + i32::from(MAX_FUNCTION_KEY) - 1;
        if (F1_CODE..=last).contains(&code) {
            // Range checked above, always fits.
            return u8::try_from(code - F1_CODE + 1).ok().map(Key::F);
        }
        None
    }

    /// Canonical name without the `KEY_` prefix or modifier markers
    pub fn name(self) -> String {
        match self {
            Key::F(n) => format!("F{}", n),
            key => NAMED_KEYS
                .iter()
                .find(|(k, _, _)| *k == key)
                .map(|(_, _, name)| (*name).to_string())
                .unwrap_or_default(),
        }
    }

    fn from_name(name: &str) -> Option<Key> {
        if let Some((key, _, _)) = NAMED_KEYS.iter().find(|(_, _, n)| *n == name) {
            return Some(*key);
        }
        let n: u8 = name.strip_prefix('F')?.parse().ok()?;
        (1..=MAX_FUNCTION_KEY).contains(&n).then_some(Key::F(n))
    }
}

/// Modifier state of interest to the encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
    pub const CTRL_SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: true,
    };

    /// Flags for a non-letter key
    fn bits(self) -> i32 {
        let mut bits = 0;
        if self.shift {
            bits |= SHIFT;
        }
        if self.ctrl {
            bits |= CTRL;
        }
        bits
    }
}

/// A key as reported by a native backend, after mapping to the shared table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeKey {
    /// A key that produces a character (letters, digits, punctuation, space)
    Char(char),
    /// A key from the symbolic table
    Named(Key),
    /// A key the backend could not map; carries its native identifier,
    /// which is folded into the range starting at [`UNKNOWN_BASE`]
    Unknown(u32),
}

/// A code returned by `read_key`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualKey(i32);

impl VirtualKey {
    pub const RESIZE: VirtualKey = VirtualKey(-RESIZE);
    pub const TIMEOUT: VirtualKey = VirtualKey(-TIMEOUT);
    pub const QUIT: VirtualKey = VirtualKey(-QUIT);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Inserted text
    pub fn text(c: char) -> Self {
        // char::MAX is 0x10FFFF, always positive as i32.
        Self(c as i32)
    }

    /// Key-down of a symbolic key with modifiers.
    ///
    /// Returns `None` for function keys outside the supported range.
    pub fn key(key: Key, mods: Modifiers) -> Option<Self> {
        key.code().map(|code| Self(-(code | mods.bits())))
    }

    /// Ctrl+letter (or Ctrl+space) as an ASCII control key.
    ///
    /// The letter is case-insensitive. Returns `None` for anything that has no
    /// control byte of this shape.
    pub fn ctrl_letter(letter: char, shift: bool) -> Option<Self> {
        let upper = letter.to_ascii_uppercase();
        let base = match upper {
            ' ' => 0,
            'A'..='Z' => (upper as i32) & 0x1f,
            _ => return None,
        };
        let shift = if shift { SHIFT } else { 0 };
        Some(Self(-(CTRL_ASCII | base | shift)))
    }

    pub fn is_text(self) -> bool {
        self.0 > 0
    }

    /// The inserted character, for text codes
    pub fn as_char(self) -> Option<char> {
        if self.is_text() {
            char::from_u32(self.0.unsigned_abs())
        } else {
            None
        }
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self.0.wrapping_neg(), RESIZE | TIMEOUT | QUIT)
    }

    /// The symbolic key of a key-down code, ignoring modifiers
    pub fn symbolic_key(self) -> Option<Key> {
        let magnitude = self.0.wrapping_neg();
        if magnitude <= 0 || self.is_sentinel() || magnitude & CTRL_ASCII != 0 {
            return None;
        }
        Key::from_code(magnitude & KEY_MASK)
    }

    /// Modifiers of a key-down code; text and sentinels have none
    pub fn modifiers(self) -> Modifiers {
        let magnitude = self.0.wrapping_neg();
        if magnitude <= 0 || self.is_sentinel() {
            return Modifiers::NONE;
        }
        Modifiers {
            shift: magnitude & SHIFT != 0,
            ctrl: magnitude & (CTRL | CTRL_ASCII) != 0,
        }
    }

    /// Canonical name, see [`key_name`]
    pub fn name(self) -> String {
        key_name(self.0)
    }

    /// Inverse of [`key_name`] for names it produces from key-down codes
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "KEY_RESIZE" => return Some(Self::RESIZE),
            "KEY_TIMEOUT" => return Some(Self::TIMEOUT),
            "KEY_QUIT" => return Some(Self::QUIT),
            _ => {}
        }

        let rest = name.strip_prefix("KEY_")?;
        if let Some(raw) = rest.strip_prefix("UNKNOWN_") {
            return raw.parse::<i32>().ok().map(|n| Self(n.wrapping_neg()));
        }

        let (shift, rest) = match rest.strip_prefix('S') {
            Some(r) => (true, r),
            None => (false, rest),
        };
        let (ctrl, rest) = match rest.strip_prefix('^') {
            Some(r) => (true, r),
            None => (false, rest),
        };

        if ctrl {
            let mut chars = rest.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                let code = (c as u32).checked_sub(64)?;
                if code > 0x3f {
                    return None;
                }
                let shift = if shift { SHIFT } else { 0 };
                // code <= 0x3f, fits.
                return Some(Self(-(CTRL_ASCII | code as i32 | shift)));
            }
        }

        Self::key(Key::from_name(rest)?, Modifiers { shift, ctrl })
    }
}

impl From<VirtualKey> for i32 {
    fn from(key: VirtualKey) -> i32 {
        key.0
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Decode a virtual key code into its canonical name.
///
/// Total over `i32`: anything that is not a recognisable key-down code,
/// including text codes, decodes as `KEY_UNKNOWN_<-code>`.
pub fn key_name(code: i32) -> String {
    let magnitude = code.wrapping_neg();
    match magnitude {
        RESIZE => return "KEY_RESIZE".to_string(),
        TIMEOUT => return "KEY_TIMEOUT".to_string(),
        QUIT => return "KEY_QUIT".to_string(),
        _ => {}
    }

    let unknown = || format!("KEY_UNKNOWN_{}", magnitude);
    if magnitude <= 0 {
        return unknown();
    }

    let key = magnitude & KEY_MASK;
    let shift = if magnitude & SHIFT != 0 { "S" } else { "" };

    if magnitude & CTRL_ASCII != 0 {
        return match u32::try_from(key + 64).ok().and_then(char::from_u32) {
            Some(letter) if key <= 0x3f => format!("KEY_{}^{}", shift, letter),
            _ => unknown(),
        };
    }

    let ctrl = if magnitude & CTRL != 0 { "^" } else { "" };
    match Key::from_code(key) {
        Some(key) => format!("KEY_{}{}{}", shift, ctrl, key.name()),
        None => unknown(),
    }
}

/// Translate a native key-down into a virtual key.
///
/// Printable ASCII without Ctrl is dropped: the backend reports it again as a
/// text event. Ctrl+letter and Ctrl+space become [`CTRL_ASCII`] codes so the
/// caller sees the same shape whether the native library reported the key or
/// the resulting control byte.
pub fn translate_key_down(key: NativeKey, mods: Modifiers) -> Option<VirtualKey> {
    match key {
        NativeKey::Char(c) if c == ' ' || c.is_ascii_graphic() => {
            if !mods.ctrl {
                return None;
            }
            VirtualKey::ctrl_letter(c, mods.shift)
        }
        NativeKey::Char('\0') => VirtualKey::ctrl_letter(' ', mods.shift),
        NativeKey::Char(c) if c.is_ascii_control() => {
            // Some libraries report Ctrl+A as the byte 0x01.
            let letter = char::from_u32(c as u32 + 64)?;
            VirtualKey::ctrl_letter(letter, mods.shift)
        }
        NativeKey::Char(_) => None,
        NativeKey::Named(key) => VirtualKey::key(key, mods),
        NativeKey::Unknown(raw) => {
            // raw % UNKNOWN_SPAN < 0xE000, fits.
            let base = UNKNOWN_BASE + (raw % UNKNOWN_SPAN) as i32;
            Some(VirtualKey(-(base | mods.bits())))
        }
    }
}

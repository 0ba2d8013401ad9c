//! # Key Events
//!
//! One `KeyEvent` per logical keypress. Input is byte-oriented: a byte is
//! either a control character or printable, and a handful of multi-byte
//! escape sequences collapse into a single `Escape` event.
//!
//! Decoding of the escape sequences themselves lives in `tui::event`.

use std::fmt;

/// Lead byte of every escape sequence.
pub const ESC: u8 = 0x1b;

/// `DEL`, the only control character above the C0 range.
pub const DEL: u8 = 0x7f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Printable(u8),
    Control(u8),
    Escape(EscapeKey),
}

/// Keys the terminal reports as an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapeKey {
    ArrowUp,
    ArrowDown,
    ArrowRight,
    ArrowLeft,
    Home,
    End,
    Delete,
    PageUp,
    PageDown,
}

/// True for 0x00–0x1F and 0x7F.
pub const fn is_control(byte: u8) -> bool {
    byte < 0x20 || byte == DEL
}

impl KeyEvent {
    /// Classifies a single byte. Never yields `Escape`.
    pub const fn from_byte(byte: u8) -> Self {
        if is_control(byte) {
            KeyEvent::Control(byte)
        } else {
            KeyEvent::Printable(byte)
        }
    }

    /// The bare escape key, also the fallback for an abandoned sequence.
    pub const fn bare_escape() -> Self {
        KeyEvent::Control(ESC)
    }
}

/// Inspector line text: `17` for control bytes, `97 ('a')` for printable
/// ASCII, the key name for escape keys.
impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEvent::Control(byte) => write!(f, "{byte}"),
            KeyEvent::Printable(byte) if byte.is_ascii() => {
                write!(f, "{byte} ('{}')", *byte as char)
            }
            KeyEvent::Printable(byte) => write!(f, "{byte}"),
            KeyEvent::Escape(key) => write!(f, "{key:?}"),
        }
    }
}

//! Input events consumed by the editor.
//!
//! Events are front-end agnostic: a browser host, a native window or a
//! replayed script all translate their native events into these types.
//! Pointer and wheel positions are in screen coordinates relative to the
//! canvas' top-left corner.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Control, or Command/Meta on macOS
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl_shift() -> Self {
        Self {
            ctrl: true,
            shift: true,
            alt: false,
        }
    }

    /// True when no modifier is held.
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.shift && !self.alt
    }
}

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// A pointer (mouse, pen, touch) event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Down, x, y)
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Move, x, y)
    }

    pub fn up(x: f32, y: f32) -> Self {
        Self::new(PointerKind::Up, x, y)
    }

    fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A mouse wheel / trackpad scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    /// Vertical scroll amount; negative scrolls up
    pub delta_y: f32,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Letter(char),
    Digit(u8),
    Delete,
    Backspace,
    Escape,
    Enter,
    Space,
    Equal,
    Minus,
}

impl Key {
    /// Parse a key name such as `"z"`, `"Z"`, `"7"`, `"Delete"` or `"Escape"`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return match c {
                'a'..='z' | 'A'..='Z' => Some(Key::Letter(c.to_ascii_uppercase())),
                '0'..='9' => Some(Key::Digit(c as u8 - b'0')),
                '=' | '+' => Some(Key::Equal),
                '-' | '_' => Some(Key::Minus),
                ' ' => Some(Key::Space),
                _ => None,
            };
        }

        match name.to_ascii_lowercase().as_str() {
            "delete" | "del" => Some(Key::Delete),
            "backspace" => Some(Key::Backspace),
            "escape" | "esc" => Some(Key::Escape),
            "enter" | "return" => Some(Key::Enter),
            "space" => Some(Key::Space),
            "equal" | "plus" => Some(Key::Equal),
            "minus" => Some(Key::Minus),
            _ => None,
        }
    }

    /// Display name; `Key::parse(key.name())` returns the same key.
    pub fn name(&self) -> String {
        match self {
            Key::Letter(c) => c.to_string(),
            Key::Digit(d) => d.to_string(),
            Key::Delete => "Delete".into(),
            Key::Backspace => "Backspace".into(),
            Key::Escape => "Escape".into(),
            Key::Enter => "Enter".into(),
            Key::Space => "Space".into(),
            Key::Equal => "=".into(),
            Key::Minus => "-".into(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Key::parse(&value).ok_or_else(|| format!("unknown key '{}'", value))
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.name()
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

//! Semantic key labels.
//!
//! A label is what a key *means* independently of where it came from: the
//! text printed on an on-screen button, or the meaning of a physical keycode.
//! Labels are the common currency between the lookup tables, the modifier
//! latch and the dispatch primitives.
//!
//! Named keys and modifiers round-trip through the exact strings shown on the
//! on-screen buttons (`"Enter"`, `"Esc"`, `"PgUp"`, `"Win"`, ...), so a layout
//! can be described by button text alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hid::ModifierMask;

/// Error type for label parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeymapError {
    #[error("unknown key name: {0:?}")]
    UnknownKeyName(String),
    #[error("unknown modifier name: {0:?}")]
    UnknownModifier(String),
    #[error("empty key label")]
    EmptyLabel,
}

/// A non-printing key addressed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Enter,
    Esc,
    Back,
    Tab,
    Space,
    Right,
    Left,
    Down,
    Up,
    Ins,
    Del,
    PgUp,
    PgDn,
    PrintScreen,
    Menu,
    ScrollLock,
    Pause,
    Home,
    End,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
}

impl NamedKey {
    /// Every named key, in declaration order.
    pub const ALL: [NamedKey; 31] = [
        NamedKey::Enter,
        NamedKey::Esc,
        NamedKey::Back,
        NamedKey::Tab,
        NamedKey::Space,
        NamedKey::Right,
        NamedKey::Left,
        NamedKey::Down,
        NamedKey::Up,
        NamedKey::Ins,
        NamedKey::Del,
        NamedKey::PgUp,
        NamedKey::PgDn,
        NamedKey::PrintScreen,
        NamedKey::Menu,
        NamedKey::ScrollLock,
        NamedKey::Pause,
        NamedKey::Home,
        NamedKey::End,
        NamedKey::F1,
        NamedKey::F2,
        NamedKey::F3,
        NamedKey::F4,
        NamedKey::F5,
        NamedKey::F6,
        NamedKey::F7,
        NamedKey::F8,
        NamedKey::F9,
        NamedKey::F10,
        NamedKey::F11,
        NamedKey::F12,
    ];

    /// Returns the button text for this key.
    pub fn name(self) -> &'static str {
        match self {
            NamedKey::Enter => "Enter",
            NamedKey::Esc => "Esc",
            NamedKey::Back => "Back",
            NamedKey::Tab => "Tab",
            NamedKey::Space => "Space",
            NamedKey::Right => "Right",
            NamedKey::Left => "Left",
            NamedKey::Down => "Down",
            NamedKey::Up => "Up",
            NamedKey::Ins => "Ins",
            NamedKey::Del => "Del",
            NamedKey::PgUp => "PgUp",
            NamedKey::PgDn => "PgDn",
            NamedKey::PrintScreen => "PRINTSCREEN",
            NamedKey::Menu => "MENU",
            NamedKey::ScrollLock => "SCROLLLOCK",
            NamedKey::Pause => "PAUSE",
            NamedKey::Home => "HOME",
            NamedKey::End => "END",
            NamedKey::F1 => "F1",
            NamedKey::F2 => "F2",
            NamedKey::F3 => "F3",
            NamedKey::F4 => "F4",
            NamedKey::F5 => "F5",
            NamedKey::F6 => "F6",
            NamedKey::F7 => "F7",
            NamedKey::F8 => "F8",
            NamedKey::F9 => "F9",
            NamedKey::F10 => "F10",
            NamedKey::F11 => "F11",
            NamedKey::F12 => "F12",
        }
    }

    /// Returns function key `F<n>` for `n` in `1..=12`.
    pub fn function(n: u32) -> Option<NamedKey> {
        match n {
            1..=12 => Some(NamedKey::ALL[(n - 1) as usize + 19]),
            _ => None,
        }
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NamedKey {
    type Err = KeymapError;

    /// Parses the exact button text. Matching is case-sensitive because the
    /// button texts themselves mix `"PgUp"` and `"HOME"` styles.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedKey::ALL
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| KeymapError::UnknownKeyName(s.to_string()))
    }
}

/// An on-screen modifier button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKey {
    Ctrl,
    Shift,
    Alt,
    /// The Windows / GUI key.
    Win,
}

impl ModifierKey {
    /// Returns the button text for this modifier.
    pub fn name(self) -> &'static str {
        match self {
            ModifierKey::Ctrl => "Ctrl",
            ModifierKey::Shift => "Shift",
            ModifierKey::Alt => "Alt",
            ModifierKey::Win => "Win",
        }
    }

    /// Left-hand modifier bit this button presses.
    pub fn mask(self) -> ModifierMask {
        match self {
            ModifierKey::Ctrl => ModifierMask::LEFT_CTRL,
            ModifierKey::Shift => ModifierMask::LEFT_SHIFT,
            ModifierKey::Alt => ModifierMask::LEFT_ALT,
            ModifierKey::Win => ModifierMask::LEFT_GUI,
        }
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModifierKey {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ctrl" => Ok(ModifierKey::Ctrl),
            "Shift" => Ok(ModifierKey::Shift),
            "Alt" => Ok(ModifierKey::Alt),
            "Win" => Ok(ModifierKey::Win),
            other => Err(KeymapError::UnknownModifier(other.to_string())),
        }
    }
}

/// What a key press means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyLabel {
    /// A printable character, sent through the character tables.
    Char(char),
    /// A non-printing key, sent through the scancode table.
    Named(NamedKey),
    /// A modifier, latched rather than sent.
    Modifier(ModifierKey),
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLabel::Char(c) => write!(f, "{c}"),
            KeyLabel::Named(k) => fmt::Display::fmt(k, f),
            KeyLabel::Modifier(m) => fmt::Display::fmt(m, f),
        }
    }
}

impl FromStr for KeyLabel {
    type Err = KeymapError;

    /// Interprets button text: modifier names first, then named keys, then a
    /// single character.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(m) = s.parse::<ModifierKey>() {
            return Ok(KeyLabel::Modifier(m));
        }
        if let Ok(k) = s.parse::<NamedKey>() {
            return Ok(KeyLabel::Named(k));
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(KeyLabel::Char(c)),
            (None, _) => Err(KeymapError::EmptyLabel),
            (Some(_), Some(_)) => Err(KeymapError::UnknownKeyName(s.to_string())),
        }
    }
}

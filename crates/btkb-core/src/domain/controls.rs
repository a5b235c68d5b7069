//! On-screen control layouts.
//!
//! Each on-screen button is a [`ControlBinding`]: a stable [`ControlId`], a
//! script-friendly name, the [`KeyLabel`] printed on it and the
//! [`ControlKind`] that decides how a press is handled. Layouts are built
//! once per session from the chosen [`ScreenProfile`] and never change.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::keymap::labels::{KeyLabel, ModifierKey, NamedKey};

/// Stable identifier of an on-screen control within a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlId(pub u16);

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a control behaves while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    /// Types a character; repeats at the slow cadence.
    Regular,
    /// Sends a named key; repeats at the fast cadence.
    Special,
    /// Latches a modifier; never repeats.
    Modifier,
}

/// One on-screen button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBinding {
    pub id: ControlId,
    pub name: &'static str,
    pub label: KeyLabel,
    pub kind: ControlKind,
}

/// The screen a keyboard layout was designed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScreenProfile {
    #[default]
    #[serde(rename = "1280x720")]
    Hd,
    #[serde(rename = "2340x1080")]
    Tall,
    #[serde(rename = "1280x720_large")]
    HdLarge,
    /// A physical keyboard attached over USB OTG; no on-screen buttons.
    #[serde(rename = "otg_keyboard")]
    OtgKeyboard,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown screen profile: {0:?}")]
pub struct UnknownScreenProfile(pub String);

impl ScreenProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            ScreenProfile::Hd => "1280x720",
            ScreenProfile::Tall => "2340x1080",
            ScreenProfile::HdLarge => "1280x720_large",
            ScreenProfile::OtgKeyboard => "otg_keyboard",
        }
    }
}

impl fmt::Display for ScreenProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenProfile {
    type Err = UnknownScreenProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1280x720" => Ok(ScreenProfile::Hd),
            "2340x1080" => Ok(ScreenProfile::Tall),
            "1280x720_large" => Ok(ScreenProfile::HdLarge),
            "otg_keyboard" => Ok(ScreenProfile::OtgKeyboard),
            other => Err(UnknownScreenProfile(other.to_string())),
        }
    }
}

use ControlKind::{Modifier, Regular, Special};

const fn ch(c: char) -> KeyLabel {
    KeyLabel::Char(c)
}

const fn named(k: NamedKey) -> KeyLabel {
    KeyLabel::Named(k)
}

const fn modifier(m: ModifierKey) -> KeyLabel {
    KeyLabel::Modifier(m)
}

/// Buttons shared by every touch-screen profile, in on-screen order.
const KEYBOARD_CONTROLS: &[(&str, KeyLabel, ControlKind)] = &[
    ("comma", ch(','), Regular),
    ("char_z", ch('z'), Regular),
    ("char_x", ch('x'), Regular),
    ("char_c", ch('c'), Regular),
    ("char_v", ch('v'), Regular),
    ("char_b", ch('b'), Regular),
    ("char_n", ch('n'), Regular),
    ("char_m", ch('m'), Regular),
    ("period", ch('.'), Regular),
    ("char_a", ch('a'), Regular),
    ("char_s", ch('s'), Regular),
    ("char_d", ch('d'), Regular),
    ("char_f", ch('f'), Regular),
    ("char_g", ch('g'), Regular),
    ("char_h", ch('h'), Regular),
    ("char_j", ch('j'), Regular),
    ("char_k", ch('k'), Regular),
    ("char_l", ch('l'), Regular),
    ("char_q", ch('q'), Regular),
    ("char_w", ch('w'), Regular),
    ("char_e", ch('e'), Regular),
    ("char_r", ch('r'), Regular),
    ("char_t", ch('t'), Regular),
    ("char_y", ch('y'), Regular),
    ("char_u", ch('u'), Regular),
    ("char_i", ch('i'), Regular),
    ("char_o", ch('o'), Regular),
    ("char_p", ch('p'), Regular),
    ("char_1", ch('1'), Regular),
    ("char_2", ch('2'), Regular),
    ("char_3", ch('3'), Regular),
    ("char_4", ch('4'), Regular),
    ("char_5", ch('5'), Regular),
    ("char_6", ch('6'), Regular),
    ("char_7", ch('7'), Regular),
    ("char_8", ch('8'), Regular),
    ("char_9", ch('9'), Regular),
    ("char_0", ch('0'), Regular),
    ("question", ch('?'), Regular),
    ("backquote", ch('`'), Regular),
    ("slash", ch('/'), Regular),
    ("semicolon", ch(';'), Regular),
    ("single_quote", ch('\''), Regular),
    ("left_square", ch('['), Regular),
    ("right_square", ch(']'), Regular),
    ("backslash", ch('\\'), Regular),
    ("hyphen", ch('-'), Regular),
    ("equal", ch('='), Regular),
    ("space", named(NamedKey::Space), Special),
    ("enter", named(NamedKey::Enter), Special),
    ("left", named(NamedKey::Left), Special),
    ("right", named(NamedKey::Right), Special),
    ("down", named(NamedKey::Down), Special),
    ("up", named(NamedKey::Up), Special),
    ("tab", named(NamedKey::Tab), Special),
    ("back", named(NamedKey::Back), Special),
    ("esc", named(NamedKey::Esc), Special),
    ("ctrl", modifier(ModifierKey::Ctrl), Modifier),
    ("window", modifier(ModifierKey::Win), Modifier),
    ("alt", modifier(ModifierKey::Alt), Modifier),
    ("shift", modifier(ModifierKey::Shift), Modifier),
];

/// The controls available on one screen profile.
#[derive(Debug, Clone)]
pub struct ControlLayout {
    profile: ScreenProfile,
    controls: Vec<ControlBinding>,
    by_name: HashMap<&'static str, ControlId>,
}

impl ControlLayout {
    /// Builds the layout for `profile`. Ids are assigned in on-screen order
    /// starting at 0.
    pub fn for_profile(profile: ScreenProfile) -> Self {
        let table: &[(&str, KeyLabel, ControlKind)] = match profile {
            ScreenProfile::Hd | ScreenProfile::Tall | ScreenProfile::HdLarge => KEYBOARD_CONTROLS,
            ScreenProfile::OtgKeyboard => &[],
        };

        let controls: Vec<ControlBinding> = table
            .iter()
            .enumerate()
            .map(|(i, &(name, label, kind))| ControlBinding {
                id: ControlId(i as u16),
                name,
                label,
                kind,
            })
            .collect();
        let by_name = controls.iter().map(|c| (c.name, c.id)).collect();

        debug!(%profile, controls = controls.len(), "built control layout");
        Self {
            profile,
            controls,
            by_name,
        }
    }

    pub fn profile(&self) -> ScreenProfile {
        self.profile
    }

    /// Looks up a control by id.
    pub fn get(&self, id: ControlId) -> Option<&ControlBinding> {
        self.controls.get(id.0 as usize)
    }

    /// Looks up a control by its script name (`"char_a"`, `"enter"`, ...).
    pub fn find(&self, name: &str) -> Option<&ControlBinding> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlBinding> {
        self.controls.iter()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

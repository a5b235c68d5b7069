//! Key lookup tables.
//!
//! Input arrives either as an on-screen control (see [`crate::domain`]) or as
//! an Android physical keycode. Both resolve to a [`KeyLabel`], and labels
//! resolve to HID usage IDs plus an implied modifier byte.

pub mod android;
pub mod hid;
pub mod labels;
pub mod usage;

pub use hid::{HidUsage, ModifierMask};
pub use labels::{KeyLabel, KeymapError, ModifierKey, NamedKey};

/// Entry point for every table lookup.
pub struct KeyMapper;

impl KeyMapper {
    /// Resolves an Android physical keycode to a label.
    ///
    /// Returns `None` if the keycode is in neither the regular nor the special
    /// table.
    pub fn physical_to_label(keycode: u32) -> Option<KeyLabel> {
        android::keycode_to_label(keycode)
    }

    /// Resolves a character to the modifier byte and usage that type it.
    pub fn char_usage(c: char) -> Option<(ModifierMask, HidUsage)> {
        usage::char_usage(c)
    }

    /// Resolves a named key through the scancode table.
    pub fn named_usage(key: NamedKey) -> HidUsage {
        usage::named_usage(key)
    }

    /// Resolves any non-modifier label to its usage, ignoring the implied
    /// Shift of shifted characters.
    ///
    /// Used where the caller supplies the modifier byte itself (the physical
    /// modifier branches and the chord latch).
    pub fn label_usage(label: KeyLabel) -> Option<HidUsage> {
        match label {
            KeyLabel::Char(c) => usage::char_usage(c).map(|(_, u)| u),
            KeyLabel::Named(k) => Some(usage::named_usage(k)),
            KeyLabel::Modifier(_) => None,
        }
    }
}

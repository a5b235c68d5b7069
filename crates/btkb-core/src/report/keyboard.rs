//! Boot-protocol keyboard report.
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: modifier bitfield (see ModifierMask)
//! Byte 1: reserved, always 0x00
//! Byte 2-7: up to six usage IDs, zero for empty slots
//! ```
//!
//! The engine only ever presses one key at a time, so reports produced here
//! carry at most one non-zero key slot.

use std::fmt;

use crate::keymap::hid::{HidUsage, ModifierMask};

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// A single HID keyboard input report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct KeyboardReport {
    pub modifier: ModifierMask,
    pub keys: [u8; 6],
}

impl KeyboardReport {
    /// All keys and modifiers released.
    pub const fn released() -> Self {
        Self {
            modifier: ModifierMask::NONE,
            keys: [0; 6],
        }
    }

    /// `modifier` held and `usage` pressed in the first key slot.
    pub fn key_down(modifier: ModifierMask, usage: HidUsage) -> Self {
        let mut keys = [0; 6];
        keys[0] = usage.as_u8();
        Self { modifier, keys }
    }

    /// `modifier` held with every key slot empty.
    pub fn keys_up(modifier: ModifierMask) -> Self {
        Self {
            modifier,
            keys: [0; 6],
        }
    }

    /// Returns `true` if no key slot is occupied.
    pub fn has_no_keys(&self) -> bool {
        self.keys.iter().all(|&k| k == 0)
    }

    /// Serialises into the 8-byte wire form.
    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_SIZE] {
        let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
        buf[0] = self.modifier.bits();
        buf[2..].copy_from_slice(&self.keys);
        buf
    }
}

impl fmt::Display for KeyboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.to_bytes();
        write!(
            f,
            "{:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X} {:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_down_places_usage_in_first_slot() {
        // Act
        let report = KeyboardReport::key_down(ModifierMask::LEFT_SHIFT, HidUsage::A);

        // Assert
        assert_eq!(report.to_bytes(), [0x02, 0x00, 0x04, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_keys_up_keeps_modifier_and_clears_slots() {
        let report = KeyboardReport::keys_up(ModifierMask::LEFT_CTRL);
        assert_eq!(report.to_bytes(), [0x01, 0, 0, 0, 0, 0, 0, 0]);
        assert!(report.has_no_keys());
    }

    #[test]
    fn test_released_is_all_zero() {
        assert_eq!(KeyboardReport::released().to_bytes(), [0u8; 8]);
        assert_eq!(KeyboardReport::released(), KeyboardReport::keys_up(ModifierMask::NONE));
    }

    #[test]
    fn test_display_is_hex_dump() {
        let report = KeyboardReport::key_down(ModifierMask::NONE, HidUsage::Enter);
        assert_eq!(report.to_string(), "00 00 28 00 00 00 00 00");
    }
}

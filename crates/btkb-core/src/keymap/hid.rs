//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page) and the boot-protocol
//! modifier bitfield.
//!
//! Every key the engine can put on the wire is expressed as a [`HidUsage`].
//! Platform keycodes and on-screen labels are translated to usages at the
//! edge; nothing past that point deals with platform codes.
//!
//! Reference: USB HID Usage Tables 1.12, Section 10.
//!
//! # Usage IDs are positions, not characters
//!
//! | Key          | Usage ID |
//! |--------------|----------|
//! | Letter A     | 0x04     |
//! | Digit 1      | 0x1E     |
//! | Enter        | 0x28     |
//! | F1           | 0x3A     |
//!
//! Lowercase `a` and uppercase `A` share usage 0x04; the host decides which
//! character to produce from the modifier byte that travels with it. That is
//! why the shifted character table in [`super::usage`] returns the same usage
//! IDs as the base table, paired with [`ModifierMask::LEFT_SHIFT`].

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// USB HID Usage ID for a key on the keyboard/keypad page.
///
/// The discriminant of each variant is its usage ID. [`HidUsage::None`]
/// (0x00) is the "no key" value used in empty report slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HidUsage {
    /// Empty key slot.
    None = 0x00,

    // Letters
    A = 0x04,
    B = 0x05,
    C = 0x06,
    D = 0x07,
    E = 0x08,
    F = 0x09,
    G = 0x0A,
    H = 0x0B,
    I = 0x0C,
    J = 0x0D,
    K = 0x0E,
    L = 0x0F,
    M = 0x10,
    N = 0x11,
    O = 0x12,
    P = 0x13,
    Q = 0x14,
    R = 0x15,
    S = 0x16,
    T = 0x17,
    U = 0x18,
    V = 0x19,
    W = 0x1A,
    X = 0x1B,
    Y = 0x1C,
    Z = 0x1D,

    // Top-row digits
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    LeftBracket = 0x2F,
    RightBracket = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Grave = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,
    CapsLock = 0x39,

    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    Right = 0x4F,
    Left = 0x50,
    Down = 0x51,
    Up = 0x52,

    /// Keyboard Menu (0x76), not the Application key (0x65).
    Menu = 0x76,
}

impl HidUsage {
    /// Returns the raw usage ID as it appears in a report key slot.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for HidUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}(0x{:02X})", self, self.as_u8())
    }
}

/// Modifier byte of a boot-protocol keyboard report.
///
/// Bit layout follows the HID boot keyboard: bit 0 Left Ctrl, bit 1 Left
/// Shift, bit 2 Left Alt, bit 3 Left GUI, bits 4–7 the right-hand
/// counterparts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModifierMask(pub u8);

impl ModifierMask {
    pub const NONE: ModifierMask = ModifierMask(0);
    pub const LEFT_CTRL: ModifierMask = ModifierMask(1 << 0);
    pub const LEFT_SHIFT: ModifierMask = ModifierMask(1 << 1);
    pub const LEFT_ALT: ModifierMask = ModifierMask(1 << 2);
    /// Windows / Super / Command key.
    pub const LEFT_GUI: ModifierMask = ModifierMask(1 << 3);
    pub const RIGHT_CTRL: ModifierMask = ModifierMask(1 << 4);
    pub const RIGHT_SHIFT: ModifierMask = ModifierMask(1 << 5);
    pub const RIGHT_ALT: ModifierMask = ModifierMask(1 << 6);
    pub const RIGHT_GUI: ModifierMask = ModifierMask(1 << 7);

    /// Returns the raw modifier byte.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when no modifier bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` when every bit of `other` is also set in `self`.
    pub fn contains(self, other: ModifierMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ModifierMask {
    type Output = ModifierMask;

    fn bitor(self, rhs: ModifierMask) -> ModifierMask {
        ModifierMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModifierMask {
    fn bitor_assign(&mut self, rhs: ModifierMask) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_are_contiguous_from_0x04() {
        let letters = [
            HidUsage::A, HidUsage::B, HidUsage::C, HidUsage::D, HidUsage::E, HidUsage::F,
            HidUsage::G, HidUsage::H, HidUsage::I, HidUsage::J, HidUsage::K, HidUsage::L,
            HidUsage::M, HidUsage::N, HidUsage::O, HidUsage::P, HidUsage::Q, HidUsage::R,
            HidUsage::S, HidUsage::T, HidUsage::U, HidUsage::V, HidUsage::W, HidUsage::X,
            HidUsage::Y, HidUsage::Z,
        ];
        for (i, letter) in letters.iter().enumerate() {
            assert_eq!(letter.as_u8(), 0x04 + i as u8, "{letter:?} is out of place");
        }
    }

    #[test]
    fn test_control_and_navigation_usages_match_hid_tables() {
        assert_eq!(HidUsage::Enter.as_u8(), 40);
        assert_eq!(HidUsage::Escape.as_u8(), 41);
        assert_eq!(HidUsage::Backspace.as_u8(), 42);
        assert_eq!(HidUsage::Tab.as_u8(), 43);
        assert_eq!(HidUsage::Space.as_u8(), 44);
        assert_eq!(HidUsage::Right.as_u8(), 79);
        assert_eq!(HidUsage::Up.as_u8(), 82);
        assert_eq!(HidUsage::Delete.as_u8(), 76);
        assert_eq!(HidUsage::Menu.as_u8(), 118);
    }

    #[test]
    fn test_modifier_mask_bits_follow_boot_protocol_layout() {
        assert_eq!(ModifierMask::LEFT_CTRL.bits(), 0x01);
        assert_eq!(ModifierMask::LEFT_SHIFT.bits(), 0x02);
        assert_eq!(ModifierMask::LEFT_ALT.bits(), 0x04);
        assert_eq!(ModifierMask::LEFT_GUI.bits(), 0x08);
        assert_eq!(ModifierMask::RIGHT_GUI.bits(), 0x80);
    }

    #[test]
    fn test_modifier_mask_combines_with_bitor() {
        // Arrange
        let mut mask = ModifierMask::LEFT_CTRL | ModifierMask::LEFT_ALT;

        // Act
        mask |= ModifierMask::LEFT_SHIFT;

        // Assert
        assert_eq!(mask.bits(), 0x07);
        assert!(mask.contains(ModifierMask::LEFT_ALT));
        assert!(!mask.contains(ModifierMask::LEFT_GUI));
        assert!(!mask.is_empty());
        assert!(ModifierMask::NONE.is_empty());
    }

    #[test]
    fn test_display_includes_hex_usage() {
        assert_eq!(HidUsage::Enter.to_string(), "Enter(0x28)");
    }
}

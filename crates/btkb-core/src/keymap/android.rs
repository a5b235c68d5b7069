//! Android `KeyEvent` keycodes and meta-state flags.
//!
//! Physical keyboards attached to the phone report `KeyEvent.KEYCODE_*`
//! integers together with a meta-state bitfield. This module resolves those
//! keycodes to [`KeyLabel`]s through two disjoint tables:
//!
//! - the **regular** table, keycodes that type a printable character;
//! - the **special** table, keycodes for named non-printing keys.
//!
//! A keycode present in neither table is unmapped and left to the platform.

use super::labels::{KeyLabel, NamedKey};

/// Android keycode constants used by the lookup tables.
pub mod keycode {
    pub const DPAD_UP: u32 = 19;
    pub const DPAD_DOWN: u32 = 20;
    pub const DPAD_LEFT: u32 = 21;
    pub const DPAD_RIGHT: u32 = 22;

    pub const DIGIT_0: u32 = 7;
    pub const DIGIT_9: u32 = 16;
    pub const A: u32 = 29;
    pub const Z: u32 = 54;

    pub const COMMA: u32 = 55;
    pub const PERIOD: u32 = 56;
    pub const TAB: u32 = 61;
    pub const SPACE: u32 = 62;
    pub const ENTER: u32 = 66;
    /// Backspace. Android calls it `DEL`.
    pub const DEL: u32 = 67;
    pub const GRAVE: u32 = 68;
    pub const MINUS: u32 = 69;
    pub const EQUALS: u32 = 70;
    pub const LEFT_BRACKET: u32 = 71;
    pub const RIGHT_BRACKET: u32 = 72;
    pub const BACKSLASH: u32 = 73;
    pub const SEMICOLON: u32 = 74;
    pub const APOSTROPHE: u32 = 75;
    pub const SLASH: u32 = 76;

    pub const PAGE_UP: u32 = 92;
    pub const PAGE_DOWN: u32 = 93;
    pub const ESCAPE: u32 = 111;
    /// Delete-forward, the key labelled `Del` on a PC keyboard.
    pub const FORWARD_DEL: u32 = 112;
    pub const SCROLL_LOCK: u32 = 116;
    pub const SYSRQ: u32 = 120;
    pub const BREAK: u32 = 121;
    pub const MOVE_HOME: u32 = 122;
    pub const MOVE_END: u32 = 123;
    pub const INSERT: u32 = 124;
    pub const F1: u32 = 131;
    pub const F12: u32 = 142;
    pub const MENU: u32 = 82;
}

/// Meta-state bitfield carried by a physical key event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetaState(pub u32);

impl MetaState {
    pub const NONE: MetaState = MetaState(0);
    pub const SHIFT_ON: MetaState = MetaState(0x1);
    pub const ALT_ON: MetaState = MetaState(0x2);
    pub const SYM_ON: MetaState = MetaState(0x4);
    pub const CTRL_ON: MetaState = MetaState(0x1000);
    pub const META_ON: MetaState = MetaState(0x10000);

    pub fn shift(self) -> bool {
        self.0 & Self::SHIFT_ON.0 != 0
    }

    pub fn ctrl(self) -> bool {
        self.0 & Self::CTRL_ON.0 != 0
    }

    pub fn alt(self) -> bool {
        self.0 & Self::ALT_ON.0 != 0
    }

    /// Sym and Meta share one branch; both press the GUI modifier.
    pub fn sym_or_meta(self) -> bool {
        self.0 & (Self::SYM_ON.0 | Self::META_ON.0) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for MetaState {
    type Output = MetaState;

    fn bitor(self, rhs: MetaState) -> MetaState {
        MetaState(self.0 | rhs.0)
    }
}

/// Regular table: keycode → printable character.
pub fn regular_char(code: u32) -> Option<char> {
    use keycode::*;
    match code {
        DIGIT_0..=DIGIT_9 => char::from_digit(code - DIGIT_0, 10),
        A..=Z => char::from_u32('a' as u32 + (code - A)),
        COMMA => Some(','),
        PERIOD => Some('.'),
        GRAVE => Some('`'),
        MINUS => Some('-'),
        EQUALS => Some('='),
        LEFT_BRACKET => Some('['),
        RIGHT_BRACKET => Some(']'),
        BACKSLASH => Some('\\'),
        SEMICOLON => Some(';'),
        APOSTROPHE => Some('\''),
        SLASH => Some('/'),
        _ => None,
    }
}

/// Special table: keycode → named key.
pub fn special_key(code: u32) -> Option<NamedKey> {
    use keycode::*;
    let key = match code {
        SPACE => NamedKey::Space,
        ENTER => NamedKey::Enter,
        DEL => NamedKey::Back,
        TAB => NamedKey::Tab,
        ESCAPE => NamedKey::Esc,
        DPAD_UP => NamedKey::Up,
        DPAD_DOWN => NamedKey::Down,
        DPAD_LEFT => NamedKey::Left,
        DPAD_RIGHT => NamedKey::Right,
        FORWARD_DEL => NamedKey::Del,
        MOVE_HOME => NamedKey::Home,
        MOVE_END => NamedKey::End,
        PAGE_UP => NamedKey::PgUp,
        PAGE_DOWN => NamedKey::PgDn,
        INSERT => NamedKey::Ins,
        SYSRQ => NamedKey::PrintScreen,
        BREAK => NamedKey::Pause,
        SCROLL_LOCK => NamedKey::ScrollLock,
        MENU => NamedKey::Menu,
        F1..=F12 => return NamedKey::function(code - F1 + 1),
        _ => return None,
    };
    Some(key)
}

/// Resolves a keycode through the regular table, then the special table.
pub fn keycode_to_label(code: u32) -> Option<KeyLabel> {
    regular_char(code)
        .map(KeyLabel::Char)
        .or_else(|| special_key(code).map(KeyLabel::Named))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_and_digit_ranges_map_in_order() {
        assert_eq!(regular_char(keycode::A), Some('a'));
        assert_eq!(regular_char(keycode::Z), Some('z'));
        assert_eq!(regular_char(keycode::A + 16), Some('q'));
        assert_eq!(regular_char(keycode::DIGIT_0), Some('0'));
        assert_eq!(regular_char(keycode::DIGIT_9), Some('9'));
    }

    #[test]
    fn test_regular_and_special_tables_are_disjoint() {
        for code in 0..=300 {
            assert!(
                !(regular_char(code).is_some() && special_key(code).is_some()),
                "keycode {code} is in both tables"
            );
        }
    }

    #[test]
    fn test_space_enter_and_del_are_special_keys() {
        assert_eq!(special_key(keycode::SPACE), Some(NamedKey::Space));
        assert_eq!(special_key(keycode::ENTER), Some(NamedKey::Enter));
        assert_eq!(special_key(keycode::DEL), Some(NamedKey::Back));
    }

    #[test]
    fn test_function_keys_map_to_f1_through_f12() {
        assert_eq!(special_key(keycode::F1), Some(NamedKey::F1));
        assert_eq!(special_key(keycode::F1 + 4), Some(NamedKey::F5));
        assert_eq!(special_key(keycode::F12), Some(NamedKey::F12));
        assert_eq!(special_key(keycode::F12 + 1), None);
    }

    #[test]
    fn test_unmapped_keycode_resolves_to_nothing() {
        // KEYCODE_VOLUME_UP
        assert_eq!(keycode_to_label(24), None);
        assert_eq!(keycode_to_label(0), None);
    }

    #[test]
    fn test_meta_state_flags() {
        // Arrange
        let meta = MetaState::SHIFT_ON | MetaState::CTRL_ON;

        // Assert
        assert!(meta.shift());
        assert!(meta.ctrl());
        assert!(!meta.alt());
        assert!(!meta.sym_or_meta());
        assert!(MetaState::META_ON.sym_or_meta());
        assert!(MetaState::SYM_ON.sym_or_meta());
        assert!(MetaState::NONE.is_empty());
    }
}

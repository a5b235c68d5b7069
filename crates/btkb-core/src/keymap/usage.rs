//! Label → HID usage translation.
//!
//! Characters resolve through two tables that share usage IDs: the base table
//! (what the key types on its own) and the shifted table (what it types with
//! Shift held). A shifted hit carries [`ModifierMask::LEFT_SHIFT`] so the host
//! produces the right character.
//!
//! Named keys resolve through a separate scancode table. The tables assume a
//! US layout on the host side.

use super::hid::{HidUsage, ModifierMask};
use super::labels::NamedKey;

/// Usage for a character typed without Shift.
pub fn base_char_usage(c: char) -> Option<HidUsage> {
    use HidUsage::*;
    let usage = match c {
        'a' => A,
        'b' => B,
        'c' => C,
        'd' => D,
        'e' => E,
        'f' => F,
        'g' => G,
        'h' => H,
        'i' => I,
        'j' => J,
        'k' => K,
        'l' => L,
        'm' => M,
        'n' => N,
        'o' => O,
        'p' => P,
        'q' => Q,
        'r' => R,
        's' => S,
        't' => T,
        'u' => U,
        'v' => V,
        'w' => W,
        'x' => X,
        'y' => Y,
        'z' => Z,
        '1' => Digit1,
        '2' => Digit2,
        '3' => Digit3,
        '4' => Digit4,
        '5' => Digit5,
        '6' => Digit6,
        '7' => Digit7,
        '8' => Digit8,
        '9' => Digit9,
        '0' => Digit0,
        ' ' => Space,
        '-' => Minus,
        '=' => Equal,
        '[' => LeftBracket,
        ']' => RightBracket,
        '\\' => Backslash,
        ';' => Semicolon,
        '\'' => Quote,
        '`' => Grave,
        ',' => Comma,
        '.' => Period,
        '/' => Slash,
        _ => return Option::None,
    };
    Some(usage)
}

/// Usage for a character that needs Shift on a US layout.
pub fn shifted_char_usage(c: char) -> Option<HidUsage> {
    use HidUsage::*;
    if c.is_ascii_uppercase() {
        return base_char_usage(c.to_ascii_lowercase());
    }
    let usage = match c {
        '!' => Digit1,
        '@' => Digit2,
        '#' => Digit3,
        '$' => Digit4,
        '%' => Digit5,
        '^' => Digit6,
        '&' => Digit7,
        '*' => Digit8,
        '(' => Digit9,
        ')' => Digit0,
        '_' => Minus,
        '+' => Equal,
        '{' => LeftBracket,
        '}' => RightBracket,
        '|' => Backslash,
        ':' => Semicolon,
        '"' => Quote,
        '~' => Grave,
        '<' => Comma,
        '>' => Period,
        '?' => Slash,
        _ => return Option::None,
    };
    Some(usage)
}

/// Resolves a character to the modifier byte and usage that type it.
///
/// The base table wins over the shifted table. Returns `None` for characters
/// neither table knows (non-ASCII, control characters).
pub fn char_usage(c: char) -> Option<(ModifierMask, HidUsage)> {
    if let Some(usage) = base_char_usage(c) {
        return Some((ModifierMask::NONE, usage));
    }
    shifted_char_usage(c).map(|usage| (ModifierMask::LEFT_SHIFT, usage))
}

/// Scancode table for named keys.
pub fn named_usage(key: NamedKey) -> HidUsage {
    match key {
        NamedKey::Enter => HidUsage::Enter,
        NamedKey::Esc => HidUsage::Escape,
        NamedKey::Back => HidUsage::Backspace,
        NamedKey::Tab => HidUsage::Tab,
        NamedKey::Space => HidUsage::Space,
        NamedKey::Right => HidUsage::Right,
        NamedKey::Left => HidUsage::Left,
        NamedKey::Down => HidUsage::Down,
        NamedKey::Up => HidUsage::Up,
        NamedKey::Ins => HidUsage::Insert,
        NamedKey::Del => HidUsage::Delete,
        NamedKey::PgUp => HidUsage::PageUp,
        NamedKey::PgDn => HidUsage::PageDown,
        NamedKey::PrintScreen => HidUsage::PrintScreen,
        NamedKey::Menu => HidUsage::Menu,
        NamedKey::ScrollLock => HidUsage::ScrollLock,
        NamedKey::Pause => HidUsage::Pause,
        NamedKey::Home => HidUsage::Home,
        NamedKey::End => HidUsage::End,
        NamedKey::F1 => HidUsage::F1,
        NamedKey::F2 => HidUsage::F2,
        NamedKey::F3 => HidUsage::F3,
        NamedKey::F4 => HidUsage::F4,
        NamedKey::F5 => HidUsage::F5,
        NamedKey::F6 => HidUsage::F6,
        NamedKey::F7 => HidUsage::F7,
        NamedKey::F8 => HidUsage::F8,
        NamedKey::F9 => HidUsage::F9,
        NamedKey::F10 => HidUsage::F10,
        NamedKey::F11 => HidUsage::F11,
        NamedKey::F12 => HidUsage::F12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_letters_use_base_table_without_modifier() {
        assert_eq!(char_usage('a'), Some((ModifierMask::NONE, HidUsage::A)));
        assert_eq!(char_usage('z'), Some((ModifierMask::NONE, HidUsage::Z)));
    }

    #[test]
    fn test_uppercase_letters_share_usage_and_add_left_shift() {
        assert_eq!(char_usage('A'), Some((ModifierMask::LEFT_SHIFT, HidUsage::A)));
        assert_eq!(char_usage('Q'), Some((ModifierMask::LEFT_SHIFT, HidUsage::Q)));
    }

    #[test]
    fn test_shifted_symbols_share_the_unshifted_key() {
        let pairs = [
            ('1', '!'),
            ('2', '@'),
            ('0', ')'),
            ('-', '_'),
            ('=', '+'),
            ('[', '{'),
            (']', '}'),
            ('\\', '|'),
            (';', ':'),
            ('\'', '"'),
            ('`', '~'),
            (',', '<'),
            ('.', '>'),
            ('/', '?'),
        ];
        for (plain, shifted) in pairs {
            let (m1, u1) = char_usage(plain).expect("plain char must map");
            let (m2, u2) = char_usage(shifted).expect("shifted char must map");
            assert_eq!(u1, u2, "{plain:?} and {shifted:?} must share a key");
            assert_eq!(m1, ModifierMask::NONE);
            assert_eq!(m2, ModifierMask::LEFT_SHIFT);
        }
    }

    #[test]
    fn test_unmapped_characters_return_none() {
        for c in ['é', '\n', '\t', '€', '\u{0}'] {
            assert_eq!(char_usage(c), None, "{c:?} should not map");
        }
    }

    #[test]
    fn test_each_table_rejects_what_it_does_not_hold() {
        assert_eq!(base_char_usage('?'), Option::None);
        assert_eq!(base_char_usage('é'), Option::None);
        assert_eq!(shifted_char_usage(';'), Option::None);
        assert_eq!(shifted_char_usage('\u{7f}'), Option::None);
        assert_eq!(shifted_char_usage('Q'), Some(HidUsage::Q));
    }

    #[test]
    fn test_space_char_and_space_key_agree() {
        assert_eq!(char_usage(' ').map(|(_, u)| u), Some(named_usage(NamedKey::Space)));
    }

    #[test]
    fn test_named_usage_scancodes() {
        assert_eq!(named_usage(NamedKey::Enter).as_u8(), 40);
        assert_eq!(named_usage(NamedKey::Esc).as_u8(), 41);
        assert_eq!(named_usage(NamedKey::Back).as_u8(), 42);
        assert_eq!(named_usage(NamedKey::Del).as_u8(), 76);
        assert_eq!(named_usage(NamedKey::Ins).as_u8(), 73);
        assert_eq!(named_usage(NamedKey::PgDn).as_u8(), 78);
        assert_eq!(named_usage(NamedKey::Menu).as_u8(), 118);
        assert_eq!(named_usage(NamedKey::F12).as_u8(), 69);
        assert_eq!(named_usage(NamedKey::End).as_u8(), 77);
    }
}

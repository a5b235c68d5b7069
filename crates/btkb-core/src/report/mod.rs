//! HID report encoding.

pub mod keyboard;

pub use keyboard::{KeyboardReport, KEYBOARD_REPORT_SIZE};

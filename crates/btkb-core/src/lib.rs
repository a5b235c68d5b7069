//! # btkb-core
//!
//! Shared library for the Bluetooth keyboard engine: key lookup tables,
//! on-screen control layouts and HID keyboard report encoding.
//!
//! It has no dependencies on OS APIs, UI frameworks, the async runtime or the
//! Bluetooth stack, so everything here is testable on any host.
//!
//! - **`keymap`** – What a key means and how it goes on the wire. Android
//!   keycodes and on-screen button text resolve to a [`KeyLabel`]; labels
//!   resolve to USB HID usage IDs plus a modifier byte.
//!
//! - **`domain`** – The on-screen buttons of each screen profile, with stable
//!   ids the engine uses to track which buttons are held.
//!
//! - **`report`** – The 8-byte boot-protocol keyboard report that the HID
//!   Device profile transmits to the host.

pub mod domain;
pub mod keymap;
pub mod report;

pub use domain::controls::{ControlBinding, ControlId, ControlKind, ControlLayout, ScreenProfile};
pub use keymap::android::MetaState;
pub use keymap::hid::{HidUsage, ModifierMask};
pub use keymap::labels::{KeyLabel, KeymapError, ModifierKey, NamedKey};
pub use keymap::KeyMapper;
pub use report::keyboard::KeyboardReport;

//! Domain entities: on-screen controls and the screen profiles that group
//! them.
//!
//! Pure data with no transport, timing or UI dependencies.

pub mod controls;

pub use controls::{
    ControlBinding, ControlId, ControlKind, ControlLayout, ScreenProfile, UnknownScreenProfile,
};

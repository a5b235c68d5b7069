//! Application layer: the key-event to HID-report translation use cases.
//!
//! Nothing here talks to Bluetooth, the file system or a UI directly. The
//! transport, the bonded-device list, the report sender and the feedback cue
//! are traits injected at construction time, so every use case can be driven
//! from tests with recording doubles.
//!
//! - **`repeat`** – held flags and the per-control auto-repeat loops.
//! - **`modifier_latch`** – on-screen modifier state, behind a trait so the
//!   latching policy can be swapped.
//! - **`debounce`** – the shared clock that limits physical modifier combos
//!   to one report pair per window.
//! - **`connection_guard`** – the transport seam and the reconnect path taken
//!   when a send finds the link down.
//! - **`dispatch`** – the send primitives and the plain/latched/chord
//!   decision.
//! - **`route_physical`** – the modifier-priority state machine for hardware
//!   keyboards.
//! - **`engine`** – the facade tying it together.

pub mod connection_guard;
pub mod debounce;
pub mod dispatch;
pub mod engine;
pub mod modifier_latch;
pub mod repeat;
pub mod route_physical;

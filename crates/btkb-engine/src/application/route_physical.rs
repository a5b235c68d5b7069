//! Physical keyboard routing.
//!
//! A hardware keyboard attached to the phone delivers Android keycodes with a
//! meta-state bitfield. The router evaluates each key-down in strict priority
//! order **shift → ctrl → alt → sym/meta → plain**:
//!
//! - For the first modifier flag that is set, the key is sent once as
//!   `key_down(modifier, usage)` + `keys_up(NONE)`, behind the
//!   [`DebounceGate`]. The event is consumed whether or not the gate lets it
//!   through.
//! - With no modifier flag the key takes the same path as an on-screen button:
//!   plain send, or into the modifier latch when one is active.
//!
//! Keycodes in neither lookup table are left unhandled, and so are key-ups.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use btkb_core::{KeyLabel, KeyMapper, MetaState, ModifierMask};
use tracing::{debug, trace};

use super::debounce::DebounceGate;
use super::dispatch::{DispatchOutcome, KeyDispatcher};

/// Direction of a physical key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// One event from a physical keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalKeyEvent {
    pub keycode: u32,
    pub meta: MetaState,
    pub action: KeyAction,
}

impl PhysicalKeyEvent {
    pub fn down(keycode: u32, meta: MetaState) -> Self {
        Self {
            keycode,
            meta,
            action: KeyAction::Down,
        }
    }

    pub fn up(keycode: u32) -> Self {
        Self {
            keycode,
            meta: MetaState::NONE,
            action: KeyAction::Up,
        }
    }
}

/// Whether the platform should see the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The engine took the event.
    Consumed,
    /// The engine did not handle the event; pass it on.
    Unhandled,
}

/// The modifier branch an event falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierBranch {
    Shift,
    Ctrl,
    Alt,
    SymMeta,
}

impl ModifierBranch {
    /// Picks the highest-priority branch whose flag is set.
    pub fn select(meta: MetaState) -> Option<Self> {
        if meta.shift() {
            Some(ModifierBranch::Shift)
        } else if meta.ctrl() {
            Some(ModifierBranch::Ctrl)
        } else if meta.alt() {
            Some(ModifierBranch::Alt)
        } else if meta.sym_or_meta() {
            Some(ModifierBranch::SymMeta)
        } else {
            None
        }
    }

    pub fn mask(self) -> ModifierMask {
        match self {
            ModifierBranch::Shift => ModifierMask::LEFT_SHIFT,
            ModifierBranch::Ctrl => ModifierMask::LEFT_CTRL,
            ModifierBranch::Alt => ModifierMask::LEFT_ALT,
            ModifierBranch::SymMeta => ModifierMask::LEFT_GUI,
        }
    }
}

/// Routes physical key events to the dispatcher.
pub struct PhysicalKeyRouter {
    dispatcher: KeyDispatcher,
    gate: Mutex<DebounceGate>,
}

impl PhysicalKeyRouter {
    pub fn new(dispatcher: KeyDispatcher, debounce: Duration) -> Self {
        Self {
            dispatcher,
            gate: Mutex::new(DebounceGate::new(debounce)),
        }
    }

    /// Routes one event observed at `now`.
    pub fn route(&self, event: PhysicalKeyEvent, now: Instant) -> RouteOutcome {
        if event.action == KeyAction::Up {
            return RouteOutcome::Unhandled;
        }

        let Some(label) = KeyMapper::physical_to_label(event.keycode) else {
            trace!(keycode = event.keycode, "unmapped keycode");
            return RouteOutcome::Unhandled;
        };

        match ModifierBranch::select(event.meta) {
            Some(branch) => {
                self.route_modified(branch, label, now);
                RouteOutcome::Consumed
            }
            None => self.route_plain(label),
        }
    }

    fn route_modified(&self, branch: ModifierBranch, label: KeyLabel, now: Instant) {
        let Some(usage) = KeyMapper::label_usage(label) else {
            return;
        };

        let outcome = self.dispatcher.guard().check();
        if !outcome.is_connected() {
            debug!(?branch, %label, ?outcome, "not connected; modified key dropped");
            return;
        }

        let open = self
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_pass(now);
        if !open {
            debug!(?branch, %label, "debounced");
            return;
        }

        self.dispatcher.send_chord(branch.mask(), usage);
    }

    fn route_plain(&self, label: KeyLabel) -> RouteOutcome {
        match self.dispatcher.send_label(label) {
            DispatchOutcome::NotConnected(_) => RouteOutcome::Unhandled,
            _ => RouteOutcome::Consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_wins_over_ctrl() {
        let meta = MetaState::SHIFT_ON | MetaState::CTRL_ON;
        assert_eq!(ModifierBranch::select(meta), Some(ModifierBranch::Shift));
    }

    #[test]
    fn test_branch_priority_order() {
        assert_eq!(
            ModifierBranch::select(MetaState::CTRL_ON | MetaState::ALT_ON | MetaState::META_ON),
            Some(ModifierBranch::Ctrl)
        );
        assert_eq!(
            ModifierBranch::select(MetaState::ALT_ON | MetaState::SYM_ON),
            Some(ModifierBranch::Alt)
        );
        assert_eq!(
            ModifierBranch::select(MetaState::META_ON),
            Some(ModifierBranch::SymMeta)
        );
        assert_eq!(ModifierBranch::select(MetaState::NONE), None);
    }

    #[test]
    fn test_branch_masks() {
        assert_eq!(ModifierBranch::Shift.mask(), ModifierMask::LEFT_SHIFT);
        assert_eq!(ModifierBranch::Ctrl.mask(), ModifierMask::LEFT_CTRL);
        assert_eq!(ModifierBranch::Alt.mask(), ModifierMask::LEFT_ALT);
        assert_eq!(ModifierBranch::SymMeta.mask(), ModifierMask::LEFT_GUI);
    }
}

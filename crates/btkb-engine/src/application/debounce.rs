//! Debounce gate for modifier + key reports from physical keyboards.
//!
//! One physical combo such as Shift+A can reach the app as several key-down
//! events in quick succession. The gate lets the first through and drops the
//! rest until the window has elapsed.

use std::time::{Duration, Instant};

/// Default debounce window.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(160);

/// Single shared timestamp of the last dispatched modified key.
#[derive(Debug, Clone)]
pub struct DebounceGate {
    window: Duration,
    last_sent: Option<Instant>,
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_sent: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` and records `now` if nothing has passed yet or more
    /// than the window has elapsed since the last pass.
    ///
    /// A rejected call leaves the timestamp untouched.
    pub fn try_pass(&mut self, now: Instant) -> bool {
        let open = match self.last_sent {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.window,
        };
        if open {
            self.last_sent = Some(now);
        }
        open
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

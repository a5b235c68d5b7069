//! Auto-repeat for held on-screen controls.
//!
//! Each held control gets its own tokio task that fires the key action, then
//! sleeps for the control's interval, for as long as the control's "held"
//! flag stays set. Releasing a control only clears the flag; the task notices
//! on its next wake-up, so a release can lag by up to one interval but
//! nothing fires after the flag is observed false.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use btkb_core::ControlId;
use tokio::task::JoinHandle;
use tracing::trace;

/// Repeat interval for character controls.
pub const REGULAR_REPEAT_INTERVAL: Duration = Duration::from_millis(360);

/// Repeat interval for special-function controls.
pub const SPECIAL_REPEAT_INTERVAL: Duration = Duration::from_millis(120);

/// Held flags keyed by control id.
///
/// Flags live in a flat arena indexed through a map. An entry is created the
/// first time a control is touched and is never removed, only cleared.
#[derive(Debug, Default)]
pub struct RepeatState {
    flags: Vec<bool>,
    index: HashMap<ControlId, usize>,
}

impl RepeatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_held(&mut self, control: ControlId, held: bool) {
        match self.index.get(&control) {
            Some(&slot) => self.flags[slot] = held,
            None => {
                self.index.insert(control, self.flags.len());
                self.flags.push(held);
            }
        }
    }

    /// Returns `false` for controls never touched.
    pub fn is_held(&self, control: ControlId) -> bool {
        self.index
            .get(&control)
            .map(|&slot| self.flags[slot])
            .unwrap_or(false)
    }

    /// Number of controls ever touched.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Starts and stops repeat loops.
#[derive(Debug, Clone, Default)]
pub struct RepeatController {
    state: Arc<Mutex<RepeatState>>,
}

impl RepeatController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `control` held and spawns its repeat loop.
    ///
    /// `tick` runs once immediately and then once per `interval` until
    /// [`press_end`](Self::press_end) is observed. Must be called from within
    /// a tokio runtime.
    pub fn press_start<F>(&self, control: ControlId, interval: Duration, mut tick: F) -> JoinHandle<()>
    where
        F: FnMut() + Send + 'static,
    {
        self.set_held(control, true);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut ticks = 0u64;
            loop {
                // The lock is dropped before the tick and before the sleep.
                let held = lock(&state).is_held(control);
                if !held {
                    break;
                }
                tick();
                ticks += 1;
                tokio::time::sleep(interval).await;
            }
            trace!(%control, ticks, "repeat loop finished");
        })
    }

    /// Clears the held flag of `control`. Its loop exits on its next check.
    pub fn press_end(&self, control: ControlId) {
        self.set_held(control, false);
    }

    /// Sets the held flag without starting a loop.
    pub fn set_held(&self, control: ControlId, held: bool) {
        lock(&self.state).set_held(control, held);
    }

    pub fn is_held(&self, control: ControlId) -> bool {
        lock(&self.state).is_held(control)
    }

    /// Number of controls with a flag entry.
    pub fn tracked(&self) -> usize {
        lock(&self.state).len()
    }
}

fn lock(state: &Mutex<RepeatState>) -> MutexGuard<'_, RepeatState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_state_creates_entries_lazily_and_never_removes_them() {
        // Arrange
        let mut state = RepeatState::new();
        let a = ControlId(3);

        // Act / Assert
        assert!(!state.is_held(a));
        assert!(state.is_empty());

        state.set_held(a, true);
        assert!(state.is_held(a));

        state.set_held(a, false);
        assert!(!state.is_held(a));
        assert_eq!(state.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_for_one_second_at_360ms_fires_three_times() {
        // Arrange
        let repeat = RepeatController::new();
        let (count, tick) = counter();
        let id = ControlId(9);

        // Act
        let handle = repeat.press_start(id, REGULAR_REPEAT_INTERVAL, tick);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        repeat.press_end(id);
        handle.await.expect("repeat task must not panic");

        // Assert
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_fires_after_release_is_observed() {
        let repeat = RepeatController::new();
        let (count, tick) = counter();
        let id = ControlId(1);

        let handle = repeat.press_start(id, SPECIAL_REPEAT_INTERVAL, tick);
        tokio::time::sleep(Duration::from_millis(500)).await;
        repeat.press_end(id);
        handle.await.expect("repeat task must not panic");
        let at_release = count.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_secs(2)).await;

        // 0, 120, 240, 360, 480
        assert_eq!(at_release, 5);
        assert_eq!(count.load(Ordering::SeqCst), at_release);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loops_for_different_controls_are_independent() {
        let repeat = RepeatController::new();
        let (slow_count, slow) = counter();
        let (fast_count, fast) = counter();

        let slow_handle = repeat.press_start(ControlId(0), REGULAR_REPEAT_INTERVAL, slow);
        let fast_handle = repeat.press_start(ControlId(1), SPECIAL_REPEAT_INTERVAL, fast);
        tokio::time::sleep(Duration::from_millis(300)).await;
        repeat.press_end(ControlId(1));
        tokio::time::sleep(Duration::from_millis(300)).await;
        repeat.press_end(ControlId(0));
        slow_handle.await.expect("slow loop");
        fast_handle.await.expect("fast loop");

        // fast: 0, 120, 240; slow: 0, 360
        assert_eq!(fast_count.load(Ordering::SeqCst), 3);
        assert_eq!(slow_count.load(Ordering::SeqCst), 2);
        assert_eq!(repeat.tracked(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quick_tap_fires_exactly_once() {
        let repeat = RepeatController::new();
        let (count, tick) = counter();

        let handle = repeat.press_start(ControlId(4), REGULAR_REPEAT_INTERVAL, tick);
        tokio::time::sleep(Duration::from_millis(50)).await;
        repeat.press_end(ControlId(4));
        handle.await.expect("repeat task must not panic");

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

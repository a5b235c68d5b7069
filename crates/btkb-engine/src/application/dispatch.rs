//! HID report dispatch boundary.
//!
//! [`KeySender`] is the set of primitives the engine uses to put keys on the
//! wire. [`KeyDispatcher`] bundles a sender with the connection guard and
//! the modifier latch, and decides for each key whether it is sent plainly,
//! absorbed by the latch, sent as a chord, or dropped for a reconnect.

use std::sync::{Arc, Mutex, PoisonError};

use btkb_core::{ControlId, HidUsage, KeyLabel, ModifierKey, ModifierMask, NamedKey};
use tracing::{debug, warn};

use super::connection_guard::{ConnectionGuard, GuardOutcome, TransportError};
use super::modifier_latch::{LatchDecision, ModifierLatch};

/// Key-level send primitives.
///
/// The production implementation encodes reports onto a
/// [`HidTransport`](super::connection_guard::HidTransport); tests record the
/// calls.
pub trait KeySender: Send + Sync {
    /// Types one character: key-down with the character's implied modifier,
    /// then keys-up. Characters without a usage are dropped.
    fn send_char(&self, c: char) -> Result<(), TransportError>;

    /// Taps one named key with no modifier.
    fn send_special_key(&self, key: NamedKey) -> Result<(), TransportError>;

    fn send_key_down(&self, modifier: ModifierMask, usage: HidUsage) -> Result<(), TransportError>;

    fn send_keys_up(&self, modifier: ModifierMask) -> Result<(), TransportError>;
}

/// Audible/haptic click played per repeat tick and per modifier press.
pub trait FeedbackCue: Send + Sync {
    fn click(&self, control: ControlId);
}

/// A [`FeedbackCue`] that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl FeedbackCue for SilentFeedback {
    fn click(&self, _control: ControlId) {}
}

/// Modifier latch shared between touch dispatch and physical routing.
pub type SharedLatch = Arc<Mutex<Box<dyn ModifierLatch>>>;

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The key went out as a plain press.
    Sent,
    /// The key went out together with the latched modifiers.
    Chorded(ModifierMask),
    /// The latch took the key instead of sending it.
    Absorbed,
    /// A modifier button was latched.
    Latched,
    /// Nothing was sent because the link is down.
    NotConnected(GuardOutcome),
    /// The transport refused the report.
    Failed,
}

/// Sends keys, consulting the connection guard and the modifier latch.
#[derive(Clone)]
pub struct KeyDispatcher {
    sender: Arc<dyn KeySender>,
    guard: Arc<ConnectionGuard>,
    latch: SharedLatch,
}

impl KeyDispatcher {
    pub fn new(sender: Arc<dyn KeySender>, guard: Arc<ConnectionGuard>, latch: SharedLatch) -> Self {
        Self {
            sender,
            guard,
            latch,
        }
    }

    pub fn guard(&self) -> &ConnectionGuard {
        &self.guard
    }

    /// Returns `true` if no modifier is latched.
    pub fn latch_is_empty(&self) -> bool {
        self.lock_latch().is_empty()
    }

    /// Latched modifiers, oldest first.
    pub fn active_modifiers(&self) -> Vec<ModifierKey> {
        self.lock_latch().active()
    }

    /// Sends a regular or special key the way an on-screen button does.
    ///
    /// With an empty latch the key goes out plainly. Otherwise the latch
    /// decides. Modifier labels are latched instead.
    pub fn send_label(&self, label: KeyLabel) -> DispatchOutcome {
        let outcome = self.guard.check();
        if !outcome.is_connected() {
            return DispatchOutcome::NotConnected(outcome);
        }

        if let KeyLabel::Modifier(m) = label {
            self.lock_latch().press(m);
            debug!(modifier = %m, "modifier latched");
            return DispatchOutcome::Latched;
        }

        // The latch lock is released before anything reaches the transport.
        let decision = {
            let mut latch = self.lock_latch();
            if latch.is_empty() {
                None
            } else {
                Some(latch.absorb(label))
            }
        };

        match decision {
            None => self.send_plain(label),
            Some(LatchDecision::Absorbed) => {
                debug!(%label, "key absorbed by modifier latch");
                DispatchOutcome::Absorbed
            }
            Some(LatchDecision::Chord { modifiers, usage }) => {
                if self.send_chord(modifiers, usage) {
                    DispatchOutcome::Chorded(modifiers)
                } else {
                    DispatchOutcome::Failed
                }
            }
            Some(LatchDecision::Unmapped) => {
                debug!(%label, "latched key has no usage; dropped");
                DispatchOutcome::Failed
            }
        }
    }

    /// Informs the latch that a modifier button was let go.
    pub fn release_modifier(&self, modifier: ModifierKey) {
        self.lock_latch().release(modifier);
    }

    /// One `key_down(modifiers, usage)` followed by `keys_up(NONE)`.
    ///
    /// Returns `false` if either report failed; failures are logged, not
    /// propagated.
    pub fn send_chord(&self, modifiers: ModifierMask, usage: HidUsage) -> bool {
        debug!(modifiers = modifiers.bits(), %usage, "sending chord");
        let down = self.sender.send_key_down(modifiers, usage);
        let up = self.sender.send_keys_up(ModifierMask::NONE);
        match down.and(up) {
            Ok(()) => true,
            Err(e) => {
                warn!("dropping chord {usage}: {e}");
                false
            }
        }
    }

    fn send_plain(&self, label: KeyLabel) -> DispatchOutcome {
        let result = match label {
            KeyLabel::Char(c) => self.sender.send_char(c),
            KeyLabel::Named(k) => self.sender.send_special_key(k),
            KeyLabel::Modifier(_) => return DispatchOutcome::Latched,
        };
        match result {
            Ok(()) => {
                debug!(%label, "sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                warn!("dropping {label}: {e}");
                DispatchOutcome::Failed
            }
        }
    }

    fn lock_latch(&self) -> std::sync::MutexGuard<'_, Box<dyn ModifierLatch>> {
        self.latch.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::modifier_latch::LatchPolicy;
    use crate::infrastructure::transport::mock::{MockTransport, RecordingKeySender, SentKey};
    use crate::infrastructure::transport::StaticDirectory;
    use tokio::sync::mpsc;

    fn dispatcher(sender: RecordingKeySender, policy: LatchPolicy) -> (KeyDispatcher, Arc<RecordingKeySender>) {
        let (tx, _rx) = mpsc::unbounded_channel();
        let guard = ConnectionGuard::new(
            "Desk PC",
            Arc::new(MockTransport::connected()),
            Arc::new(StaticDirectory::default()),
            tx,
        );
        let sender = Arc::new(sender);
        let latch: SharedLatch = Arc::new(Mutex::new(policy.build()));
        let d = KeyDispatcher::new(Arc::clone(&sender) as _, Arc::new(guard), latch);
        (d, sender)
    }

    #[test]
    fn test_empty_latch_sends_plainly() {
        let (d, sender) = dispatcher(RecordingKeySender::new(), LatchPolicy::Sticky);

        assert_eq!(d.send_label(KeyLabel::Char('q')), DispatchOutcome::Sent);
        assert_eq!(d.send_label(KeyLabel::Named(NamedKey::Esc)), DispatchOutcome::Sent);

        assert_eq!(
            sender.sent(),
            vec![SentKey::Char('q'), SentKey::Special(NamedKey::Esc)]
        );
    }

    #[test]
    fn test_modifier_label_is_latched_not_sent() {
        let (d, sender) = dispatcher(RecordingKeySender::new(), LatchPolicy::Sticky);

        let outcome = d.send_label(KeyLabel::Modifier(ModifierKey::Win));

        assert_eq!(outcome, DispatchOutcome::Latched);
        assert_eq!(d.active_modifiers(), vec![ModifierKey::Win]);
        assert!(sender.sent().is_empty());
    }

    #[test]
    fn test_chord_policy_reports_the_mask_it_sent() {
        // Arrange
        let (d, sender) = dispatcher(RecordingKeySender::new(), LatchPolicy::Chord);
        d.send_label(KeyLabel::Modifier(ModifierKey::Ctrl));
        d.send_label(KeyLabel::Modifier(ModifierKey::Alt));

        // Act
        let outcome = d.send_label(KeyLabel::Named(NamedKey::Del));

        // Assert
        let mask = ModifierMask::LEFT_CTRL | ModifierMask::LEFT_ALT;
        assert_eq!(outcome, DispatchOutcome::Chorded(mask));
        assert_eq!(
            sender.sent(),
            vec![
                SentKey::KeyDown(mask, HidUsage::Delete),
                SentKey::KeysUp(ModifierMask::NONE),
            ]
        );
        assert!(d.latch_is_empty());
    }

    #[test]
    fn test_sender_failure_is_reported_not_propagated() {
        let mut failing = RecordingKeySender::new();
        failing.should_fail = true;
        let (d, _sender) = dispatcher(failing, LatchPolicy::Sticky);

        assert_eq!(d.send_label(KeyLabel::Char('q')), DispatchOutcome::Failed);
        assert!(!d.send_chord(ModifierMask::LEFT_SHIFT, HidUsage::Q));
    }
}

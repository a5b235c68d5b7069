//! Recording test doubles for the transport, sender and feedback seams.
//!
//! Every call is pushed into a `Mutex<Vec<...>>` so tests can assert exactly
//! what reached the boundary and in what order. The doubles are public so the
//! integration tests under `tests/` can use them too.
//!
//! # `should_fail` flag
//!
//! Set `should_fail = true` to make every send return an error, for testing
//! the warn-and-drop paths.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use btkb_core::{ControlId, HidUsage, KeyMapper, KeyboardReport, ModifierMask, NamedKey};

use crate::application::connection_guard::{
    BondedDevice, HidTransport, ProfileHandle, ProfileListener, TransportError,
};
use crate::application::dispatch::{FeedbackCue, KeySender};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A transport that records calls instead of talking to a Bluetooth stack.
#[derive(Default)]
pub struct MockTransport {
    connected: AtomicBool,
    /// When set, `request_connect` flips the transport to connected.
    pub connect_on_request: AtomicBool,
    registrations: AtomicU32,
    unregistrations: AtomicU32,
    listener: Mutex<Option<ProfileListener>>,
    connect_requests: Mutex<Vec<BondedDevice>>,
    reports: Mutex<Vec<KeyboardReport>>,
    /// When `true`, `send_report` fails with [`TransportError::Rejected`].
    pub should_fail: bool,
}

impl MockTransport {
    /// A disconnected transport.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected() -> Self {
        let t = Self::default();
        t.set_connected(true);
        t
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn registrations(&self) -> u32 {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn unregistrations(&self) -> u32 {
        self.unregistrations.load(Ordering::SeqCst)
    }

    /// The listener passed to the most recent `register`.
    pub fn listener(&self) -> Option<ProfileListener> {
        lock(&self.listener).clone()
    }

    pub fn connect_requests(&self) -> Vec<BondedDevice> {
        lock(&self.connect_requests).clone()
    }

    pub fn reports(&self) -> Vec<KeyboardReport> {
        lock(&self.reports).clone()
    }
}

impl HidTransport for MockTransport {
    fn register(&self, listener: ProfileListener) -> Result<ProfileHandle, TransportError> {
        let n = self.registrations.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.listener) = Some(listener);
        Ok(ProfileHandle(n))
    }

    fn unregister(&self) -> Result<(), TransportError> {
        self.unregistrations.fetch_add(1, Ordering::SeqCst);
        *lock(&self.listener) = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn request_connect(&self, device: &BondedDevice) -> Result<(), TransportError> {
        lock(&self.connect_requests).push(device.clone());
        if self.connect_on_request.load(Ordering::SeqCst) {
            self.set_connected(true);
        }
        Ok(())
    }

    fn send_report(&self, report: &KeyboardReport) -> Result<(), TransportError> {
        if self.should_fail {
            return Err(TransportError::Rejected("injected failure".to_string()));
        }
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        lock(&self.reports).push(*report);
        Ok(())
    }
}

/// One call into a [`KeySender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentKey {
    Char(char),
    Special(NamedKey),
    KeyDown(ModifierMask, HidUsage),
    KeysUp(ModifierMask),
}

/// A [`KeySender`] that records each primitive call.
#[derive(Default)]
pub struct RecordingKeySender {
    sent: Mutex<Vec<SentKey>>,
    /// When `true`, every method returns [`TransportError::Rejected`].
    pub should_fail: bool,
}

impl RecordingKeySender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentKey> {
        lock(&self.sent).clone()
    }

    /// Characters passed to `send_char`, in order.
    pub fn chars(&self) -> Vec<char> {
        lock(&self.sent)
            .iter()
            .filter_map(|k| match k {
                SentKey::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Convenience for the `key_down` expected for a physical combo.
    pub fn chord(modifier: ModifierMask, c: char) -> [SentKey; 2] {
        let usage = KeyMapper::char_usage(c).map(|(_, u)| u).unwrap_or(HidUsage::None);
        [SentKey::KeyDown(modifier, usage), SentKey::KeysUp(ModifierMask::NONE)]
    }

    fn record(&self, key: SentKey) -> Result<(), TransportError> {
        if self.should_fail {
            return Err(TransportError::Rejected("injected failure".to_string()));
        }
        lock(&self.sent).push(key);
        Ok(())
    }
}

impl KeySender for RecordingKeySender {
    fn send_char(&self, c: char) -> Result<(), TransportError> {
        self.record(SentKey::Char(c))
    }

    fn send_special_key(&self, key: NamedKey) -> Result<(), TransportError> {
        self.record(SentKey::Special(key))
    }

    fn send_key_down(&self, modifier: ModifierMask, usage: HidUsage) -> Result<(), TransportError> {
        self.record(SentKey::KeyDown(modifier, usage))
    }

    fn send_keys_up(&self, modifier: ModifierMask) -> Result<(), TransportError> {
        self.record(SentKey::KeysUp(modifier))
    }
}

/// A [`FeedbackCue`] that records every click.
#[derive(Default)]
pub struct RecordingFeedback {
    clicks: Mutex<Vec<ControlId>>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> Vec<ControlId> {
        lock(&self.clicks).clone()
    }
}

impl FeedbackCue for RecordingFeedback {
    fn click(&self, control: ControlId) {
        lock(&self.clicks).push(control);
    }
}

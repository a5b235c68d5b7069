//! Headless transport for running the engine without a Bluetooth stack.
//!
//! Reports are written to the log instead of the air. Connect requests
//! succeed immediately and are announced through the registered listener
//! the same way a real HID Device profile would announce them.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use btkb_core::KeyboardReport;
use tracing::{debug, info, warn};

use crate::application::connection_guard::{
    BondedDevice, DeviceConnectionState, HidTransport, ProfileEvent, ProfileHandle,
    ProfileListener, TransportError,
};

/// Logs reports and simulates host connections.
#[derive(Default)]
pub struct LoggingTransport {
    listener: Mutex<Option<ProfileListener>>,
    host: Mutex<Option<BondedDevice>>,
    connected: AtomicBool,
    next_handle: AtomicU32,
    reports_sent: AtomicU64,
}

impl LoggingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reports written so far.
    pub fn reports_sent(&self) -> u64 {
        self.reports_sent.load(Ordering::Relaxed)
    }

    /// Returns `true` while a profile listener is registered.
    pub fn is_registered(&self) -> bool {
        lock(&self.listener).is_some()
    }

    /// Simulates the host connecting on its own.
    pub fn simulate_connect(&self, device: BondedDevice) {
        self.set_state(device, DeviceConnectionState::Connected);
    }

    /// Simulates the host dropping the link.
    pub fn simulate_disconnect(&self) {
        let device = lock(&self.host).clone();
        match device {
            Some(device) => self.set_state(device, DeviceConnectionState::Disconnected),
            None => debug!("disconnect requested with no host connected"),
        }
    }

    /// Simulates the stack dropping our registration.
    pub fn simulate_app_unregistered(&self) {
        self.notify(ProfileEvent::AppUnregistered);
    }

    fn set_state(&self, device: BondedDevice, state: DeviceConnectionState) {
        let connected = state == DeviceConnectionState::Connected;
        self.connected.store(connected, Ordering::SeqCst);
        *lock(&self.host) = connected.then(|| device.clone());
        self.notify(ProfileEvent::DeviceStateChanged { device, state });
    }

    fn notify(&self, event: ProfileEvent) {
        let listener = lock(&self.listener).clone();
        match listener {
            Some(tx) => {
                if tx.send(event).is_err() {
                    debug!("profile listener dropped; event discarded");
                }
            }
            None => debug!(?event, "no listener registered; event discarded"),
        }
    }
}

impl HidTransport for LoggingTransport {
    fn register(&self, listener: ProfileListener) -> Result<ProfileHandle, TransportError> {
        *lock(&self.listener) = Some(listener);
        let handle = ProfileHandle(self.next_handle.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(?handle, "registered");
        self.notify(ProfileEvent::ServiceStateChanged {
            proxy: "logging-hid-device".to_string(),
        });
        Ok(handle)
    }

    fn unregister(&self) -> Result<(), TransportError> {
        if lock(&self.listener).take().is_none() {
            return Err(TransportError::NotRegistered);
        }
        debug!("unregistered");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn request_connect(&self, device: &BondedDevice) -> Result<(), TransportError> {
        if lock(&self.listener).is_none() {
            return Err(TransportError::NotRegistered);
        }
        info!("connecting to {device}");
        self.set_state(device.clone(), DeviceConnectionState::Connecting);
        self.set_state(device.clone(), DeviceConnectionState::Connected);
        Ok(())
    }

    fn send_report(&self, report: &KeyboardReport) -> Result<(), TransportError> {
        if !self.is_connected() {
            warn!("report written with no host connected");
            return Err(TransportError::NotConnected);
        }
        self.reports_sent.fetch_add(1, Ordering::Relaxed);
        info!(target: "btkb::report", "{report}");
        Ok(())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use btkb_core::{HidUsage, ModifierMask};
    use tokio::sync::mpsc;

    fn desk() -> BondedDevice {
        BondedDevice {
            name: "Desk PC".to_string(),
            address: "00:11:22:33:44:55".to_string(),
        }
    }

    #[test]
    fn test_connect_requires_registration() {
        let transport = LoggingTransport::new();
        assert_eq!(
            transport.request_connect(&desk()),
            Err(TransportError::NotRegistered)
        );
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_connect_announces_connecting_then_connected() {
        // Arrange
        let transport = LoggingTransport::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        transport.register(tx).expect("register must succeed");

        // Act
        transport.request_connect(&desk()).expect("connect must succeed");

        // Assert
        assert!(transport.is_connected());
        assert!(matches!(rx.try_recv(), Ok(ProfileEvent::ServiceStateChanged { .. })));
        assert_eq!(
            rx.try_recv(),
            Ok(ProfileEvent::DeviceStateChanged {
                device: desk(),
                state: DeviceConnectionState::Connecting,
            })
        );
        assert_eq!(
            rx.try_recv(),
            Ok(ProfileEvent::DeviceStateChanged {
                device: desk(),
                state: DeviceConnectionState::Connected,
            })
        );
    }

    #[test]
    fn test_reports_are_refused_while_disconnected() {
        let transport = LoggingTransport::new();
        let report = KeyboardReport::key_down(ModifierMask::NONE, HidUsage::A);

        assert_eq!(transport.send_report(&report), Err(TransportError::NotConnected));

        transport.simulate_connect(desk());
        assert_eq!(transport.send_report(&report), Ok(()));
        assert_eq!(transport.reports_sent(), 1);

        transport.simulate_disconnect();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_app_unregistered_is_announced_to_the_listener() {
        // Arrange
        let transport = LoggingTransport::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        transport.register(tx).expect("register must succeed");
        let _ = rx.try_recv();

        // Act
        transport.simulate_app_unregistered();

        // Assert
        assert_eq!(rx.try_recv(), Ok(ProfileEvent::AppUnregistered));
        assert!(transport.is_registered());
    }

    #[test]
    fn test_unregister_twice_fails() {
        let transport = LoggingTransport::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        transport.register(tx).expect("register must succeed");

        assert_eq!(transport.unregister(), Ok(()));
        assert!(!transport.is_registered());
        assert_eq!(transport.unregister(), Err(TransportError::NotRegistered));
    }
}

//! Connection guard: turns a send attempt on a dead link into a reconnect.
//!
//! The HID Device profile can drop the host at any time (the phone app goes
//! to the background, the host sleeps). Rather than queueing keystrokes, a
//! send while disconnected looks up the configured target among the bonded
//! devices, re-registers the profile app and asks the stack to connect. The
//! keystroke that triggered it is dropped.
//!
//! There is no backoff: every failed send issues exactly one connect request.

use std::fmt;
use std::sync::Arc;

use btkb_core::KeyboardReport;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Error type for HID transport operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// A report was written while no host is connected.
    #[error("no host connected")]
    NotConnected,

    /// The profile app is not registered with the Bluetooth stack.
    #[error("HID device profile is not registered")]
    NotRegistered,

    /// The Bluetooth stack refused the request.
    #[error("transport rejected request: {0}")]
    Rejected(String),
}

/// A device from the bonded-device list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BondedDevice {
    pub name: String,
    #[serde(default)]
    pub address: String,
}

impl fmt::Display for BondedDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} [{}]", self.name, self.address)
        }
    }
}

/// Opaque handle returned by a successful profile registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileHandle(pub u32);

/// Host connection state as reported by the HID Device profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceConnectionState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl TryFrom<u8> for DeviceConnectionState {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(DeviceConnectionState::Disconnected),
            1 => Ok(DeviceConnectionState::Connecting),
            2 => Ok(DeviceConnectionState::Connected),
            other => Err(other),
        }
    }
}

/// Lifecycle notifications delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    DeviceStateChanged {
        device: BondedDevice,
        state: DeviceConnectionState,
    },
    /// The stack dropped our registration, e.g. because the app was
    /// backgrounded.
    AppUnregistered,
    ServiceStateChanged {
        proxy: String,
    },
}

/// Where the transport delivers [`ProfileEvent`]s.
pub type ProfileListener = mpsc::UnboundedSender<ProfileEvent>;

/// The Bluetooth HID Device profile, as seen by the engine.
///
/// Implementations must be cheap to call from a repeat tick; none of these
/// methods may block on I/O for long.
#[cfg_attr(test, mockall::automock)]
pub trait HidTransport: Send + Sync {
    /// Registers the keyboard app with the stack. Idempotent.
    fn register(&self, listener: ProfileListener) -> Result<ProfileHandle, TransportError>;

    fn unregister(&self) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;

    /// Asks the stack to connect to `device`. Completion is reported later
    /// through [`ProfileEvent::DeviceStateChanged`].
    fn request_connect(&self, device: &BondedDevice) -> Result<(), TransportError>;

    fn send_report(&self, report: &KeyboardReport) -> Result<(), TransportError>;
}

/// Source of the bonded-device list.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceDirectory: Send + Sync {
    fn bonded_devices(&self) -> Vec<BondedDevice>;
}

/// What a guard check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The transport is connected; the caller may send.
    Connected,
    /// Not connected; a connect request went out to this device.
    ReconnectRequested(BondedDevice),
    /// Not connected and no bonded device carries the target name.
    TargetNotBonded,
}

impl GuardOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, GuardOutcome::Connected)
    }
}

/// Reconnect path for sends on a dead link.
pub struct ConnectionGuard {
    target_name: String,
    transport: Arc<dyn HidTransport>,
    directory: Arc<dyn DeviceDirectory>,
    listener: ProfileListener,
}

impl ConnectionGuard {
    pub fn new(
        target_name: impl Into<String>,
        transport: Arc<dyn HidTransport>,
        directory: Arc<dyn DeviceDirectory>,
        listener: ProfileListener,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            transport,
            directory,
            listener,
        }
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Returns [`GuardOutcome::Connected`] if the transport is up, otherwise
    /// runs [`reconnect`](Self::reconnect).
    pub fn check(&self) -> GuardOutcome {
        if self.transport.is_connected() {
            return GuardOutcome::Connected;
        }
        self.reconnect()
    }

    /// Re-registers and requests a connection to the first bonded device
    /// named like the target. Never sends anything.
    pub fn reconnect(&self) -> GuardOutcome {
        let device = self
            .directory
            .bonded_devices()
            .into_iter()
            .find(|d| d.name == self.target_name);

        let Some(device) = device else {
            debug!(target = %self.target_name, "target is not among bonded devices");
            return GuardOutcome::TargetNotBonded;
        };

        info!("requesting connection to {device}");
        // Registration is dropped when the app is backgrounded, so redo it.
        if let Err(e) = self.transport.register(self.listener.clone()) {
            warn!("re-registration before connect failed: {e}");
        }
        if let Err(e) = self.transport.request_connect(&device) {
            warn!("connect request to {device} failed: {e}");
        }
        GuardOutcome::ReconnectRequested(device)
    }
}

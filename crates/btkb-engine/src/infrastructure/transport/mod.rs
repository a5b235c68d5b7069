//! HID transport implementations.
//!
//! - [`logging::LoggingTransport`]: headless transport that logs reports.
//! - [`mock`]: recording doubles for tests.
//! - [`StaticDirectory`]: a fixed bonded-device list, read from the config.

pub mod logging;
pub mod mock;

use crate::application::connection_guard::{BondedDevice, DeviceDirectory};

pub use logging::LoggingTransport;

/// A bonded-device list that never changes.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    devices: Vec<BondedDevice>,
}

impl StaticDirectory {
    pub fn new(devices: Vec<BondedDevice>) -> Self {
        Self { devices }
    }
}

impl DeviceDirectory for StaticDirectory {
    fn bonded_devices(&self) -> Vec<BondedDevice> {
        self.devices.clone()
    }
}

//! TOML-based session configuration.
//!
//! Example:
//!
//! ```toml
//! [session]
//! target_device_name = "Living Room PC"
//! screen_profile = "1280x720"
//! log_level = "info"
//!
//! [timing]
//! regular_repeat_ms = 360
//! special_repeat_ms = 120
//! debounce_ms = 160
//!
//! [latch]
//! policy = "sticky"
//!
//! [[bonded_devices]]
//! name = "Living Room PC"
//! address = "00:11:22:33:44:55"
//! ```
//!
//! Every field has a `#[serde(default = "...")]` so a partial file, or no file
//! at all, still yields a usable session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use btkb_core::ScreenProfile;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::connection_guard::BondedDevice;
use crate::application::engine::EngineConfig;
use crate::application::modifier_latch::LatchPolicy;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub latch: LatchConfig,
    /// Bonded devices known to the headless transport.
    #[serde(default)]
    pub bonded_devices: Vec<BondedDevice>,
}

/// Who to talk to and which keyboard to show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSection {
    /// Name of the bonded host to connect to. Matched exactly.
    #[serde(default = "default_target_device_name")]
    pub target_device_name: String,
    #[serde(default)]
    pub screen_profile: ScreenProfile,
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Repeat cadences and the physical-combo debounce window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_regular_repeat_ms")]
    pub regular_repeat_ms: u64,
    #[serde(default = "default_special_repeat_ms")]
    pub special_repeat_ms: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LatchConfig {
    #[serde(default)]
    pub policy: LatchPolicy,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_target_device_name() -> String {
    "btkb-host".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_regular_repeat_ms() -> u64 {
    360
}
fn default_special_repeat_ms() -> u64 {
    120
}
fn default_debounce_ms() -> u64 {
    160
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            target_device_name: default_target_device_name(),
            screen_profile: ScreenProfile::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            regular_repeat_ms: default_regular_repeat_ms(),
            special_repeat_ms: default_special_repeat_ms(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl SessionConfig {
    /// Engine parameters derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            target_device_name: self.session.target_device_name.clone(),
            regular_repeat: Duration::from_millis(self.timing.regular_repeat_ms),
            special_repeat: Duration::from_millis(self.timing.special_repeat_ms),
            debounce: Duration::from_millis(self.timing.debounce_ms),
            latch_policy: self.latch.policy,
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads a [`SessionConfig`] from `path`, returning the defaults if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SessionConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path` as pretty TOML, creating parent directories.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &SessionConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

//! Persistent storage: the session configuration file.

pub mod config;

pub use config::{load_config, save_config, ConfigError, SessionConfig};

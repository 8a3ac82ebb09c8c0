//! Robolink Settings Crate
//!
//! Device configuration: which devices exist, how to reach their module
//! endpoints, and the connection parameters and timing used for each.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, sanitize_device_name, socket_path, Config, DeviceSettings,
    TransportKind,
};
pub use error::{SettingsError, SettingsResult};

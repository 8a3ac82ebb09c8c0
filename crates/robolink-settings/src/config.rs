//! Device configuration
//!
//! A configuration lists the devices of a cell. For each device it records
//! how its module endpoints are reached (subprocess, Unix socket channel or
//! no endpoint at all), the connection parameters sent with `connect`, the
//! cell origin and the polling intervals.
//!
//! Files are JSON or TOML, chosen by extension.

use crate::error::{SettingsError, SettingsResult};
use robolink_core::{ConnectionParameter, DeviceKind, EndpointRole, Pose};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How a device's module endpoints are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Run `<package-root>/Code/<Connector|Controller>` per request
    Subprocess,
    /// Unix domain socket served by a running module
    Channel,
    /// No external endpoint
    #[default]
    Simulated,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Subprocess => write!(f, "subprocess"),
            Self::Channel => write!(f, "channel"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// Lowercase a device name and replace every non-alphanumeric character
/// with `_`
pub fn sanitize_device_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Default channel path of a device endpoint:
/// `/tmp/<name>_<robot|tool>_<connector|controller>_socket`
pub fn socket_path(name: &str, kind: DeviceKind, role: EndpointRole) -> PathBuf {
    PathBuf::from(format!(
        "/tmp/{}_{}_{}_socket",
        sanitize_device_name(name),
        kind.as_str(),
        role.as_str()
    ))
}

/// Default location of the configuration file
pub fn default_config_path() -> SettingsResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("robolink").join("config.toml"))
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no configuration directory on this platform".into())
        })
}

fn default_telemetry_poll_ms() -> u64 {
    1000
}

fn default_motion_poll_ms() -> u64 {
    50
}

fn default_true() -> bool {
    true
}

/// Settings of one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Unique device name
    pub name: String,
    /// Robot or tool
    #[serde(default)]
    pub kind: DeviceKind,
    /// Endpoint transport
    #[serde(default)]
    pub transport: TransportKind,
    /// Module package root, required for subprocess transport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_root: Option<PathBuf>,
    /// Connector socket path, overriding the default naming scheme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,
    /// Parameters sent with `connect`, in order
    #[serde(default)]
    pub connection_parameters: Vec<ConnectionParameter>,
    /// Cell origin pose
    #[serde(default)]
    pub origin: Pose,
    /// Home pose of the pointer
    #[serde(default)]
    pub home: Pose,
    /// Telemetry poll interval in milliseconds
    #[serde(default = "default_telemetry_poll_ms")]
    pub telemetry_poll_ms: u64,
    /// `performing_state` poll interval in milliseconds
    #[serde(default = "default_motion_poll_ms")]
    pub motion_poll_ms: u64,
    /// Mirror the remote device in the model while connected
    #[serde(default = "default_true")]
    pub update_model: bool,
}

impl DeviceSettings {
    /// Simulated device with default timing
    pub fn new(name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transport: TransportKind::Simulated,
            package_root: None,
            socket_path: None,
            connection_parameters: Vec::new(),
            origin: Pose::default(),
            home: Pose::default(),
            telemetry_poll_ms: default_telemetry_poll_ms(),
            motion_poll_ms: default_motion_poll_ms(),
            update_model: true,
        }
    }

    /// Channel path of an endpoint
    ///
    /// The connector path honours [`DeviceSettings::socket_path`].
    pub fn channel_path(&self, role: EndpointRole) -> PathBuf {
        match (&self.socket_path, role) {
            (Some(path), EndpointRole::Connector) => path.clone(),
            _ => socket_path(&self.name, self.kind, role),
        }
    }

    /// Executable of an endpoint, if a package root is configured
    pub fn executable(&self, role: EndpointRole) -> Option<PathBuf> {
        self.package_root
            .as_ref()
            .map(|root| root.join("Code").join(role.executable_name()))
    }

    /// Telemetry poll interval
    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_poll_ms)
    }

    /// `performing_state` poll interval
    pub fn motion_poll_interval(&self) -> Duration {
        Duration::from_millis(self.motion_poll_ms)
    }

    /// Validate this device's settings
    pub fn validate(&self) -> SettingsResult<()> {
        let key = |field: &str| format!("devices.{}.{}", self.name, field);

        if self.name.trim().is_empty() {
            return Err(SettingsError::invalid("devices.name", "must not be empty"));
        }
        if self.telemetry_poll_ms == 0 {
            return Err(SettingsError::invalid(key("telemetry_poll_ms"), "must be > 0"));
        }
        if self.motion_poll_ms == 0 {
            return Err(SettingsError::invalid(key("motion_poll_ms"), "must be > 0"));
        }
        if self.transport == TransportKind::Subprocess && self.package_root.is_none() {
            return Err(SettingsError::invalid(
                key("package_root"),
                "required for subprocess transport",
            ));
        }
        Ok(())
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configured devices
    #[serde(default)]
    pub devices: Vec<DeviceSettings>,
}

impl Config {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Self::format(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!(
            "Loaded {} device(s) from {}",
            config.devices.len(),
            path.display()
        );
        Ok(config)
    }

    /// Load config from file, or return an empty config if it does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Self::format(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigDirectory(e.to_string()))?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let mut names = HashSet::new();
        for device in &self.devices {
            device.validate()?;
            if !names.insert(device.name.as_str()) {
                return Err(SettingsError::invalid(
                    format!("devices.{}", device.name),
                    "duplicate device name",
                ));
            }
        }
        Ok(())
    }

    /// Look up a device by name
    pub fn device(&self, name: &str) -> SettingsResult<&DeviceSettings> {
        self.devices
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| SettingsError::UnknownDevice(name.to_string()))
    }

    /// Add a device, replacing one with the same name
    pub fn upsert_device(&mut self, device: DeviceSettings) {
        match self.devices.iter_mut().find(|d| d.name == device.name) {
            Some(existing) => *existing = device,
            None => self.devices.push(device),
        }
    }

    fn format(path: &Path) -> SettingsResult<Format> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

enum Format {
    Json,
    Toml,
}

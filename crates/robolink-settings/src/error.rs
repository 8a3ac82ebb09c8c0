//! Settings errors

use thiserror::Error;

/// Errors raised while loading, saving or validating a configuration
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A device setting was rejected by validation
    #[error("invalid device setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// File extension other than `.json` or `.toml`
    #[error("unsupported config file extension '{0}' (expected json or toml)")]
    UnsupportedFormat(String),

    #[error("config directory unavailable: {0}")]
    ConfigDirectory(String),

    /// Lookup of a device name that is not configured
    #[error("no device named '{0}' in the configuration")]
    UnknownDevice(String),

    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed TOML config: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("could not encode config as TOML: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Build an [`SettingsError::InvalidSetting`]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

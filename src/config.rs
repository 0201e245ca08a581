//! # Configuration Management
//!
//! Centralized configuration for the session library.
//!
//! This module provides structured configuration for the client: device
//! identity presented during authentication, access-point dialing parameters,
//! and logging options.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! Wire-protocol constants that every session sends verbatim (client version
//! string, build version) also live here so there is a single source of
//! truth for them.

use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Fallback access point used when no resolver override is configured.
pub const DEFAULT_AP_ADDRESS: &str = "ap.spotify.com:4070";

/// Max allowed pre-handshake frame, length prefix included (1 MiB).
pub const MAX_PLAIN_FRAME: usize = 1024 * 1024;

/// Max payload carried by one encrypted packet (16-bit length field).
pub const MAX_PACKET_PAYLOAD: usize = u16::MAX as usize;

/// System information string sent in the login credentials.
pub const SYSTEM_INFORMATION_STRING: &str = "librespot";

/// Client version string sent in the login credentials.
pub const CLIENT_VERSION_STRING: &str = "librespot-8315e10";

/// Build version advertised in the client hello.
pub const CLIENT_BUILD_VERSION: u64 = 0x108_0000_0000;

/// Main configuration structure for a session.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SessionConfig {
    /// Device identity presented to the access point
    #[serde(default)]
    pub device: DeviceConfig,

    /// Access point dialing configuration
    #[serde(default)]
    pub ap: ApConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| SessionError::Config(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| SessionError::Config(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| SessionError::Config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("AP_SESSION_DEVICE_NAME") {
            config.device.name = name;
        }

        if let Ok(addr) = std::env::var("AP_SESSION_AP_ADDRESS") {
            config.ap.address = addr;
        }

        if let Ok(timeout) = std::env::var("AP_SESSION_CONNECT_TIMEOUT_MS") {
            if let Ok(val) = timeout.parse::<u64>() {
                config.ap.connect_timeout = Duration::from_millis(val);
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.device.validate());
        errors.extend(self.ap.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SessionError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Device identity presented during authentication
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Human-readable device name (also the default seed for the device id)
    pub name: String,

    /// Stable device identifier; derived from `name` when absent
    pub id: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: String::from("ap-session"),
            id: None,
        }
    }
}

impl DeviceConfig {
    /// Validate device configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.is_empty() {
            errors.push("Device name cannot be empty".to_string());
        } else if self.name.len() > 64 {
            errors.push(format!(
                "Device name too long: {} characters (maximum: 64)",
                self.name.len()
            ));
        }

        if let Some(ref id) = self.id {
            if id.is_empty() {
                errors.push("Device id cannot be empty when set".to_string());
            }
        }

        errors
    }
}

/// Access point dialing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApConfig {
    /// Target address as "host:port"; used by the static resolver
    pub address: String,

    /// Timeout for the TCP connection attempt
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
}

impl Default for ApConfig {
    fn default() -> Self {
        Self {
            address: String::from(DEFAULT_AP_ADDRESS),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ApConfig {
    /// Validate access point configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        match self.address.rsplit_once(':') {
            None => errors.push(format!(
                "Invalid access point address: '{}' (expected format: 'host:port')",
                self.address
            )),
            Some((host, port)) => {
                if host.is_empty() {
                    errors.push("Access point host cannot be empty".to_string());
                }
                if port.parse::<u16>().is_err() {
                    errors.push(format!("Invalid access point port: '{port}'"));
                }
            }
        }

        if self.connect_timeout.as_millis() < 100 {
            errors.push("Connect timeout too short (minimum: 100ms)".to_string());
        } else if self.connect_timeout.as_secs() > 300 {
            errors.push("Connect timeout too long (maximum: 300s)".to_string());
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("ap-session"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for Duration serialization/deserialization
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = duration.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}

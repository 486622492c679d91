//! # Configuration Management
//!
//! Centralized configuration for the codec.
//!
//! Nothing on the wire is configurable: bit-name tables, field order and
//! widths are fixed. What callers can tune is the framing limit, which result
//! layout to expect, what a freshly built server greeting advertises, and how
//! the codec logs.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`

use crate::error::{ProtocolError, Result};
use crate::protocol::ProtocolVersion;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Largest payload a single frame can carry (24-bit size field)
pub const MAX_PAYLOAD_SIZE: u32 = 16_777_215;

/// Frame header length: 3 size bytes plus 1 sequence byte
pub const HEADER_SIZE: usize = 4;

/// Length of the authentication scramble
pub const SCRAMBLE_SIZE: usize = 20;

/// Protocol version byte sent in the server greeting
pub const DEFAULT_PROTOCOL_VERSION: u8 = 10;

/// Longest server version string accepted in configuration
pub const MAX_SERVER_VERSION_SIZE: usize = 32;

/// Top-level codec configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct CodecConfig {
    /// Wire protocol settings
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(size) = std::env::var("MYSQL_WIRE_MAX_PAYLOAD_SIZE") {
            config.protocol.max_payload_size = size.parse::<u32>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid MYSQL_WIRE_MAX_PAYLOAD_SIZE: {e}"))
            })?;
        }

        if let Ok(version) = std::env::var("MYSQL_WIRE_PROTOCOL_VERSION") {
            config.protocol.version = match version.as_str() {
                "4.0" => ProtocolVersion::Protocol40,
                "4.1" => ProtocolVersion::Protocol41,
                other => {
                    return Err(ProtocolError::ConfigError(format!(
                        "Invalid MYSQL_WIRE_PROTOCOL_VERSION: '{other}' (expected '4.0' or '4.1')"
                    )))
                }
            };
        }

        if let Ok(level) = std::env::var("MYSQL_WIRE_LOG_LEVEL") {
            config.logging.log_level = level.parse::<Level>().map_err(|_| {
                ProtocolError::ConfigError(format!("Invalid MYSQL_WIRE_LOG_LEVEL: '{level}'"))
            })?;
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

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        errors.extend(self.protocol.validate());
        errors.extend(self.logging.validate());
        errors
    }

    /// Like `validate`, but fails on the first batch of problems
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(errors.join("; ")))
        }
    }
}

/// Wire protocol settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Result packet layout to decode and encode
    pub version: ProtocolVersion,

    /// Largest frame payload the stream codec accepts
    pub max_payload_size: u32,

    /// Version string advertised in server greetings
    pub server_version: String,

    /// Character set advertised in greetings and client responses
    pub charset: u8,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: ProtocolVersion::Protocol41,
            max_payload_size: MAX_PAYLOAD_SIZE,
            server_version: String::from("5.0.0-mysql-wire-codec"),
            charset: 8, // latin1_swedish_ci
        }
    }
}

impl ProtocolConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_payload_size == 0 {
            errors.push("Max payload size cannot be 0".to_string());
        } else if self.max_payload_size > MAX_PAYLOAD_SIZE {
            errors.push(format!(
                "Max payload size too large: {} bytes (maximum: {MAX_PAYLOAD_SIZE})",
                self.max_payload_size
            ));
        }

        if self.server_version.as_bytes().contains(&0) {
            errors.push("Server version cannot contain a NUL byte".to_string());
        }
        if self.server_version.len() > MAX_SERVER_VERSION_SIZE {
            errors.push(format!(
                "Server version too long: {} bytes (maximum: {MAX_SERVER_VERSION_SIZE})",
                self.server_version.len()
            ));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
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
            app_name: String::from("mysql-wire-codec"),
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

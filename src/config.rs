//! # Configuration Management
//!
//! Connection settings for the RCON client plus logging options.
//!
//! ## Configuration Sources
//! - Environment variables via `from_env()` (`RCON_HOST`, `RCON_PORT`, `RCON_PASSWORD`, ...)
//! - TOML files via `from_file()` / `from_toml()`
//! - Direct instantiation with defaults
//!
//! ## Secrets
//! The password is never serialized and is redacted from `Debug` output, so a
//! config dumped to a log or written with `example_config()` does not leak it.

use crate::error::{RconError, Result};
use crate::utils::timeout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::Level;

/// Well-known RCON port used by Minecraft servers
pub const DEFAULT_PORT: u16 = 25575;

/// Default host when none is configured
pub const DEFAULT_HOST: &str = "localhost";

/// Largest accepted value of a packet length prefix (256 KiB)
pub const MAX_PACKET_LENGTH: usize = 256 * 1024;

/// Largest reply body collected across all fragments of one command (4 MiB)
pub const MAX_REPLY_LENGTH: usize = 16 * MAX_PACKET_LENGTH;

/// Top-level settings structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Settings {
    /// RCON connection configuration
    #[serde(default)]
    pub rcon: RconConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| RconError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| RconError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| RconError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            rcon: RconConfig::from_env()?,
            logging: LoggingConfig::default(),
        })
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.rcon.validate();
        errors.extend(self.logging.validate());
        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        strict(self.validate())
    }
}

/// How a multi-packet command reply is detected as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReassemblyMode {
    /// The first packet carrying the command id is the whole reply.
    ///
    /// Only sound when the server never splits output across packets.
    Single,
    /// An empty trailer packet follows every command; its echo marks the end of
    /// the reply.
    #[default]
    Trailer,
}

impl std::str::FromStr for ReassemblyMode {
    type Err = RconError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "trailer" => Ok(Self::Trailer),
            other => Err(RconError::ConfigError(format!(
                "Unknown reassembly mode: '{other}' (expected 'single' or 'trailer')"
            ))),
        }
    }
}

/// Connection settings for one RCON endpoint. Immutable once the client is built.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RconConfig {
    /// Server host name or IP address
    pub host: String,

    /// Server RCON port
    pub port: u16,

    /// RCON password; never serialized
    #[serde(skip_serializing)]
    pub password: String,

    /// Bound on TCP connect
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,

    /// Bound on the login round trip and on every command round trip
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,

    /// Reply completion strategy
    pub reassembly: ReassemblyMode,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            password: String::new(),
            connect_timeout: timeout::CONNECT_TIMEOUT,
            request_timeout: timeout::REQUEST_TIMEOUT,
            reassembly: ReassemblyMode::default(),
        }
    }
}

impl fmt::Debug for RconConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RconConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("reassembly", &self.reassembly)
            .finish()
    }
}

impl RconConfig {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn with_timeouts(mut self, connect_timeout: Duration, request_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self.request_timeout = request_timeout;
        self
    }

    pub fn with_reassembly(mut self, reassembly: ReassemblyMode) -> Self {
        self.reassembly = reassembly;
        self
    }

    /// `host:port` for log fields and error messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Load connection settings from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("RCON_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("RCON_PORT") {
            config.port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| RconError::ConfigError(format!("Invalid RCON_PORT: '{port}'")))?;
        }

        if let Ok(password) = std::env::var("RCON_PASSWORD") {
            config.password = password;
        }

        if let Ok(ms) = std::env::var("RCON_CONNECT_TIMEOUT_MS") {
            config.connect_timeout = parse_millis("RCON_CONNECT_TIMEOUT_MS", &ms)?;
        }

        if let Ok(ms) = std::env::var("RCON_REQUEST_TIMEOUT_MS") {
            config.request_timeout = parse_millis("RCON_REQUEST_TIMEOUT_MS", &ms)?;
        }

        if let Ok(mode) = std::env::var("RCON_REASSEMBLY") {
            config.reassembly = mode.parse()?;
        }

        Ok(config)
    }

    /// Validate connection settings
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.host.trim().is_empty() {
            errors.push("RCON host cannot be empty".to_string());
        }

        if self.port == 0 {
            errors.push("RCON port must be greater than 0".to_string());
        }

        if self.password.is_empty() {
            errors.push("RCON password is empty (servers refuse RCON without one)".to_string());
        } else if self.password.contains('\0') {
            errors.push("RCON password cannot contain NUL bytes".to_string());
        }

        if self.connect_timeout.as_millis() < 100 {
            errors.push("Connect timeout too short (minimum: 100ms)".to_string());
        } else if self.connect_timeout.as_secs() > 60 {
            errors.push("Connect timeout too long (maximum: 60s)".to_string());
        }

        if self.request_timeout.as_millis() < 100 {
            errors.push("Request timeout too short (minimum: 100ms)".to_string());
        } else if self.request_timeout.as_secs() > 300 {
            errors.push("Request timeout too long (maximum: 300s)".to_string());
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        strict(self.validate())
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
            app_name: String::from("rcon-session"),
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

fn parse_millis(var: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| RconError::ConfigError(format!("Invalid {var}: '{value}'")))
}

fn strict(errors: Vec<String>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RconError::ConfigError(format!(
            "Configuration validation failed:\n  - {}",
            errors.join("\n  - ")
        )))
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

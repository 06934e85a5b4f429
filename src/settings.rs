//! # Settings
//!
//! Service configuration loaded from an optional TOML file and
//! `OFFERS__`-prefixed environment variables.
//!
//! Environment variables use `__` as the nesting separator, so
//! `OFFERS__POOL__MAX_SIZE=50` sets `pool.max_size`. Values missing from
//! every source fall back to their defaults. A `.env` file in the working
//! directory is read first when present.
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::settings::Settings;
//!
//! let settings = Settings::from_toml_str("[pool]\nmax_size = 40\n").unwrap();
//! assert_eq!(settings.pool.max_size, 40);
//! assert_eq!(settings.pool.core_size, 10);
//! ```

use crate::application::services::AggregationConfig;
use crate::infrastructure::concurrency::pool::{
    DEFAULT_CORE_SIZE, DEFAULT_MAX_SIZE, DEFAULT_QUEUE_CAPACITY, DEFAULT_THREAD_NAME_PREFIX,
    PoolConfig,
};
use crate::infrastructure::downstream::http::HttpDownstreamConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Prefix of environment variables read into [`Settings`].
pub const ENV_PREFIX: &str = "OFFERS";

/// Nesting separator for environment variables.
pub const ENV_SEPARATOR: &str = "__";

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value is out of range.
    #[error("invalid setting {key}: {message}")]
    Invalid {
        /// Dotted key of the offending setting.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl SettingsError {
    fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address.
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl ServerSettings {
    /// Parses the listen address.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` if the address does not parse.
    pub fn socket_addr(&self) -> SettingsResult<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| SettingsError::invalid("server.bind_addr", format!("{e}")))
    }
}

/// Worker pool settings, durations in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Worker threads kept alive.
    pub core_size: usize,
    /// Concurrent execution slots.
    pub max_size: usize,
    /// Calls allowed to wait for a slot.
    pub queue_capacity: usize,
    /// Idle time before a surplus thread exits.
    pub keep_alive_secs: u64,
    /// Drain deadline at shutdown.
    pub shutdown_timeout_secs: u64,
    /// Worker thread name prefix.
    pub thread_name_prefix: String,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            core_size: DEFAULT_CORE_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            keep_alive_secs: 10,
            shutdown_timeout_secs: 10,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl PoolSettings {
    /// Converts to a [`PoolConfig`].
    #[must_use]
    pub fn to_pool_config(&self) -> PoolConfig {
        PoolConfig::default()
            .with_core_size(self.core_size)
            .with_max_size(self.max_size)
            .with_queue_capacity(self.queue_capacity)
            .with_keep_alive(Duration::from_secs(self.keep_alive_secs))
            .with_shutdown_timeout(Duration::from_secs(self.shutdown_timeout_secs))
            .with_thread_name_prefix(self.thread_name_prefix.clone())
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Complete service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server.
    pub server: ServerSettings,
    /// Downstream provider.
    pub downstream: HttpDownstreamConfig,
    /// Worker pool.
    pub pool: PoolSettings,
    /// Aggregation.
    pub aggregation: AggregationConfig,
    /// Logging.
    pub logging: LoggingSettings,
}

impl Settings {
    /// Loads settings from `.env`, the optional file and the environment,
    /// then validates them.
    ///
    /// A missing file is an error when a path is given explicitly.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Load` if a source cannot be read and
    /// `SettingsError::Invalid` if validation fails.
    pub fn load(file: Option<&Path>) -> SettingsResult<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = ::config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let settings: Self = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses and validates settings from a TOML document alone.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Load` for malformed TOML and
    /// `SettingsError::Invalid` if validation fails.
    pub fn from_toml_str(toml: &str) -> SettingsResult<Self> {
        let settings: Self = ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` naming the first offending key.
    pub fn validate(&self) -> SettingsResult<()> {
        self.server.socket_addr()?;
        if self.downstream.base_url.trim().is_empty() {
            return Err(SettingsError::invalid(
                "downstream.base_url",
                "must not be empty",
            ));
        }
        if self.downstream.timeout_ms == 0 {
            return Err(SettingsError::invalid("downstream.timeout_ms", "must be positive"));
        }
        if self.aggregation.call_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                "aggregation.call_timeout_ms",
                "must be positive",
            ));
        }
        self.pool
            .to_pool_config()
            .validate()
            .map_err(|e| SettingsError::invalid("pool", e.to_string()))
    }
}

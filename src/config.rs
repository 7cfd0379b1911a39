//! Server configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an
//! optional TOML file, `MATCHMAKER_*` environment variables (a `.env` file
//! is loaded by the binary), and command-line flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`ServerConfig::host`].
pub const HOST_VAR: &str = "MATCHMAKER_HOST";
/// Environment variable overriding [`ServerConfig::port`].
pub const PORT_VAR: &str = "MATCHMAKER_PORT";
/// Environment variable overriding [`ServerConfig::log_filter`].
pub const LOG_VAR: &str = "MATCHMAKER_LOG";
/// Environment variable overriding [`ServerConfig::seed`].
pub const SEED_VAR: &str = "MATCHMAKER_SEED";

/// Configuration for the matchmaking server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    host: String,

    /// Port to bind.
    port: u16,

    /// `tracing` filter directive used when `RUST_LOG` is unset.
    log_filter: String,

    /// Seed for starting-turn draws. Random when absent.
    seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_filter: "info".to_string(),
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    ///
    /// Missing keys fall back to their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file if given, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Applies `MATCHMAKER_*` overrides read through `lookup`.
    #[instrument(skip_all)]
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(HOST_VAR) {
            self.host = host;
        }
        if let Some(port) = lookup(PORT_VAR) {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid {}: {}", PORT_VAR, e)))?;
        }
        if let Some(filter) = lookup(LOG_VAR) {
            self.log_filter = filter;
        }
        if let Some(seed) = lookup(SEED_VAR) {
            self.seed = Some(
                seed.parse()
                    .map_err(|e| ConfigError::new(format!("Invalid {}: {}", SEED_VAR, e)))?,
            );
        }
        debug!(config = ?self, "Environment overrides applied");
        Ok(())
    }

    /// Applies command-line overrides; `None` keeps the current value.
    pub fn with_overrides(mut self, host: Option<String>, port: Option<u16>, seed: Option<u64>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

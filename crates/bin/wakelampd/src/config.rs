//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `wakelamp.toml` in the working directory. Every field has a
//! default so the file is optional, but the deCONZ backend cannot start
//! without a host, an API key and a group. Environment variables take
//! precedence over file values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use wakelamp_adapter_deconz::DeconzConfig;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "wakelamp.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gateway: GatewayConfig,
    /// Group names and their gateway ids.
    pub groups: BTreeMap<String, String>,
    pub store: StoreConfig,
    pub clock: ClockConfig,
    pub monitor: LoopConfig,
    pub resume: LoopConfig,
    pub logging: LoggingConfig,
}

/// Which [`Gateway`](wakelamp_app::ports::Gateway) implementation to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Deconz,
    /// In-memory group; commands are only logged.
    Virtual,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub backend: Backend,
    /// `host[:port]` of the gateway.
    pub host: String,
    pub api_key: String,
    /// Group name, resolved through `[groups]`.
    pub group: Option<String>,
    /// Explicit group id; wins over `group`.
    pub group_id: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub watch_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    pub tick_millis: u64,
}

/// Interval of a scanning loop (monitor or resume).
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `wakelamp.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Same as [`Config::load`] with an explicit file path.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path.as_ref())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("WAKELAMP_GATEWAY_HOST") {
            self.gateway.host = val;
        }
        if let Some(val) = lookup("WAKELAMP_API_KEY") {
            self.gateway.api_key = val;
        }
        if let Some(val) = lookup("WAKELAMP_GROUP_ID") {
            self.gateway.group_id = Some(val);
        }
        if let Some(val) = lookup("WAKELAMP_EVENTS") {
            self.store.path = PathBuf::from(val);
        }
        if let Some(val) = lookup("WAKELAMP_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.gateway.backend == Backend::Deconz {
            if self.gateway.host.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "gateway host is required".to_string(),
                ));
            }
            if self.gateway.api_key.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "gateway api_key is required".to_string(),
                ));
            }
            self.group_id()?;
        }
        if self.clock.tick_millis == 0
            || self.monitor.interval_secs == 0
            || self.resume.interval_secs == 0
            || self.store.watch_interval_secs == 0
        {
            return Err(ConfigError::Validation(
                "intervals must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The group to drive: `group_id` if set, otherwise `group` looked up in
    /// `[groups]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when neither identifies a group.
    pub fn group_id(&self) -> Result<String, ConfigError> {
        if let Some(id) = self.gateway.group_id.as_deref().map(str::trim)
            && !id.is_empty()
        {
            return Ok(id.to_string());
        }
        match self.gateway.group.as_deref() {
            Some(name) => self.groups.get(name).cloned().ok_or_else(|| {
                ConfigError::Validation(format!("group {name:?} is not listed in [groups]"))
            }),
            None => Err(ConfigError::Validation(
                "gateway group or group_id is required".to_string(),
            )),
        }
    }

    /// Connection settings for the deCONZ adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the group cannot be resolved.
    pub fn deconz(&self) -> Result<DeconzConfig, ConfigError> {
        Ok(DeconzConfig {
            host: self.gateway.host.clone(),
            api_key: self.gateway.api_key.clone(),
            group_id: self.group_id()?,
            timeout: self.gateway.timeout_secs.map(Duration::from_secs),
        })
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.clock.tick_millis)
    }

    #[must_use]
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.store.watch_interval_secs)
    }

    #[must_use]
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor.interval_secs)
    }

    #[must_use]
    pub fn resume_interval(&self) -> Duration {
        Duration::from_secs(self.resume.interval_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("events.toml"),
            watch_interval_secs: 2,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick_millis: 1000 }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "wakelamp=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

//! Configuration loading and config file resolution
//!
//! Bootstrap configuration only: playback timeout windows, logging level and
//! event bus capacity. Every field has a built-in default, so an absent or
//! empty file is a valid configuration.
//!
//! # Config File Priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. `<user config dir>/telplay/config.toml` if it exists
//! 4. No file: built-in defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Playback tracking windows
    #[serde(default)]
    pub playback: PlaybackSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Buffered events per EventBus subscriber
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

/// Playback tracking windows
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackSettings {
    /// How long to wait for the start notification
    #[serde(default = "default_start_timeout_ms")]
    pub start_timeout_ms: u64,

    /// How long to wait for the finish notification once started
    #[serde(default = "default_max_playback_ms")]
    pub max_playback_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            start_timeout_ms: default_start_timeout_ms(),
            max_playback_ms: default_max_playback_ms(),
        }
    }
}

impl PlaybackSettings {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn max_playback(&self) -> Duration {
        Duration::from_millis(self.max_playback_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_start_timeout_ms() -> u64 {
    1_000
}

fn default_max_playback_ms() -> u64 {
    10 * 60 * 1_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_event_bus_capacity() -> usize {
    1000
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TomlConfig {
    /// Built-in defaults, used when no config file is found
    pub fn builtin() -> Self {
        Self {
            playback: PlaybackSettings::default(),
            logging: LoggingConfig::default(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }

    /// Load and validate a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config = Self::parse(&toml_str)?;
        info!("Loaded TOML configuration from {:?}", path);
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(toml_str: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the resolved config path, or fall back to built-in defaults
    pub fn load_or_default(cli_arg: Option<&Path>, env_var_name: &str) -> Result<Self> {
        match resolve_config_path(cli_arg, env_var_name) {
            Some(path) => Self::load(&path),
            None => Ok(Self::builtin()),
        }
    }

    /// Apply command-line window overrides, subject to the same validation
    /// as values read from a file
    pub fn with_overrides(
        mut self,
        start_timeout_ms: Option<u64>,
        max_playback_ms: Option<u64>,
    ) -> Result<Self> {
        if let Some(ms) = start_timeout_ms {
            self.playback.start_timeout_ms = ms;
        }
        if let Some(ms) = max_playback_ms {
            self.playback.max_playback_ms = ms;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.playback.start_timeout_ms == 0 {
            return Err(Error::Config("playback.start_timeout_ms must be > 0".to_string()));
        }
        if self.playback.max_playback_ms == 0 {
            return Err(Error::Config("playback.max_playback_ms must be > 0".to_string()));
        }
        if self.event_bus_capacity == 0 {
            return Err(Error::Config("event_bus_capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Resolve which config file to read, if any
///
/// An explicit CLI path or environment variable is returned even if the file
/// does not exist, so that `load` reports the missing file instead of silently
/// using defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: user config directory
    dirs::config_dir()
        .map(|d| d.join("telplay").join("config.toml"))
        .filter(|p| p.exists())
}

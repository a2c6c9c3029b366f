use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::mta::feeds;

/// Top-level configuration file structure.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_route")]
    route: String,
    #[serde(default)]
    stations_path: Option<PathBuf>,
    #[serde(default)]
    refresh: RefreshConfig,
    #[serde(default)]
    web: WebConfig,
    #[serde(default)]
    display: DisplayConfig,
}

fn default_route() -> String {
    "6".to_string()
}

/// Refresh interval for watch mode (optional in config file).
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

fn default_interval() -> u64 {
    30
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: default_interval(),
        }
    }
}

/// Status endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:5001".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        WebConfig {
            enabled: false,
            bind: default_bind(),
        }
    }
}

/// Terminal display settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            color: default_color(),
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub route: String,
    pub stations_path: Option<PathBuf>,
    pub refresh: RefreshConfig,
    pub web: WebConfig,
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            route: default_route(),
            stations_path: None,
            refresh: RefreshConfig::default(),
            web: WebConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json(&contents)
    }

    /// Parse config from a JSON string (useful for testing).
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let config = Config {
            route: raw.route,
            stations_path: raw.stations_path,
            refresh: raw.refresh,
            web: raw.web,
            display: raw.display,
        };

        config.validate()?;
        Ok(config)
    }

    /// Replace the configured route, re-validating.
    pub fn with_route(mut self, route: &str) -> Result<Self, ConfigError> {
        self.route = route.to_string();
        self.validate()?;
        Ok(self)
    }

    /// Parsed web bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.web.bind.parse().map_err(|_| {
            ConfigError::Validation(format!("web.bind is not a socket address: {}", self.web.bind))
        })
    }

    /// Validate config values are within acceptable ranges.
    fn validate(&self) -> Result<(), ConfigError> {
        if !feeds::is_known_route(&self.route) {
            return Err(ConfigError::UnknownRoute(self.route.clone()));
        }
        if self.refresh.interval_secs < 5 || self.refresh.interval_secs > 300 {
            return Err(ConfigError::Validation(format!(
                "interval_secs must be 5-300, got {}",
                self.refresh.interval_secs
            )));
        }
        self.bind_addr()?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Validation(String),
    UnknownRoute(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config I/O error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Validation(msg) => write!(f, "Config validation error: {}", msg),
            ConfigError::UnknownRoute(route) => {
                write!(f, "Route '{}' is not a known subway route", route)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

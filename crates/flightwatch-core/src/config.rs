//! Configuration loading and typed config structures for Flightwatch.
//!
//! The configuration lives in `flightwatch-config.yaml` next to the binary's
//! working directory. Every field has a default, so an empty (or missing)
//! file yields a runnable monitor.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::injection::DEFAULT_INJECTION_TICKS;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MonitorConfig {
    /// Telemetry generation parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Observer server parameters.
    #[serde(default)]
    pub server: ServerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MonitorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `FLIGHTWATCH_HOST` overrides `server.host`
    /// - `FLIGHTWATCH_PORT` overrides `server.port`
    /// - `FLIGHTWATCH_TICK_INTERVAL_MS` overrides `simulation.tick_interval_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override selected values with environment variables when set.
    ///
    /// Unparseable numeric values are ignored and the YAML value is kept.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FLIGHTWATCH_HOST") {
            self.server.host = val;
        }
        if let Some(port) = std::env::var("FLIGHTWATCH_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }
        if let Some(ms) = std::env::var("FLIGHTWATCH_TICK_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.simulation.tick_interval_ms = ms;
        }
    }
}

/// Telemetry generation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Ticks an operator-requested injection stays active.
    #[serde(default = "default_injection_duration_ticks")]
    pub injection_duration_ticks: u32,

    /// Random seed for reproducible telemetry; absent means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// The tick period as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            injection_duration_ticks: default_injection_duration_ticks(),
            seed: None,
        }
    }
}

/// Observer server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on one socket write before the session is closed.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Outbound messages queued per session before sends are refused.
    #[serde(default = "default_session_buffer")]
    pub session_buffer: usize,
}

impl ServerSettings {
    /// The per-write timeout as a [`Duration`].
    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            send_timeout_ms: default_send_timeout_ms(),
            session_buffer: default_session_buffer(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one event per line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error).
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    2000
}

const fn default_injection_duration_ticks() -> u32 {
    DEFAULT_INJECTION_TICKS
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_send_timeout_ms() -> u64 {
    5000
}

const fn default_session_buffer() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = MonitorConfig::default();
        assert_eq!(config.simulation.tick_interval_ms, 2000);
        assert_eq!(config.simulation.injection_duration_ticks, 10);
        assert!(config.simulation.seed.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_buffer, 64);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
simulation:
  tick_interval_ms: 500
  injection_duration_ticks: 15
  seed: 42

server:
  host: "127.0.0.1"
  port: 9090
  send_timeout_ms: 1000
  session_buffer: 8

logging:
  level: "debug"
  format: json
"#;
        let config = MonitorConfig::parse_without_env(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();

        assert_eq!(config.simulation.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.simulation.injection_duration_ticks, 15);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.send_timeout(), Duration::from_secs(1));
        assert_eq!(config.server.session_buffer, 8);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = MonitorConfig::parse_without_env("simulation:\n  seed: 7\n");
        let config = config.ok().unwrap_or_default();
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.tick_interval_ms, 2000);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(
            MonitorConfig::parse_without_env("").ok(),
            Some(MonitorConfig::default())
        );
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = MonitorConfig::parse_without_env("server: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("flightwatch-config.yaml");
        if path.exists() {
            let config = MonitorConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

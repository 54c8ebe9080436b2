//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// SQLite file, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("tablewatch").join("tablewatch.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./tablewatch.db".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins, empty allows any
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Ingestion behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Create sensors a known chip reports for the first time
    #[serde(default = "default_auto_create_sensors")]
    pub auto_create_sensors: bool,

    /// Largest number of readings accepted in one request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Insert the demo chip at startup
    #[serde(default)]
    pub seed_demo: bool,
}

fn default_auto_create_sensors() -> bool {
    true
}

fn default_max_batch_size() -> usize {
    64
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            auto_create_sensors: default_auto_create_sensors(),
            max_batch_size: default_max_batch_size(),
            seed_demo: false,
        }
    }
}

/// Dashboard page settings
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    5000
}

/// Fastest refresh the dashboard is allowed to use
pub const MIN_POLL_INTERVAL_MS: u64 = 500;

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })?;
        config.clamp_limits();
        Ok(config)
    }

    /// Pull out-of-range values back to the nearest usable one
    fn clamp_limits(&mut self) {
        if self.dashboard.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            tracing::warn!(
                "dashboard.poll_interval_ms = {} is below {}, using {}",
                self.dashboard.poll_interval_ms,
                MIN_POLL_INTERVAL_MS,
                MIN_POLL_INTERVAL_MS
            );
            self.dashboard.poll_interval_ms = MIN_POLL_INTERVAL_MS;
        }
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tablewatch").join("config.toml")),
            Some(PathBuf::from("/etc/tablewatch/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(path) = var("TABLEWATCH_DB_PATH") {
            self.store.path = path;
        }

        if let Some(host) = var("TABLEWATCH_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("TABLEWATCH_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        if let Some(flag) = var("TABLEWATCH_AUTO_CREATE_SENSORS") {
            self.ingest.auto_create_sensors = parse_flag(&flag);
        }
        if let Some(flag) = var("TABLEWATCH_SEED_DEMO") {
            self.ingest.seed_demo = parse_flag(&flag);
        }

        if let Some(level) = var("TABLEWATCH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TABLEWATCH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.to_lowercase() != "false" && value != "0"
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    // Written as a TOML string literal so separators and quotes are escaped
    let db_path = toml::Value::String(default_db_path()).to_string();

    format!(
        r#"# Tablewatch Configuration
#
# Environment variables override these settings:
# - TABLEWATCH_DB_PATH
# - TABLEWATCH_API_HOST
# - TABLEWATCH_API_PORT
# - TABLEWATCH_AUTO_CREATE_SENSORS
# - TABLEWATCH_SEED_DEMO
# - TABLEWATCH_LOG_LEVEL
# - TABLEWATCH_LOG_FORMAT

[store]
# SQLite database file (":memory:" keeps everything in RAM)
path = {db_path}

[api]
host = "0.0.0.0"
port = 3000

# Allowed CORS origins (empty = allow any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[ingest]
# Create sensors that a known chip reports for the first time.
# When false such a report is rejected and nothing in it is applied.
auto_create_sensors = true

# Maximum readings per request
max_batch_size = 64

# Insert the esp32-demo table at startup
seed_demo = false

[dashboard]
# How often the page refreshes (ms)
poll_interval_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.api.addr(), "0.0.0.0:3000");
        assert!(config.ingest.auto_create_sensors);
        assert_eq!(config.ingest.max_batch_size, 64);
        assert_eq!(config.dashboard.poll_interval_ms, 5000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.api.request_timeout_secs, 30);
        assert!(!config.ingest.seed_demo);
    }

    #[test]
    fn test_generated_config_uses_real_db_path() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert!(!config.store.path.starts_with('~'));
        assert_eq!(config.store.path, default_db_path());
    }

    #[test]
    fn test_poll_interval_clamped() {
        let config = Config::parse("[dashboard]\npoll_interval_ms = 0").unwrap();
        assert_eq!(config.dashboard.poll_interval_ms, MIN_POLL_INTERVAL_MS);

        let config = Config::parse("[dashboard]\npoll_interval_ms = 750").unwrap();
        assert_eq!(config.dashboard.poll_interval_ms, 750);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [api]
            port = 8080

            [ingest]
            auto_create_sensors = false
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.host, "0.0.0.0");
        assert!(!config.ingest.auto_create_sensors);
        assert_eq!(config.ingest.max_batch_size, 64);
    }

    #[test]
    fn test_invalid_config() {
        let err = Config::parse("[api]\nport = \"not a number\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TABLEWATCH_DB_PATH", ":memory:"),
            ("TABLEWATCH_API_PORT", "9000"),
            ("TABLEWATCH_AUTO_CREATE_SENSORS", "0"),
            ("TABLEWATCH_SEED_DEMO", "true"),
            ("TABLEWATCH_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.path, ":memory:");
        assert_eq!(config.api.port, 9000);
        assert!(!config.ingest.auto_create_sensors);
        assert!(config.ingest.seed_demo);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_bad_port_override_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "TABLEWATCH_API_PORT").then(|| "abc".to_string()));
        assert_eq!(config.api.port, 3000);
    }
}

//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `AGENCY_*` environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::store::RestStoreConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which store implementation backs the repositories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted backend over its REST interface
    #[default]
    Rest,
    /// Local SQLite file (offline development, tests)
    Sqlite,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rest" => Ok(BackendKind::Rest),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default = "default_backend_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    #[serde(default = "default_backend_timeout")]
    pub request_timeout_ms: u64,
}

fn default_backend_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_sqlite_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("agency").join("agency.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./agency_data/agency.db".to_string())
}

fn default_backend_timeout() -> u64 {
    10_000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            url: default_backend_url(),
            api_key: String::new(),
            sqlite_path: default_sqlite_path(),
            request_timeout_ms: default_backend_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn rest_store_config(&self) -> RestStoreConfig {
        RestStoreConfig {
            base_url: self.url.clone(),
            api_key: self.api_key.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_ws_connections")]
    pub max_ws_connections: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_ws_connections() -> usize {
    1000
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
            max_ws_connections: default_max_ws_connections(),
        }
    }
}

/// Preference store location
#[derive(Debug, Clone, Deserialize)]
pub struct PreferencesConfig {
    #[serde(default = "default_preferences_path")]
    pub path: String,
}

fn default_preferences_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("agency").join("preferences.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./agency_data/preferences.json".to_string())
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: default_preferences_path(),
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

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
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
            dirs::config_dir().map(|p| p.join("agency").join("config.toml")),
            Some(PathBuf::from("/etc/agency/config.toml")),
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
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Backend
        if let Some(kind) = var("AGENCY_BACKEND") {
            match kind.parse() {
                Ok(kind) => self.backend.kind = kind,
                Err(e) => tracing::warn!("Ignoring AGENCY_BACKEND: {}", e),
            }
        }
        if let Some(url) = var("AGENCY_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(key) = var("AGENCY_BACKEND_API_KEY") {
            self.backend.api_key = key;
        }
        if let Some(path) = var("AGENCY_SQLITE_PATH") {
            self.backend.sqlite_path = path;
        }

        // API
        if let Some(host) = var("AGENCY_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("AGENCY_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Some(path) = var("AGENCY_PREFERENCES_PATH") {
            self.preferences.path = path;
        }

        // Logging
        if let Some(level) = var("AGENCY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("AGENCY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
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
    r#"# Agency Configuration
#
# Environment variables override these settings:
# - AGENCY_BACKEND (rest | sqlite)
# - AGENCY_BACKEND_URL
# - AGENCY_BACKEND_API_KEY
# - AGENCY_SQLITE_PATH
# - AGENCY_API_HOST
# - AGENCY_API_PORT
# - AGENCY_PREFERENCES_PATH
# - AGENCY_LOG_LEVEL
# - AGENCY_LOG_FORMAT

[backend]
# "rest" talks to the hosted backend, "sqlite" uses a local file
kind = "rest"

# Hosted backend project URL
url = "http://localhost:54321"

# Public API key for the hosted backend
api_key = ""

# Database file used when kind = "sqlite"
sqlite_path = "./agency_data/agency.db"

# Backend request timeout (ms)
request_timeout_ms = 10000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

# Maximum concurrent WebSocket connections
max_ws_connections = 1000

[preferences]
# JSON file holding site preferences and theme overrides
path = "./agency_data/preferences.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.backend.kind, BackendKind::Rest);
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.backend.request_timeout_ms, 10_000);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::parse("[backend]\nkind = \"sqlite\"\n").unwrap();
        assert_eq!(config.backend.kind, BackendKind::Sqlite);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("AGENCY_BACKEND", "SQLite"),
            ("AGENCY_BACKEND_URL", "https://abc.backend.io"),
            ("AGENCY_API_PORT", "9999"),
            ("AGENCY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.backend.kind, BackendKind::Sqlite);
        assert_eq!(config.backend.url, "https://abc.backend.io");
        assert_eq!(config.api.port, 9999);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "AGENCY_BACKEND" => Some("mongo".to_string()),
            "AGENCY_API_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.kind, BackendKind::Rest);
        assert_eq!(config.api.port, 8090);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/agency.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_rest_store_config() {
        let mut config = Config::default();
        config.backend.api_key = "anon".to_string();
        let rest = config.backend.rest_store_config();
        assert_eq!(rest.api_key, "anon");
        assert_eq!(rest.base_url, "http://localhost:54321");
    }
}

//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/classpulse/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/classpulse/` (~/.config/classpulse/)
//! - Data: `$XDG_DATA_HOME/classpulse/` (~/.local/share/classpulse/)
//! - State/Logs: `$XDG_STATE_HOME/classpulse/` (~/.local/state/classpulse/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Admin credentials for the dashboard login
    #[serde(default)]
    pub admin: AdminConfig,

    /// Database location override
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5001".to_string()
}

impl ServerConfig {
    /// Bind address with the port replaced by `port`, if given.
    ///
    /// Used to honor a `PORT` environment variable on hosts that assign one.
    pub fn bind_with_port(&self, port: Option<&str>) -> String {
        let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return self.bind.clone();
        };
        match self.bind.rsplit_once(':') {
            Some((host, _)) => format!("{}:{}", host, port),
            None => format!("{}:{}", self.bind, port),
        }
    }
}

/// Static admin credentials
///
/// `ADMIN_ID` / `ADMIN_PASSWORD` environment variables take precedence over
/// the file values.
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    #[serde(default = "default_admin_id")]
    pub id: String,
    #[serde(default = "default_admin_password")]
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            id: default_admin_id(),
            password: default_admin_password(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn default_admin_id() -> String {
    "admin".to_string()
}

fn default_admin_password() -> String {
    "password".to_string()
}

impl AdminConfig {
    /// Apply `ADMIN_ID` / `ADMIN_PASSWORD` overrides from the environment.
    ///
    /// Empty variables are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(id) = non_empty_env("ADMIN_ID") {
            self.id = id;
        }
        if let Some(password) = non_empty_env("ADMIN_PASSWORD") {
            self.password = password;
        }
    }
}

/// Database location
#[derive(Debug, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Override path for the SQLite file
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,

    /// Mirror log output to stderr
    #[serde(default = "default_log_stderr")]
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
            stderr: default_log_stderr(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

fn default_log_stderr() -> bool {
    true
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        config.admin.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/classpulse/config.toml` (~/.config/classpulse/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("classpulse").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database)
    ///
    /// `$XDG_DATA_HOME/classpulse/` (~/.local/share/classpulse/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("classpulse")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/classpulse/` (~/.local/state/classpulse/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("classpulse")
    }

    /// Returns the default database file path
    ///
    /// `$XDG_DATA_HOME/classpulse/data.db` (~/.local/share/classpulse/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the configured database path, falling back to [`Config::database_path`].
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(Self::database_path)
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/classpulse/classpulse.log` (~/.local/state/classpulse/classpulse.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("classpulse.log")
    }
}

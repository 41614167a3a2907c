//! Configuration loading for the admin console.
//!
//! Loads configuration from TOML files and/or environment variables using figment.
//!
//! # Configuration Sources (in order of priority, lowest to highest)
//!
//! 1. Default values (from `#[serde(default)]` attributes)
//! 2. TOML config file (if provided)
//! 3. Environment variables (prefix: `HOSPITAL_`, nested with `__`)
//!
//! # Environment Variable Naming
//!
//! - `HOSPITAL_HTTP__LISTEN_ADDR` → `http.listen_addr`
//! - `HOSPITAL_SESSION__TIMEOUT_SECS` → `session.timeout_secs`
//! - `HOSPITAL_DATABASE__PATH` → `database.path` (SQLite builds)
//! - `HOSPITAL_DATABASE__HOST` → `database.host` (PostgreSQL builds)

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the admin console.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Admin session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Address to listen on
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

/// Admin session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Seconds a login stays valid (default: 8 hours)
    #[serde(default = "default_session_timeout")]
    pub timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_session_timeout(),
        }
    }
}

fn default_session_timeout() -> u64 {
    8 * 60 * 60
}

/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TIMEOUT_SECS: u64 = 365 * 24 * 60 * 60;

// =============================================================================
// Database Configuration (compile-time feature selection)
// =============================================================================

/// SQLite database configuration (used when compiled with `sqlite` feature).
#[cfg(feature = "sqlite")]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    /// If not specified, defaults to `hospital.db` in the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// PostgreSQL database configuration (used when compiled with `postgres` feature).
#[cfg(feature = "postgres")]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Database host (default: "localhost")
    #[serde(default = "default_postgres_host")]
    pub host: String,

    /// Database port (default: 5432)
    #[serde(default = "default_postgres_port")]
    pub port: u16,

    /// Database user
    #[serde(default)]
    pub user: String,

    /// Database password
    #[serde(default)]
    pub password: String,

    /// Database name (default: "hospital")
    #[serde(default = "default_postgres_database")]
    pub database: String,
}

#[cfg(feature = "postgres")]
fn default_postgres_host() -> String {
    "localhost".to_string()
}

#[cfg(feature = "postgres")]
fn default_postgres_port() -> u16 {
    5432
}

#[cfg(feature = "postgres")]
fn default_postgres_database() -> String {
    "hospital".to_string()
}

#[cfg(feature = "postgres")]
impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_postgres_host(),
            port: default_postgres_port(),
            user: String::new(),
            password: String::new(),
            database: default_postgres_database(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables.
    ///
    /// A missing file is not an error; every setting has a default.
    ///
    /// ```bash
    /// export HOSPITAL_HTTP__LISTEN_ADDR=0.0.0.0:8080
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let mut figment = Figment::new();

        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("HOSPITAL_").split("__"));

        let config: Config = figment.extract().with_context(|| {
            format!(
                "Failed to load config from {} and environment",
                path.display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        let timeout = self.session.timeout_secs;
        anyhow::ensure!(timeout > 0, "session.timeout_secs must be greater than zero");
        anyhow::ensure!(
            timeout <= MAX_SESSION_TIMEOUT_SECS,
            "session.timeout_secs is {timeout}, the maximum is {MAX_SESSION_TIMEOUT_SECS} (one year)"
        );
        Ok(())
    }

    /// Get the default config file path
    /// - macOS: ~/Library/Application Support/hospital-admin/config.toml
    /// - Linux: ~/.config/hospital-admin/config.toml
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hospital-admin")
            .join("config.toml")
    }

    /// Get the default data directory (database, logs)
    /// - macOS: ~/Library/Application Support/hospital-admin/
    /// - Linux: ~/.local/share/hospital-admin/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hospital-admin")
    }
}

/// Create a default configuration template
pub fn default_config_template() -> String {
    let data_dir = Config::default_data_dir();
    let data_dir_str = data_dir.display();

    format!(
        r#"# Hospital Admin Console Configuration
# Data directory: {data_dir_str}

[http]
listen_addr = "127.0.0.1:8080"

[session]
# How long an administrator stays signed in
timeout_secs = 28800

# =============================================================================
# Database Configuration
# =============================================================================
#
# The backend is selected at compile time via cargo features:
#   - cargo build -p hospital-admin --features sqlite (default)
#   - cargo build -p hospital-admin --features postgres --no-default-features

# SQLite configuration (when compiled with --features sqlite)
[database]
# path = "{data_dir_str}/hospital.db"  # Optional, defaults to data_dir/hospital.db

# PostgreSQL configuration (when compiled with --features postgres)
# [database]
# host = "localhost"
# port = 5432
# user = "hospital"
# password = "secret"
# database = "hospital"
"#
    )
}

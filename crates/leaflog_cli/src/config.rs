//! Configuration file management for leaflog.
//!
//! Provides a TOML config file at `~/.config/leaflog/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use leaflog_core::LogLevel;
use leaflog_http::ServeOptions;

pub const ENV_DB_PATH: &str = "LEAFLOG_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LEAFLOG_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LEAFLOG_LOG_DIR";
pub const ENV_BIND: &str = "LEAFLOG_BIND";
pub const ENV_PORT: &str = "LEAFLOG_PORT";

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub server: ServerSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub cors_origin: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the leaflog config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/leaflog` or `~/.config/leaflog`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("leaflog");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("leaflog")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Platform data directory for the database and logs.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("leaflog")
}

/// Load and parse a config file. A missing file yields `None`.
pub fn load_config(path: &Path) -> Result<Option<ConfigFile>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file at {}", path.display()))
        }
    };
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(Some(config))
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct ConfigFlags {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafLogConfig {
    pub db_path: PathBuf,
    pub log_level: LogLevel,
    pub log_dir: PathBuf,
    pub serve: ServeOptions,
}

impl LeafLogConfig {
    /// Resolve against the process environment and the user config file.
    pub fn resolve(flags: &ConfigFlags) -> Result<Self> {
        let file = load_config(&config_path())?.unwrap_or_default();
        let cwd = std::env::current_dir().context("failed to read current directory")?;
        Self::resolve_with(
            flags,
            |key| std::env::var(key).ok(),
            &file,
            &data_dir(),
            &cwd,
        )
    }

    /// Resolve with explicit sources.
    ///
    /// Relative paths are anchored at `cwd`.
    pub fn resolve_with(
        flags: &ConfigFlags,
        env: impl Fn(&str) -> Option<String>,
        file: &ConfigFile,
        data_dir: &Path,
        cwd: &Path,
    ) -> Result<Self> {
        let db_path = flags
            .db_path
            .clone()
            .or_else(|| env(ENV_DB_PATH).map(PathBuf::from))
            .or_else(|| file.database.path.clone())
            .unwrap_or_else(|| data_dir.join("leaflog.sqlite3"));

        let log_level = match flags
            .log_level
            .clone()
            .or_else(|| env(ENV_LOG_LEVEL))
            .or_else(|| file.logging.level.clone())
        {
            Some(raw) => raw
                .parse::<LogLevel>()
                .with_context(|| format!("invalid log level `{raw}`"))?,
            None => LogLevel::build_default(),
        };

        let log_dir = flags
            .log_dir
            .clone()
            .or_else(|| env(ENV_LOG_DIR).map(PathBuf::from))
            .or_else(|| file.logging.dir.clone())
            .unwrap_or_else(|| data_dir.join("logs"));

        let bind = flags
            .bind
            .clone()
            .or_else(|| env(ENV_BIND))
            .or_else(|| file.server.bind.clone())
            .unwrap_or_else(|| DEFAULT_BIND.to_string());

        let port = match flags.port {
            Some(port) => port,
            None => match env(ENV_PORT) {
                Some(raw) => raw
                    .trim()
                    .parse::<u16>()
                    .with_context(|| format!("{ENV_PORT} is not a valid port: `{raw}`"))?,
                None => file.server.port.unwrap_or(DEFAULT_PORT),
            },
        };

        let cors_origin = file
            .server
            .cors_origin
            .clone()
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        Ok(Self {
            db_path: anchor(cwd, db_path),
            log_level,
            log_dir: anchor(cwd, log_dir),
            serve: ServeOptions {
                bind,
                port,
                cors_origin,
            },
        })
    }
}

fn anchor(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

//! Environment-driven configuration.
//!
//! Every setting has a default so a bare `roster` starts a local server.

use roster_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const PORT_VAR: &str = "ROSTER_PORT";
pub const DB_PATH_VAR: &str = "ROSTER_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "ROSTER_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "ROSTER_LOG_DIR";
pub const UPLOAD_DIR_VAR: &str = "ROSTER_UPLOAD_DIR";
pub const PUBLIC_URL_VAR: &str = "ROSTER_PUBLIC_URL";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "roster.sqlite3";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_PUBLIC_URL: &str = "/uploads";

/// Runtime settings for the roster server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: PathBuf,
    /// URL prefix under which uploaded images are reachable.
    pub public_url: String,
}

impl Config {
    /// Loads settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read(PORT_VAR) {
            Some(raw) => raw.parse::<u16>().map_err(|err| ConfigError {
                key: PORT_VAR,
                value: raw.clone(),
                message: err.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            db_path: PathBuf::from(read(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_PATH.into())),
            log_level: read(LOG_LEVEL_VAR).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_VAR),
            upload_dir: PathBuf::from(
                read(UPLOAD_DIR_VAR).unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into()),
            ),
            public_url: read(PUBLIC_URL_VAR).unwrap_or_else(|| DEFAULT_PUBLIC_URL.into()),
        })
    }
}

/// An environment variable holds a value that cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} value `{}`: {}",
            self.key, self.value, self.message
        )
    }
}

impl Error for ConfigError {}

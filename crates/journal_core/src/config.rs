//! Runtime configuration for journal core.
//!
//! # Responsibility
//! - Resolve database path, logging settings and view limits from the
//!   process environment.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - `log_level` is always one of `trace|debug|info|warn|error`.
//! - `recent_limit` is always within `1..=RECENT_LIMIT_MAX`.

use crate::logging::{default_log_level, normalize_level};
use crate::organizer::RECENT_NOTES_DEFAULT_LIMIT;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "JOURNAL_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "JOURNAL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "JOURNAL_LOG_DIR";
pub const ENV_RECENT_LIMIT: &str = "JOURNAL_RECENT_LIMIT";

const DB_FILE_NAME: &str = "journal.sqlite3";
const RECENT_LIMIT_MAX: usize = 100;

/// Errors from configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable holds an unsupported value.
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid `{key}` value `{value}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// Rolling log directory. `None` keeps file logging disabled.
    pub log_dir: Option<PathBuf>,
    /// Default size of recent-notes views.
    pub recent_limit: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            recent_limit: RECENT_NOTES_DEFAULT_LIMIT,
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn resolve_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level =
                normalize_level(level.as_str()).map_err(|message| ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: level.clone(),
                    message,
                })?;
        }

        if let Some(dir) = read(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    value: dir.display().to_string(),
                    message: "log directory must be an absolute path".to_string(),
                });
            }
            config.log_dir = Some(dir);
        }

        if let Some(limit) = read(ENV_RECENT_LIMIT) {
            let parsed = limit
                .parse::<usize>()
                .map_err(|err| ConfigError::InvalidValue {
                    key: ENV_RECENT_LIMIT,
                    value: limit.clone(),
                    message: err.to_string(),
                })?;
            config.recent_limit = normalize_recent_limit(parsed);
        }

        Ok(config)
    }
}

fn normalize_recent_limit(limit: usize) -> usize {
    match limit {
        0 => RECENT_NOTES_DEFAULT_LIMIT,
        value if value > RECENT_LIMIT_MAX => RECENT_LIMIT_MAX,
        value => value,
    }
}

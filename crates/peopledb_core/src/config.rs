//! Runtime configuration for the people store.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Load overrides from `PEOPLEDB_*` environment variables.
//!
//! # Invariants
//! - Every field has a usable default; an empty environment yields an
//!   in-memory database with build-mode logging.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PEOPLEDB_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "PEOPLEDB_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "PEOPLEDB_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PEOPLEDB_LOG_DIR";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// Database location and connection tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// File logging setup. Logging stays off while `dir` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Invalid value found while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid configuration `{}`: {}", self.key, self.message)
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Builds a configuration from defaults plus `PEOPLEDB_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ENV_DB_PATH)) {
            config.database.path = Some(PathBuf::from(path));
        }
        if let Some(raw) = non_empty(lookup(ENV_BUSY_TIMEOUT_MS)) {
            config.database.busy_timeout_ms = raw.parse().map_err(|err| ConfigError {
                key: ENV_BUSY_TIMEOUT_MS,
                message: format!("expected milliseconds, got `{raw}`: {err}"),
            })?;
        }
        if let Some(level) = non_empty(lookup(ENV_LOG_LEVEL)) {
            config.logging.level = level;
        }
        if let Some(dir) = non_empty(lookup(ENV_LOG_DIR)) {
            config.logging.dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_LOG_DIR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert!(config.database.path.is_none());
        assert_eq!(config.database.busy_timeout_ms, 5_000);
    }

    #[test]
    fn environment_overrides_database_and_logging() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/people.db"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_LOG_DIR, "  /tmp/people-logs "),
        ]))
        .unwrap();

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/people.db")));
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.logging.dir, Some(PathBuf::from("/tmp/people-logs")));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = CoreConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "   ")])).unwrap();
        assert!(config.database.path.is_none());
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{ "database": { "path": "/var/lib/people.db" } }"#).unwrap();
        assert_eq!(
            config.database.path,
            Some(PathBuf::from("/var/lib/people.db"))
        );
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert_eq!(err.key, ENV_BUSY_TIMEOUT_MS);
        assert!(err.message.contains("soon"));
    }
}

//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use database::Database;
use preferences::DEFAULT_QUOTA_BYTES;

/// Catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// SQLite database URL.
    pub database_url: String,
    /// Preference file. `None` keeps preferences in memory.
    pub preferences_path: Option<PathBuf>,
    /// Load the built-in dataset when the table is first created.
    pub seed: bool,
    /// Byte quota for preference storage.
    pub storage_quota_bytes: usize,
    /// Database connection pool size.
    pub pool_size: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/halodex.db?mode=rwc".to_string(),
            preferences_path: Some(PathBuf::from("data/preferences.json")),
            seed: true,
            storage_quota_bytes: DEFAULT_QUOTA_BYTES,
            pool_size: Database::DEFAULT_POOL_SIZE,
        }
    }
}

impl CatalogConfig {
    /// Throwaway configuration: in-memory database and preferences.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            preferences_path: None,
            ..Self::default()
        }
    }

    /// Path of the database file, `None` for an in-memory database.
    pub fn database_file(&self) -> Option<PathBuf> {
        if self.database_url.contains(":memory:") || self.database_url.contains("mode=memory") {
            return None;
        }

        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))
            .unwrap_or(&self.database_url);
        let path = path.split('?').next().unwrap_or(path);

        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `HALODEX_DATABASE_URL` | SQLite database URL | `sqlite:data/halodex.db?mode=rwc` |
    /// | `HALODEX_PREFERENCES_PATH` | Preference file, or `:memory:` | `data/preferences.json` |
    /// | `HALODEX_SEED` | Seed the built-in dataset on first creation | `true` |
    /// | `HALODEX_STORAGE_QUOTA_BYTES` | Preference storage quota | `5242880` |
    /// | `HALODEX_DB_POOL_SIZE` | Database pool size | `5` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("HALODEX_DATABASE_URL").unwrap_or(defaults.database_url);

        let preferences_path = match lookup("HALODEX_PREFERENCES_PATH") {
            Some(path) if path == ":memory:" => None,
            Some(path) => Some(PathBuf::from(path)),
            None => defaults.preferences_path,
        };

        let seed = match lookup("HALODEX_SEED") {
            Some(value) => parse_bool("HALODEX_SEED", &value)?,
            None => defaults.seed,
        };

        let storage_quota_bytes = match lookup("HALODEX_STORAGE_QUOTA_BYTES") {
            Some(value) => parse_number("HALODEX_STORAGE_QUOTA_BYTES", &value)?,
            None => defaults.storage_quota_bytes,
        };

        let pool_size = match lookup("HALODEX_DB_POOL_SIZE") {
            Some(value) => parse_number("HALODEX_DB_POOL_SIZE", &value)?,
            None => defaults.pool_size,
        };

        Ok(Self {
            database_url,
            preferences_path,
            seed,
            storage_quota_bytes,
            pool_size,
        })
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a number (got {value:?})")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be true or false (got {value:?})")]
    InvalidBool { var: &'static str, value: String },
}

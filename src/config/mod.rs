//! Runtime configuration for the broker.
//!
//! Configuration is read from a TOML file in which every section is
//! optional, then selected values may be overridden from the environment:
//!
//! ```toml
//! [database]
//! url = "postgres://localhost/cursorlog"
//! pool_size = 8
//!
//! [fetch]
//! default_limit = 10
//! max_limit = 100
//!
//! [append]
//! attempts = 3
//! ```

use crate::broker::{
    adapters::postgres::BrokerPgPool,
    domain::{BrokerDomainError, FetchLimit},
};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding [`DatabaseConfig::url`].
pub const DATABASE_URL_ENV: &str = "CURSORLOG_DATABASE_URL";

/// Environment variable overriding [`DatabaseConfig::pool_size`].
pub const POOL_SIZE_ENV: &str = "CURSORLOG_POOL_SIZE";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[source] Box<toml::de::Error>),

    /// A value is out of range or inconsistent with another value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level broker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Fetch limit policy.
    pub fetch: FetchConfig,
    /// Append retry policy.
    pub append: AppendConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/cursorlog".to_owned(),
            pool_size: 8,
        }
    }
}

impl DatabaseConfig {
    /// Builds a connection pool for the configured database.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError`] when the pool cannot open its initial
    /// connections.
    pub fn build_pool(&self) -> Result<BrokerPgPool, PoolError> {
        Pool::builder()
            .max_size(self.pool_size)
            .build(ConnectionManager::<PgConnection>::new(self.url.as_str()))
    }
}

/// How many messages a single fetch may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Limit applied when the caller does not give one.
    pub default_limit: u32,
    /// Largest limit a caller may request.
    pub max_limit: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl FetchConfig {
    /// Resolves a caller-supplied limit, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerDomainError::InvalidFetchLimit`] for `0` or a value
    /// above `max_limit`.
    pub const fn resolve(&self, requested: Option<u32>) -> Result<FetchLimit, BrokerDomainError> {
        let value = match requested {
            Some(value) => value,
            None => self.default_limit,
        };
        FetchLimit::bounded(value, self.max_limit)
    }
}

/// Retry policy for appends that lose an index race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendConfig {
    /// Total attempts per append, including the first.
    pub attempts: u32,
}

impl Default for AppendConfig {
    fn default() -> Self {
        Self { attempts: 3 }
    }
}

impl BrokerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let contents = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|err| ConfigError::Parse(Box::new(err)))
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override cannot be parsed.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an override cannot be parsed.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            self.database.url = url;
        }
        if let Some(raw) = lookup(POOL_SIZE_ENV) {
            self.database.pool_size = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{POOL_SIZE_ENV} must be a positive integer, got {raw:?}"))
            })?;
        }
        Ok(self)
    }

    /// Checks values for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".to_owned()));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "database.pool_size must be at least 1".to_owned(),
            ));
        }
        if self.fetch.max_limit == 0 {
            return Err(ConfigError::Invalid(
                "fetch.max_limit must be at least 1".to_owned(),
            ));
        }
        if self.fetch.default_limit == 0 {
            return Err(ConfigError::Invalid(
                "fetch.default_limit must be at least 1".to_owned(),
            ));
        }
        if self.fetch.default_limit > self.fetch.max_limit {
            return Err(ConfigError::Invalid(format!(
                "fetch.default_limit ({}) exceeds fetch.max_limit ({})",
                self.fetch.default_limit, self.fetch.max_limit
            )));
        }
        if self.append.attempts == 0 {
            return Err(ConfigError::Invalid(
                "append.attempts must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns the append attempt count as a non-zero value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `append.attempts` is `0`.
    pub fn append_attempts(&self) -> Result<NonZeroU32, ConfigError> {
        NonZeroU32::new(self.append.attempts)
            .ok_or_else(|| ConfigError::Invalid("append.attempts must be at least 1".to_owned()))
    }
}

//! Applies the cursorlog schema to a `PostgreSQL` database.
//!
//! Usage:
//!
//! ```text
//! cursorlog_migrate [config-path]
//! ```
//!
//! Without a path the built-in defaults are used. In both cases
//! `CURSORLOG_DATABASE_URL` and `CURSORLOG_POOL_SIZE` override the
//! corresponding settings. The schema statements are idempotent, so the
//! command can run on every deployment. Set `RUST_LOG` to change log output;
//! the default is `cursorlog=info`.

use cursorlog::broker::adapters::postgres::apply_migrations;
use cursorlog::config::{BrokerConfig, ConfigError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
enum MigrateError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to connect to database: {0}")]
    Connect(#[from] diesel::r2d2::PoolError),
    #[error("failed to apply schema: {0}")]
    Schema(#[from] diesel::result::Error),
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cursorlog=info".parse()?))
        .init();

    let config_path = parse_args(std::env::args_os().map(PathBuf::from))?;
    run(config_path).map_err(Into::into)
}

fn parse_args(mut args: impl Iterator<Item = PathBuf>) -> Result<Option<PathBuf>, MigrateError> {
    let _program = args.next();
    let config_path = args.next();
    if let Some(extra) = args.next() {
        return Err(MigrateError::InvalidArgs(format!(
            "unexpected extra argument: {}",
            extra.display()
        )));
    }
    Ok(config_path)
}

fn load_config(config_path: Option<PathBuf>) -> Result<BrokerConfig, ConfigError> {
    let config = match config_path {
        Some(path) => BrokerConfig::load(path)?,
        None => BrokerConfig::default(),
    }
    .with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

fn run(config_path: Option<PathBuf>) -> Result<(), MigrateError> {
    let config = load_config(config_path)?;
    let pool = config.database.build_pool()?;
    let mut connection = pool.get()?;
    apply_migrations(&mut connection)?;
    info!(pool_size = config.database.pool_size, "migration complete");
    Ok(())
}

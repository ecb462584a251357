//! CLI command implementations.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

use tee_studio_storefront::config::{ConfigError, StorefrontConfig};
use tee_studio_storefront::db::{self, RepositoryError};

/// Pool size for one-shot commands.
const CLI_MAX_CONNECTIONS: u32 = 2;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Connect to the storefront database named by the environment.
async fn connect() -> Result<sqlx::PgPool, CommandError> {
    let config = StorefrontConfig::from_env()?;
    let database_url: SecretString = config.database_url.ok_or_else(|| {
        ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string())
    })?;

    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&database_url, CLI_MAX_CONNECTIONS).await?)
}

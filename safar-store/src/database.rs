use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::time::Duration;
use tracing::info;
use safar_core::CoreError;
use crate::app_config::DatabaseConfig;

const SCHEMA: &str = include_str!("schema.sql");

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Creates the active and trash tables when they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        info!("Ensuring database schema...");
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("Database schema ready.");
        Ok(())
    }
}

/// Maps a driver failure onto the storage error surfaced as a 500.
pub(crate) fn storage_err(err: sqlx::Error) -> CoreError {
    CoreError::Storage(err.to_string())
}

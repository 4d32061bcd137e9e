use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

pub type DbPool = PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Error)]
pub enum DbPoolError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migrate error: {0}")]
    Migrate(#[from] MigrateError),
}

/// Builds a pool without connecting; the first query opens the first connection.
pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<DbPool, DbPoolError> {
    Ok(PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy(database_url)?)
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), DbPoolError> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.iter().count(), "listing schema up to date");
    Ok(())
}

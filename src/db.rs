use crate::config::settings::Settings;
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

pub async fn create_pool(settings: &Settings) -> Result<PgPool> {
    tracing::info!(
        "Connecting to database: {}",
        settings.database.redacted_url()
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .min_connections(settings.database.min_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_seconds))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(3600))
        .connect_with(settings.database.url.expose_secret().parse()?)
        .await
        .context("Failed to create database connection pool")?;

    // Try to acquire a connection to verify the pool is working
    pool.acquire()
        .await
        .context("Failed to acquire initial database connection")?;

    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");
    Ok(())
}

// Error type for database errors
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
    #[error("Database error: {0}")]
    Other(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                DatabaseError::AlreadyExists
            }
            other => DatabaseError::Other(other),
        }
    }
}

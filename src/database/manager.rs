use sqlx::{postgres::PgPoolOptions, PgPool};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Could not connect to database after {attempts} attempts: {source}")]
    ConnectionExhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Owns startup concerns for the Postgres pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect with a fixed delay between attempts; gives up after `connect_retries` tries.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout));

        let attempts = config.connect_retries.max(1);
        let pool = retry_fixed(attempts, config.retry_delay(), |attempt| {
            let options = options.clone();
            let url = config.url.clone();
            async move {
                let result = options.connect(&url).await;
                if let Err(e) = &result {
                    warn!("Database connection attempt {}/{} failed: {}", attempt, attempts, e);
                }
                result
            }
        })
        .await
        .map_err(|source| DatabaseError::ConnectionExhausted { attempts, source })?;

        info!("Connected to database ({} max connections)", config.max_connections);
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }
}

/// Run `op` up to `attempts` times, sleeping `delay` between failures.
/// Returns the last error once attempts are exhausted.
pub async fn retry_fixed<T, E, F, Fut>(attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(_) => {
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

//! Async database connection pool implementation.
//!
//! Uses bb8 connection pool manager with diesel_async for PostgreSQL connections.

use std::time::Duration;

use diesel::{Connection, PgConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::config::DatabaseConfig;
use crate::error::{AppError, AppResult};

/// Async connection pool type alias.
///
/// bb8::Pool internally uses Arc, so Clone is cheap.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Creates the pool from configuration.
///
/// `pool_size` connections are kept idle and up to `max_overflow` more are
/// opened under load. Connections older than `recycle` seconds are replaced.
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.as_str());

    let pool = Pool::builder()
        .max_size(config.pool_size + config.max_overflow)
        .min_idle(Some(config.pool_size))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .max_lifetime(Some(Duration::from_secs(config.recycle)))
        .test_on_check_out(config.pre_ping)
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::new(e).context("failed to build database pool"),
        })?;

    tracing::info!(
        max_size = config.pool_size + config.max_overflow,
        min_idle = config.pool_size,
        "Database pool established"
    );

    Ok(pool)
}

/// Round-trips `SELECT 1` on a pooled connection.
pub async fn ping(pool: &AsyncDbPool) -> AppResult<()> {
    let mut conn = pool.get().await?;
    diesel::sql_query("SELECT 1")
        .execute(&mut conn)
        .await
        .map_err(|e| AppError::Database {
            operation: "ping".to_string(),
            source: e.into(),
        })?;
    Ok(())
}

/// What a migration run should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationAction {
    /// Apply every pending migration
    Apply,
    /// List pending migrations without touching the schema
    DryRun,
    /// Revert the most recent `n` migrations
    Rollback(u32),
}

/// Runs migrations on a dedicated blocking connection and returns the names
/// of the migrations that were applied, reverted, or are pending.
pub async fn run_migrations(database_url: &str, action: MigrationAction) -> AppResult<Vec<String>> {
    let url = database_url.to_string();

    tokio::task::spawn_blocking(move || -> AppResult<Vec<String>> {
        let mut conn = PgConnection::establish(&url).map_err(|e| AppError::Database {
            operation: "connect for migrations".to_string(),
            source: e.into(),
        })?;

        let migration_error = |operation: &str, e: Box<dyn std::error::Error + Send + Sync>| {
            AppError::Database {
                operation: operation.to_string(),
                source: anyhow::anyhow!(e),
            }
        };

        match action {
            MigrationAction::Apply => conn
                .run_pending_migrations(MIGRATIONS)
                .map(|applied| applied.iter().map(ToString::to_string).collect())
                .map_err(|e| migration_error("run migrations", e)),
            MigrationAction::DryRun => conn
                .pending_migrations(MIGRATIONS)
                .map(|pending| pending.iter().map(|m| m.name().to_string()).collect())
                .map_err(|e| migration_error("list pending migrations", e)),
            MigrationAction::Rollback(steps) => {
                let mut reverted = Vec::new();
                for _ in 0..steps {
                    let version = conn
                        .revert_last_migration(MIGRATIONS)
                        .map_err(|e| migration_error("revert migration", e))?;
                    reverted.push(version.to_string());
                }
                Ok(reverted)
            }
        }
    })
    .await
    .map_err(|e| AppError::Internal {
        source: anyhow::Error::new(e).context("migration task failed"),
    })?
}

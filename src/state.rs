//! Application state for Axum web framework.
//!
//! Contains shared services and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::api::middleware::Metrics;
use crate::config::{DatabaseBackend, Environment, JwtConfig, Settings};
use crate::db::{AsyncDbPool, MigrationAction, establish_async_connection_pool, run_migrations};
use crate::error::{AppError, AppResult};
use crate::rate_limit::RateLimiter;
use crate::repositories::Repositories;
use crate::services::Services;

/// Application state containing all shared services and resources.
///
/// Cloning is cheap: everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// `None` on the in-memory backend
    pub db_pool: Option<AsyncDbPool>,
    pub jwt_config: JwtConfig,
    pub settings: Arc<Settings>,
    pub environment: Environment,
    pub rate_limiter: RateLimiter,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Assembles state from already constructed parts.
    pub fn new(
        settings: Settings,
        environment: Environment,
        services: Services,
        db_pool: Option<AsyncDbPool>,
        rate_limiter: RateLimiter,
    ) -> AppResult<Self> {
        let metrics = Metrics::new(
            &settings.application.name,
            &settings.application.version,
            environment.as_str(),
            settings.metrics.excluded_paths.clone(),
        )?;

        Ok(Self {
            services,
            db_pool,
            jwt_config: settings.jwt.clone(),
            settings: Arc::new(settings),
            environment,
            rate_limiter,
            metrics: Arc::new(metrics),
        })
    }

    /// Builds everything the configuration asks for: the database pool (or
    /// in-memory repositories), pending migrations when `auto_migrate` is
    /// set, services and the rate-limit store.
    pub async fn build(settings: Settings, environment: Environment) -> AppResult<Self> {
        let (repos, db_pool) = match settings.database.backend {
            DatabaseBackend::Postgres => {
                if settings.database.auto_migrate {
                    let applied =
                        run_migrations(&settings.database.url, MigrationAction::Apply).await?;
                    tracing::info!(count = applied.len(), "Pending migrations applied");
                }
                let pool = establish_async_connection_pool(&settings.database).await?;
                (Repositories::postgres(pool.clone()), Some(pool))
            }
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory repositories; data is lost on restart");
                (Repositories::memory(), None)
            }
        };

        let services = Services::new(repos, &settings)?;
        let rate_limiter = RateLimiter::from_config(&settings.rate_limit, &settings.redis)
            .await
            .map_err(|e| AppError::Configuration {
                key: "rate_limit".to_string(),
                source: anyhow::Error::new(e),
            })?;

        Self::new(settings, environment, services, db_pool, rate_limiter)
    }
}

//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful shutdown.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::create_router;
use crate::config::{Environment, Settings};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
    environment: Environment,
}

impl Server {
    pub fn new(settings: Settings, environment: Environment) -> Self {
        Self {
            settings,
            environment,
        }
    }

    /// Logs the effective configuration without secrets.
    fn log_configuration(&self) {
        let s = &self.settings;
        tracing::info!(
            app_name = %s.application.name,
            app_version = %s.application.version,
            environment = %self.environment,
            "Application starting"
        );
        tracing::info!(
            host = %s.server.host,
            port = s.server.port,
            request_timeout = s.server.request_timeout,
            max_body_size = s.server.max_body_size,
            cors_origins = ?s.server.cors_origins,
            "Server configuration loaded"
        );
        tracing::info!(
            backend = ?s.database.backend,
            pool_size = s.database.pool_size,
            connection_timeout = s.database.connection_timeout,
            auto_migrate = s.database.auto_migrate,
            "Database configuration loaded"
        );
        tracing::info!(
            enabled = s.rate_limit.enabled,
            backend = ?s.rate_limit.backend,
            default_limits = ?s.rate_limit.default_limits,
            "Rate limit configuration loaded"
        );
        tracing::info!(
            algorithm = %s.jwt.algorithm,
            access_token_expiration = s.jwt.access_token_expiration,
            refresh_token_expiration = s.jwt.refresh_token_expiration,
            secret_configured = !s.jwt.secret.is_empty(),
            "JWT configuration loaded"
        );
        tracing::info!(
            upload_dir = %s.storage.upload_dir,
            metrics_enabled = s.metrics.enabled,
            webhook_secret_configured = !s.payments.webhook_secret.is_empty(),
            "Storage, metrics and payments configuration loaded"
        );
    }

    /// Start the server and run until a shutdown signal arrives.
    ///
    /// # Errors
    /// - Invalid JWT configuration
    /// - Database pool, migration or rate-limit store initialization errors
    /// - Address binding errors
    pub async fn run(self) -> AppResult<()> {
        self.log_configuration();

        self.settings.validate_for(self.environment)?;
        self.settings.jwt.validate().inspect_err(|e| {
            tracing::error!(error = %e, "JWT configuration validation failed");
        })?;

        let address = self.settings.server.address();
        let state = AppState::build(self.settings, self.environment).await?;
        tracing::info!("Application state created");

        let router = create_router(state);

        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            AppError::Internal {
                source: anyhow::Error::new(e).context(format!("failed to bind to {address}")),
            }
        })?;
        tracing::info!(address = %address, "Server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Waits for Ctrl+C or SIGTERM. A signal handler that cannot be installed
/// is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

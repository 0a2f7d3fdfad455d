//! Health check endpoint handlers.
//!
//! Health checks talk to the connection pool and the rate-limit store
//! directly instead of going through the service layer.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value as JsonValue, json};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus, overall_status};
use crate::db;
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Component health
/// - `GET /health/ready` - Readiness probe
/// - `GET /health/live` - Liveness probe
/// - `GET /ping` - Trivial reachability check
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
        .routes(routes!(ping))
}

/// Component health.
///
/// A failing rate-limit store only degrades the service since the limiter
/// lets requests through without it.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy or degraded", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut checks = BTreeMap::new();
    checks.insert("database".to_string(), check_database(&state).await);
    if state.settings.rate_limit.enabled {
        checks.insert(
            "rate_limit_store".to_string(),
            check_rate_limit_store(&state).await,
        );
    }

    let status = overall_status(checks.values());
    let response = HealthResponse {
        status,
        version: state.settings.application.version.clone(),
        environment: state.environment.as_str().to_string(),
        timestamp: jiff::Timestamp::now().to_string(),
        checks,
    };

    let code = match status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (code, Json(response))
}

/// Readiness probe: 503 until the database answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "Service is not ready")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    match check_database(&state).await.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Liveness probe; does not touch dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

#[utoipa::path(
    get,
    path = "/ping",
    responses(
        (status = 200, description = "Returns {\"ping\": \"pong\"}")
    ),
    tag = HEALTH_TAG
)]
pub async fn ping() -> Json<JsonValue> {
    Json(json!({ "ping": "pong" }))
}

async fn check_database(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let Some(pool) = &state.db_pool else {
        return ComponentHealth::healthy("In-memory backend", 0);
    };

    match db::ping(pool).await {
        Ok(()) => ComponentHealth::healthy("Connected", elapsed_ms(start)),
        Err(e) => {
            tracing::error!(error = %e.chain_message(), "Database health check failed");
            ComponentHealth::failing(
                HealthStatus::Unhealthy,
                format!("Connection failed: {e}"),
                elapsed_ms(start),
            )
        }
    }
}

async fn check_rate_limit_store(state: &AppState) -> ComponentHealth {
    let start = Instant::now();
    let store = state.rate_limiter.store();
    match store.ping().await {
        Ok(()) => ComponentHealth::healthy(store.backend_name(), elapsed_ms(start)),
        Err(e) => {
            tracing::warn!(error = %e, "Rate limit store health check failed");
            ComponentHealth::failing(HealthStatus::Degraded, e.to_string(), elapsed_ms(start))
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness_check() {
        assert_eq!(liveness_check().await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ping() {
        let Json(body) = ping().await;
        assert_eq!(body["ping"], "pong");
    }
}

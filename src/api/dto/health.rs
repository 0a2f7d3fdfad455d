//! Health check DTOs for API responses.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Health check response structure.
///
/// Provides information about the application's health status
/// and the components it depends on.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "status": "healthy",
    "version": "0.1.0",
    "environment": "production",
    "timestamp": "2026-01-01T12:00:00Z",
    "checks": {
        "database": {
            "status": "healthy",
            "message": "Connected",
            "response_time_ms": 5
        }
    }
}))]
pub struct HealthResponse {
    /// Overall health status
    pub status: HealthStatus,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = "production")]
    pub environment: String,
    /// Timestamp of the health check (RFC 3339)
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    /// Detailed checks for each component
    pub checks: BTreeMap<String, ComponentHealth>,
}

/// Health status enumeration, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some non-critical issues
    Degraded,
    /// Critical issues present
    Unhealthy,
}

/// Individual component health information.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    /// Optional message with details
    #[schema(example = "Connected")]
    pub message: Option<String>,
    /// Response time in milliseconds
    #[schema(example = 5)]
    pub response_time_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn healthy(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            message: Some(message.into()),
            response_time_ms: Some(elapsed_ms),
        }
    }

    pub fn failing(status: HealthStatus, message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            status,
            message: Some(message.into()),
            response_time_ms: Some(elapsed_ms),
        }
    }
}

/// The worst status among `checks`; healthy when there are none.
pub fn overall_status<'a>(checks: impl IntoIterator<Item = &'a ComponentHealth>) -> HealthStatus {
    checks
        .into_iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(HealthStatus::Healthy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
    }

    #[test]
    fn test_overall_status_takes_the_worst() {
        let checks = [
            ComponentHealth::healthy("Connected", 3),
            ComponentHealth::failing(HealthStatus::Degraded, "slow", 900),
        ];
        assert_eq!(overall_status(&checks), HealthStatus::Degraded);

        let down = [
            ComponentHealth::failing(HealthStatus::Degraded, "slow", 900),
            ComponentHealth::failing(HealthStatus::Unhealthy, "refused", 1),
        ];
        assert_eq!(overall_status(&down), HealthStatus::Unhealthy);
        assert_eq!(overall_status(&[]), HealthStatus::Healthy);
    }
}

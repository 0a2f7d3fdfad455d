//! Prometheus request metrics.
//!
//! Requests are labelled by the matched route template so cardinality stays
//! bounded; unmatched and excluded paths are not recorded.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder,
};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Registry and collectors shared through `AppState`.
pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    requests_in_progress: IntGaugeVec,
    excluded_paths: Vec<String>,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("excluded_paths", &self.excluded_paths)
            .finish_non_exhaustive()
    }
}

fn prometheus_error(e: prometheus::Error) -> AppError {
    AppError::Internal {
        source: anyhow::Error::new(e).context("metrics registry"),
    }
}

impl Metrics {
    pub fn new(
        app_name: &str,
        version: &str,
        environment: &str,
        excluded_paths: Vec<String>,
    ) -> AppResult<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests"),
            &["method", "endpoint", "status_code"],
        )
        .map_err(prometheus_error)?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "endpoint"],
        )
        .map_err(prometheus_error)?;
        let requests_in_progress = IntGaugeVec::new(
            Opts::new("http_requests_inprogress", "HTTP requests in progress"),
            &["method", "endpoint"],
        )
        .map_err(prometheus_error)?;
        let app_info = IntGaugeVec::new(
            Opts::new("app_info", "Application information"),
            &["name", "version", "environment"],
        )
        .map_err(prometheus_error)?;

        registry
            .register(Box::new(requests_total.clone()))
            .map_err(prometheus_error)?;
        registry
            .register(Box::new(request_duration.clone()))
            .map_err(prometheus_error)?;
        registry
            .register(Box::new(requests_in_progress.clone()))
            .map_err(prometheus_error)?;
        registry
            .register(Box::new(app_info.clone()))
            .map_err(prometheus_error)?;

        app_info
            .with_label_values(&[app_name, version, environment])
            .set(1);

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            requests_in_progress,
            excluded_paths,
        })
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn render(&self) -> AppResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(prometheus_error)?;
        String::from_utf8(buffer).map_err(|e| AppError::Internal {
            source: anyhow::Error::new(e),
        })
    }
}

pub async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string());
    let Some(endpoint) = endpoint.filter(|e| !state.metrics.is_excluded(e)) else {
        return next.run(request).await;
    };

    let metrics = &state.metrics;
    let method = request.method().as_str().to_string();
    let labels = [method.as_str(), endpoint.as_str()];

    let in_progress = metrics.requests_in_progress.with_label_values(&labels);
    in_progress.inc();
    let start = Instant::now();

    let response = next.run(request).await;

    in_progress.dec();
    metrics
        .request_duration
        .with_label_values(&labels)
        .observe(start.elapsed().as_secs_f64());
    metrics
        .requests_total
        .with_label_values(&[method.as_str(), endpoint.as_str(), response.status().as_str()])
        .inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_app_info() {
        let metrics = Metrics::new("patent-guard", "0.1.0", "test", vec![]).unwrap();
        let text = metrics.render().unwrap();
        assert!(text.contains("app_info"));
        assert!(text.contains("environment=\"test\""));
    }

    #[test]
    fn test_recorded_request_is_rendered() {
        let metrics = Metrics::new("patent-guard", "0.1.0", "test", vec![]).unwrap();
        metrics
            .requests_total
            .with_label_values(&["GET", "/api/documents/{id}", "200"])
            .inc();
        let text = metrics.render().unwrap();
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("endpoint=\"/api/documents/{id}\""));
    }

    #[test]
    fn test_excluded_prefixes() {
        let metrics =
            Metrics::new("a", "b", "c", vec!["/health".into(), "/metrics".into()]).unwrap();
        assert!(metrics.is_excluded("/health/ready"));
        assert!(metrics.is_excluded("/metrics"));
        assert!(!metrics.is_excluded("/api/checks"));
    }
}

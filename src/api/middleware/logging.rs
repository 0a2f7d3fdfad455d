//! Logging middleware for request/response tracing.
//!
//! Emits "Request started" at debug and one "Request completed" line at info
//! per request, and stamps `X-Process-Time` (seconds) on every response.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, Level, debug, error, info, span};

use super::RequestId;

pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Client address: first `X-Forwarded-For` hop, then `X-Real-IP`, then the
/// socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(String::from)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Socket peer, present when served with connect info.
pub fn peer_addr(request: &Request) -> Option<SocketAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().unwrap_or_default().to_string();
    let client = client_ip(request.headers(), peer_addr(&request));
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = span!(
        Level::INFO,
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id
    );

    async move {
        debug!(client = %client, query = %query, "Request started");

        let start = Instant::now();
        let mut response = next.run(request).await;
        let elapsed = start.elapsed();
        let status = response.status().as_u16();
        let duration_ms = (elapsed.as_secs_f64() * 100_000.0).round() / 100.0;

        info!(
            status,
            duration_ms,
            client = %client,
            query = %query,
            "Request completed"
        );
        if response.status().is_server_error() {
            error!(status, client = %client, "Request failed");
        }

        if let Ok(value) = HeaderValue::from_str(&format!("{:.3}", elapsed.as_secs_f64())) {
            response.headers_mut().insert(PROCESS_TIME_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

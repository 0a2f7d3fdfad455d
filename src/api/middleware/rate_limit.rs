//! Per-identity, per-route request limiting.
//!
//! Runs after optional auth so signed-in callers are counted as `user:{id}`
//! and everyone else as `ip:{addr}`. The address is the socket peer unless
//! that peer is a configured trusted proxy. Store failures let the request
//! through.

use std::net::IpAddr;

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AuthUser;
use super::logging::{client_ip, peer_addr};
use crate::error::AppError;
use crate::state::AppState;

pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Paths never counted.
const EXEMPT_PREFIXES: &[&str] = &["/health", "/ping", "/metrics", "/docs", "/api-docs"];

fn is_exempt(path: &str) -> bool {
    EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn identity(request: &Request, trusted_proxies: &[IpAddr]) -> String {
    if let Some(user) = request.extensions().get::<AuthUser>() {
        return format!("user:{}", user.user_id);
    }
    let peer = peer_addr(request);
    match peer {
        Some(addr) if trusted_proxies.contains(&addr.ip()) => {
            format!("ip:{}", client_ip(request.headers(), peer))
        }
        Some(addr) => format!("ip:{}", addr.ip()),
        None => "ip:unknown".to_string(),
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.settings.rate_limit.enabled || is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    // Unmatched paths share one bucket so random URLs cannot mint new keys
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "<unmatched>".to_string());
    let identity = identity(&request, &state.settings.rate_limit.trusted_proxies);

    let decision = match state.rate_limiter.check(&identity, &route).await {
        Ok(Some(decision)) => decision,
        Ok(None) => return next.run(request).await,
        Err(e) => {
            tracing::warn!(error = %e, route = %route, "Rate limit store unavailable, allowing request");
            return next.run(request).await;
        }
    };

    if !decision.allowed {
        tracing::warn!(
            identity = %identity,
            route = %route,
            limit = %decision.limit,
            retry_after = decision.reset_after,
            "Rate limit exceeded"
        );
        return AppError::RateLimited {
            limit: decision.limit.to_string(),
            retry_after: decision.reset_after,
        }
        .into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(LIMIT_HEADER, HeaderValue::from(decision.limit.count));
    headers.insert(REMAINING_HEADER, HeaderValue::from(decision.remaining));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::Request as HttpRequest;

    #[test]
    fn test_exempt_paths() {
        assert!(is_exempt("/health"));
        assert!(is_exempt("/health/ready"));
        assert!(is_exempt("/metrics"));
        assert!(is_exempt("/docs/index.html"));
        assert!(!is_exempt("/api/auth/login"));
    }

    fn request_from(peer: &str, forwarded_for: &str) -> HttpRequest<Body> {
        let mut request = HttpRequest::builder()
            .uri("/api/checks")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::empty())
            .unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        request
    }

    #[test]
    fn test_identity_prefers_authenticated_user() {
        let mut request = request_from("192.0.2.10:50000", "203.0.113.7");
        assert_eq!(identity(&request, &[]), "ip:192.0.2.10");

        request.extensions_mut().insert(AuthUser {
            user_id: 9,
            email: "a@b.c".into(),
            role: "user".into(),
        });
        assert_eq!(identity(&request, &[]), "user:9");
    }

    #[test]
    fn test_forwarded_headers_ignored_from_untrusted_peers() {
        let first = request_from("192.0.2.10:50000", "198.51.100.1");
        let second = request_from("192.0.2.10:50001", "198.51.100.2");
        assert_eq!(identity(&first, &[]), identity(&second, &[]));

        let other_proxy: IpAddr = "10.0.0.2".parse().unwrap();
        assert_eq!(identity(&first, &[other_proxy]), "ip:192.0.2.10");
    }

    #[test]
    fn test_forwarded_headers_honoured_from_trusted_proxy() {
        let proxy: IpAddr = "10.0.0.2".parse().unwrap();
        let request = request_from("10.0.0.2:41000", "203.0.113.7, 10.0.0.2");
        assert_eq!(identity(&request, &[proxy]), "ip:203.0.113.7");
    }

    #[test]
    fn test_identity_without_peer_is_shared() {
        let request = HttpRequest::builder()
            .uri("/api/checks")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(identity(&request, &[]), "ip:unknown");
    }
}

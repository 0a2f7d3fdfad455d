//! Router configuration for the API.
//!
//! Centralized route registration, OpenAPI assembly and the middleware stack.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    global_error_handler, handle_panic, logging_middleware, metrics_middleware,
    optional_auth_middleware, rate_limit_middleware, request_id_middleware,
};
use crate::config::ServerConfig;
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";
pub const SWAGGER_PATH: &str = "/docs";

/// Route groups under `/api`.
fn api_routes(state: &AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", handlers::auth::auth_routes(state.clone()))
        .nest("/users", handlers::users::user_routes(state.clone()))
        .nest("/documents", handlers::documents::document_routes(state.clone()))
        .nest("/check", handlers::checks::quick_check_routes(state.clone()))
        .nest("/checks", handlers::checks::check_routes(state.clone()))
        .nest("/payments", handlers::payments::payment_routes(state.clone()))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        // Credentials cannot be combined with a wildcard origin
        return CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(AllowMethods::any())
            .allow_headers(AllowHeaders::any());
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Layers run outermost first:
/// 1. request id
/// 2. metrics (when enabled)
/// 3. logging and `X-Process-Time`
/// 4. compression
/// 5. error body normalization
/// 6. panic recovery
/// 7. request timeout (408)
/// 8. CORS
/// 9. optional auth, so the rate limiter can key on the user
/// 10. rate limiting
/// 11. body size limit
///
/// Protected route groups add `auth_middleware` as a route layer.
pub fn create_router(state: AppState) -> Router {
    let settings = state.settings.clone();

    let mut app = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", api_routes(&state))
        .merge(handlers::health::health_routes());
    if settings.metrics.enabled {
        app = app.merge(handlers::metrics::metrics_routes());
    }

    let (router, openapi) = app.split_for_parts();
    let router = router
        .merge(SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, openapi))
        .layer(DefaultBodyLimit::max(settings.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .layer(cors_layer(&settings.server))
        .layer(TimeoutLayer::new(Duration::from_secs(
            settings.server.request_timeout,
        )))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(global_error_handler))
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(logging_middleware));

    let router = if settings.metrics.enabled {
        router.layer(middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
    } else {
        router
    };

    router
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_tags() {
        let doc = ApiDoc::openapi();
        let tags: Vec<String> = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(tags.contains(&"Documents".to_string()));
        assert!(tags.contains(&"Payments".to_string()));
    }

    #[test]
    fn test_wildcard_cors_does_not_panic() {
        let config = ServerConfig {
            cors_origins: vec!["*".to_string()],
            ..Default::default()
        };
        let _ = cors_layer(&config);

        let config = ServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string(), "bad\norigin".to_string()],
            ..Default::default()
        };
        let _ = cors_layer(&config);
    }
}

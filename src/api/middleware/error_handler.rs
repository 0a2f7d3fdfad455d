//! Error handler for converting AppError to HTTP responses.
//!
//! Every error leaves the service as the same JSON shape
//! (`{error, message, details, path, request_id}`). `AppError` renders the
//! first three; [`global_error_handler`] stamps `path` and `request_id` and
//! rewrites framework-generated plain-text errors.

use std::any::Any;

use axum::{
    Json,
    body::Body,
    extract::{
        Request,
        multipart::{MultipartError, MultipartRejection},
        rejection::{FormRejection, JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::AppError;

/// Error bodies larger than this are not inspected.
const MAX_ERROR_BODY: usize = 64 * 1024;

pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::UnprocessableContent { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        AppError::Database { .. } | AppError::Configuration { .. } | AppError::Internal { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::UnprocessableContent { .. } => "UNPROCESSABLE_CONTENT",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
        AppError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_SERVER_ERROR",
    }
}

/// Error kind used when only a status code is known.
fn status_to_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
        StatusCode::FORBIDDEN => "FORBIDDEN",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::REQUEST_TIMEOUT => "REQUEST_TIMEOUT",
        StatusCode::CONFLICT => "DUPLICATE_ENTRY",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_CONTENT",
        StatusCode::TOO_MANY_REQUESTS => "RATE_LIMIT_EXCEEDED",
        StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
        StatusCode::GATEWAY_TIMEOUT => "GATEWAY_TIMEOUT",
        s if s.is_server_error() => "INTERNAL_SERVER_ERROR",
        _ => "ERROR",
    }
}

fn default_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "The requested resource was not found",
        StatusCode::METHOD_NOT_ALLOWED => "HTTP method not allowed for this endpoint",
        StatusCode::REQUEST_TIMEOUT => "Request timed out",
        StatusCode::PAYLOAD_TOO_LARGE => "Request payload too large",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "Unsupported media type",
        s if s.is_server_error() => "An internal server error occurred",
        _ => "The request could not be processed",
    }
}

fn log_error(error: &AppError) {
    match error {
        AppError::NotFound { .. } => tracing::debug!(error = %error, "Resource not found"),
        e if e.is_server_error() || matches!(e, AppError::ConnectionPool { .. }) => {
            tracing::error!(error = %e.chain_message(), kind = error_to_code(e), "Request failed")
        }
        e => tracing::warn!(error = %e, kind = error_to_code(e), "Request rejected"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log_error(&self);
        let status = error_to_status_code(&self);
        let code = error_to_code(&self);

        let body = match &self {
            AppError::NotFound { entity, field, value } => {
                ErrorResponse::new(code, format!("{entity} with {field}={value} not found"))
            }
            AppError::Duplicate { entity, field, .. } => {
                ErrorResponse::new(code, format!("{entity} with this {field} already exists"))
                    .with_details(json!({ "field": field }))
            }
            AppError::Validation { field, reason } => ErrorResponse::new(code, reason.clone())
                .with_details(json!([{ "field": field, "message": reason }])),
            AppError::ValidationErrors { errors } => {
                ErrorResponse::new(code, "Request validation failed").with_details(json!(errors))
            }
            AppError::BadRequest { message }
            | AppError::UnprocessableContent { message }
            | AppError::Unauthorized { message }
            | AppError::Forbidden { message }
            | AppError::PayloadTooLarge { message } => ErrorResponse::new(code, message.clone()),
            AppError::RateLimited { limit, retry_after } => {
                ErrorResponse::new(code, format!("Rate limit exceeded: {limit}"))
                    .with_details(json!({ "limit": limit, "retry_after": retry_after }))
            }
            AppError::Database { operation, .. } => {
                ErrorResponse::new(code, format!("Database operation failed: {operation}"))
            }
            AppError::Configuration { key, .. } => {
                ErrorResponse::new(code, format!("Server misconfiguration: {key}"))
            }
            AppError::ConnectionPool { .. } => {
                ErrorResponse::new(code, "Database connection unavailable")
            }
            AppError::Internal { .. } => ErrorResponse::new(code, "An internal error occurred"),
        };

        let mut response = (status, Json(body)).into_response();
        match &self {
            AppError::Unauthorized { .. } => {
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
            }
            AppError::RateLimited { retry_after, .. } => {
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after));
            }
            _ => {}
        }
        response
    }
}

/// Maps an extractor rejection onto the error table by its status.
fn rejection_to_error(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge { message },
        StatusCode::UNPROCESSABLE_ENTITY => AppError::UnprocessableContent { message },
        s if s.is_server_error() => AppError::Internal {
            source: anyhow::anyhow!(message),
        },
        _ => AppError::BadRequest { message },
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        rejection_to_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        rejection_to_error(error.status(), error.body_text())
    }
}

/// Normalizes every error response into [`ErrorResponse`] and stamps it with
/// the request path and id.
///
/// JSON bodies already in the error shape are kept; anything else (axum's
/// plain-text rejections, 404/405 from the router, timeouts) is rebuilt from
/// the status code. Headers such as `Retry-After` survive.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());

    let response = next.run(request).await;
    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_ERROR_BODY)
        .await
        .unwrap_or_default();

    let mut error_body = serde_json::from_slice::<ErrorResponse>(&bytes).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(&bytes).trim().to_string();
        let message = if text.is_empty() || status.is_server_error() {
            default_message(status).to_string()
        } else {
            text
        };
        ErrorResponse::new(status_to_code(status), message)
    });
    if error_body.path.is_none() {
        error_body.path = Some(path);
    }
    if error_body.request_id.is_none() {
        error_body.request_id = request_id;
    }

    let encoded = serde_json::to_vec(&error_body).unwrap_or_default();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(encoded))
}

/// Panic handler for tower-http's `CatchPanicLayer`.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
            "INTERNAL_SERVER_ERROR",
            "An internal error occurred",
        )),
    )
        .into_response()
}

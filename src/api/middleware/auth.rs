//! JWT authentication middleware.
//!
//! `optional_auth_middleware` runs globally and only annotates the request;
//! `auth_middleware` guards protected route groups and `require_admin` sits
//! behind it on admin routes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{User, UserRole};
use crate::state::AppState;
use crate::utils::jwt::{Claims, validate_access_token};

/// Identity carried by a valid access token.
///
/// Added to request extensions and extracted in handlers with
/// `Extension<AuthUser>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin.as_str()
    }
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> AppResult<Self> {
        Ok(Self {
            user_id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// The authenticated user as loaded from storage by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Not authenticated"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header"))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format. Expected: Bearer <token>")
        })
}

/// Rejects with 401 unless the request carries a valid access token for an
/// existing user; 403 for deactivated users.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(request.headers())?;
    let claims = validate_access_token(token, &state.jwt_config)?;
    let auth_user = AuthUser::try_from(claims)?;

    let user = state.services.users.get_active_user(auth_user.user_id).await?;
    let auth_user = AuthUser {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
    };

    request.extensions_mut().insert(auth_user);
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Attaches [`AuthUser`] when a valid access token is present. Never rejects.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_user = bearer_token(request.headers())
        .ok()
        .and_then(|token| validate_access_token(token, &state.jwt_config).ok())
        .and_then(|claims| AuthUser::try_from(claims).ok());

    if let Some(auth_user) = auth_user {
        request.extensions_mut().insert(auth_user);
    }
    next.run(request).await
}

/// Must run after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> AppResult<Response> {
    let is_admin = request
        .extensions()
        .get::<CurrentUser>()
        .is_some_and(|CurrentUser(user)| user.is_admin());
    if !is_admin {
        return Err(AppError::forbidden("Admin privileges required"));
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::utils::jwt::{TokenType, encode_claims};
    use axum::http::HeaderValue;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_at_least_32_characters_long".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_auth_user_from_claims() {
        let claims = Claims::new(123, "test@example.com", "admin", TokenType::Access, 5);
        let auth_user = AuthUser::try_from(claims).unwrap();
        assert_eq!(auth_user.user_id, 123);
        assert_eq!(auth_user.email, "test@example.com");
        assert!(auth_user.is_admin());
    }

    #[test]
    fn test_auth_user_rejects_bad_subject() {
        let mut claims = Claims::new(1, "a@b.c", "user", TokenType::Access, 5);
        claims.sub = "not-a-number".into();
        assert!(matches!(
            AuthUser::try_from(claims),
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn test_expired_token_is_not_an_identity() {
        let config = config();
        let expired = Claims::new(1, "a@b.c", "user", TokenType::Access, -5);
        let token = encode_claims(&expired, &config).unwrap();
        assert!(validate_access_token(&token, &config).is_err());
    }
}

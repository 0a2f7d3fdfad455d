//! Authentication handlers for registration, login and token management.

use axum::{Extension, Json, extract::State, http::StatusCode, middleware};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    ErrorResponse, LoginForm, RefreshTokenRequest, RegisterRequest, TokenResponse, UserResponse,
};
use crate::api::middleware::{CurrentUser, auth_middleware};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::jwt::{generate_token_pair, validate_refresh_token};
use crate::utils::{ValidatedForm, ValidatedJson};

/// Creates the authentication routes
///
/// # Routes
/// - `POST /register` - Create an account
/// - `POST /login` - Exchange credentials for tokens
/// - `POST /refresh` - Exchange a refresh token for a new pair
/// - `GET /me` - The authenticated user
pub fn auth_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(refresh_token))
}

/// POST /api/auth/register - Register new user
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Invalid request data", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .services
        .users
        .register(&payload.email, &payload.password, payload.full_name)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/auth/login - Authenticate user
///
/// OAuth2 password flow: the email goes in `username`.
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Inactive user", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let user = state
        .services
        .users
        .authenticate(&form.username, &form.password)
        .await?;

    let tokens = generate_token_pair(user.id, &user.email, user.role.as_str(), &state.jwt_config)?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse::new(tokens, UserResponse::from(user))))
}

/// POST /api/auth/refresh - Refresh tokens
///
/// Validates the refresh token and issues a new access and refresh token.
#[utoipa::path(
    post,
    path = "/refresh",
    tag = AUTH_TAG,
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens refreshed", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse)
    )
)]
async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let claims = validate_refresh_token(&payload.refresh_token, &state.jwt_config)?;
    let user = state
        .services
        .users
        .get_active_user(claims.user_id()?)
        .await?;

    // Role and email come from storage, not the old token
    let tokens = generate_token_pair(user.id, &user.email, user.role.as_str(), &state.jwt_config)?;
    Ok(Json(TokenResponse::new(tokens, UserResponse::from(user))))
}

/// GET /api/auth/me - Current user
#[utoipa::path(
    get,
    path = "/me",
    tag = AUTH_TAG,
    responses(
        (status = 200, description = "Current user information", body = UserResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(
        ("bearerAuth" = [])
    )
)]
async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

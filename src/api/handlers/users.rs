//! Profile and user administration handlers.

use axum::{Extension, Json, extract::State, http::StatusCode, middleware};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{
    ChangePasswordRequest, ErrorResponse, Paginated, PaginationParams, UpdateProfileRequest,
    UserResponse,
};
use crate::api::middleware::{AuthUser, auth_middleware, require_admin};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

/// Creates user-related routes.
///
/// Routes:
/// - PATCH /me          - Update own profile
/// - DELETE /me         - Deactivate own account
/// - POST /me/password  - Change own password
/// - GET /              - List users (admin)
pub fn user_routes(state: AppState) -> OpenApiRouter<AppState> {
    let admin = OpenApiRouter::new()
        .routes(routes!(list_users))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    OpenApiRouter::new()
        .routes(routes!(update_me, delete_me))
        .routes(routes!(change_password))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .merge(admin)
}

/// PATCH /api/users/me - Update profile
#[utoipa::path(
    patch,
    path = "/me",
    tag = USER_TAG,
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Invalid request data", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn update_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .users
        .update_profile(auth_user.user_id, payload.email, payload.full_name)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// POST /api/users/me/password - Change password
#[utoipa::path(
    post,
    path = "/me/password",
    tag = USER_TAG,
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Current password is wrong", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn change_password(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .users
        .change_password(
            auth_user.user_id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/users/me - Deactivate account
///
/// The account is kept but can no longer authenticate.
#[utoipa::path(
    delete,
    path = "/me",
    tag = USER_TAG,
    responses(
        (status = 204, description = "Account deactivated")
    ),
    security(("bearerAuth" = []))
)]
async fn delete_me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<StatusCode> {
    state.services.users.deactivate(auth_user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/users - List users
#[utoipa::path(
    get,
    path = "/",
    tag = USER_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of users", body = Paginated<UserResponse>),
        (status = 403, description = "Admin privileges required", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn list_users(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page = state
        .services
        .users
        .list_users(params.offset(), params.limit())
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

//! Quick checks on pasted text and check history.

use axum::{
    Extension, Json,
    extract::{Path, State},
    middleware,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::CHECK_TAG;
use crate::api::dto::{CheckResponse, ErrorResponse, Paginated, PaginationParams, QuickCheckRequest};
use crate::api::middleware::{AuthUser, auth_middleware};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

/// `POST /quick`, mounted under `/api/check`.
pub fn quick_check_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(quick_check))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// `GET /` and `GET /{id}`, mounted under `/api/checks`.
pub fn check_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_checks))
        .routes(routes!(get_check))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// POST /api/check/quick - Check pasted text
#[utoipa::path(
    post,
    path = "/quick",
    tag = CHECK_TAG,
    request_body = QuickCheckRequest,
    responses(
        (status = 200, description = "Check result", body = CheckResponse),
        (status = 422, description = "Empty or oversized text", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn quick_check(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<QuickCheckRequest>,
) -> AppResult<Json<CheckResponse>> {
    let check = state
        .services
        .similarity
        .quick_check(auth_user.user_id, &payload.text, payload.options())
        .await?;
    Ok(Json(CheckResponse::from(check)))
}

/// GET /api/checks - Own checks, newest first
#[utoipa::path(
    get,
    path = "/",
    tag = CHECK_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "Page of checks", body = Paginated<CheckResponse>)
    ),
    security(("bearerAuth" = []))
)]
async fn list_checks(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PaginationParams>,
) -> AppResult<Json<Paginated<CheckResponse>>> {
    let page = state
        .services
        .similarity
        .list_checks(auth_user.user_id, params.offset(), params.limit())
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// GET /api/checks/{id} - Check detail
#[utoipa::path(
    get,
    path = "/{id}",
    tag = CHECK_TAG,
    params(("id" = i32, Path, description = "Check id")),
    responses(
        (status = 200, description = "Check", body = CheckResponse),
        (status = 404, description = "No such check", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_check(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<CheckResponse>> {
    let check = state
        .services
        .similarity
        .get_check(auth_user.user_id, id)
        .await?;
    Ok(Json(CheckResponse::from(check)))
}

//! Payment intents, history, refunds and the provider webhook.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    middleware,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PAYMENT_TAG;
use crate::api::dto::{
    CreateIntentRequest, ErrorResponse, IntentResponse, PaymentResponse, WebhookResponse,
};
use crate::api::middleware::{AuthUser, auth_middleware};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::ValidatedJson;

/// Header carrying `t=<unix>,v1=<hex hmac>`.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Creates payment routes. Everything except the webhook requires a bearer
/// token; the webhook authenticates by signature.
pub fn payment_routes(state: AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_intent))
        .routes(routes!(history))
        .routes(routes!(get_payment))
        .routes(routes!(refund))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
        .routes(routes!(webhook))
}

/// POST /api/payments/create-intent - Start a payment
#[utoipa::path(
    post,
    path = "/create-intent",
    tag = PAYMENT_TAG,
    request_body = CreateIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = IntentResponse),
        (status = 422, description = "Invalid amount or currency", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn create_intent(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateIntentRequest>,
) -> AppResult<Json<IntentResponse>> {
    let created = state
        .services
        .payments
        .create_intent(
            auth_user.user_id,
            payload.amount,
            &payload.currency,
            payload.description,
        )
        .await?;
    Ok(Json(IntentResponse::from(created)))
}

/// POST /api/payments/webhook - Provider notifications
///
/// Deliveries are deduplicated by event id; a replay is acknowledged with
/// `duplicate: true` and changes nothing.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = PAYMENT_TAG,
    request_body(content = String, description = "Raw event JSON", content_type = "application/json"),
    params(("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac-sha256>")),
    responses(
        (status = 200, description = "Event accepted", body = WebhookResponse),
        (status = 400, description = "Bad signature or payload", body = ErrorResponse)
    )
)]
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookResponse>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let outcome = state
        .services
        .payments
        .handle_webhook(&body, signature)
        .await?;
    Ok(Json(WebhookResponse::from(outcome)))
}

/// GET /api/payments/history - Own payments, newest first
#[utoipa::path(
    get,
    path = "/history",
    tag = PAYMENT_TAG,
    responses(
        (status = 200, description = "Payments", body = Vec<PaymentResponse>)
    ),
    security(("bearerAuth" = []))
)]
async fn history(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<PaymentResponse>>> {
    let payments = state.services.payments.history(auth_user.user_id).await?;
    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// GET /api/payments/{id} - Payment detail
#[utoipa::path(
    get,
    path = "/{id}",
    tag = PAYMENT_TAG,
    params(("id" = i32, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment", body = PaymentResponse),
        (status = 404, description = "No such payment", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn get_payment(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<PaymentResponse>> {
    let payment = state.services.payments.get(auth_user.user_id, id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

/// POST /api/payments/{id}/refund - Refund a succeeded payment
#[utoipa::path(
    post,
    path = "/{id}/refund",
    tag = PAYMENT_TAG,
    params(("id" = i32, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Refunded payment", body = PaymentResponse),
        (status = 400, description = "Payment is not refundable", body = ErrorResponse),
        (status = 404, description = "No such payment", body = ErrorResponse)
    ),
    security(("bearerAuth" = []))
)]
async fn refund(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<PaymentResponse>> {
    let payment = state.services.payments.refund(auth_user.user_id, id).await?;
    Ok(Json(PaymentResponse::from(payment)))
}

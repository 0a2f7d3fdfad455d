mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};

use common::{TestApp, WEBHOOK_SECRET, json_body};
use patent_guard::utils::signature::sign_payload;

fn webhook(payload: &Value, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/payments/webhook")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn signed(payload: &Value) -> Request<Body> {
    let now = jiff::Timestamp::now().as_second();
    let signature = sign_payload(WEBHOOK_SECRET, now, payload.to_string().as_bytes());
    webhook(payload, Some(signature))
}

async fn create_intent(app: &TestApp, token: &str) -> Value {
    let response = app
        .post_json(
            "/api/payments/create-intent",
            json!({ "amount": 1500, "currency": "USD", "description": "Priority search" }),
            Some(token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await
}

#[tokio::test]
async fn webhook_replay_is_a_no_op() {
    let app = TestApp::new().await;
    let token = app.signed_in("payer@example.com").await;
    let intent = create_intent(&app, &token).await;
    assert_eq!(intent["status"], "pending");
    assert_eq!(intent["currency"], "usd");

    let event = json!({
        "id": "evt_replayed",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": intent["payment_intent_id"] } }
    });

    let first = app.send(signed(&event)).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(json_body(first).await, json!({ "received": true, "duplicate": false }));

    let second = app.send(signed(&event)).await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await, json!({ "received": true, "duplicate": true }));

    let payment_id = intent["payment_id"].as_i64().unwrap();
    let payment = json_body(app.get(&format!("/api/payments/{payment_id}"), Some(&token)).await).await;
    assert_eq!(payment["status"], "succeeded");

    let history = json_body(app.get("/api/payments/history", Some(&token)).await).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_rejects_bad_signatures() {
    let app = TestApp::new().await;
    let event = json!({ "id": "evt_forged", "type": "payment_intent.succeeded", "data": {} });

    let response = app.send(webhook(&event, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let now = jiff::Timestamp::now().as_second();
    let forged = sign_payload("whsec_wrong", now, event.to_string().as_bytes());
    let response = app.send(webhook(&event, Some(forged))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let stale = sign_payload(WEBHOOK_SECRET, now - 3600, event.to_string().as_bytes());
    let response = app.send(webhook(&event, Some(stale))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn refund_only_after_success() {
    let app = TestApp::new().await;
    let token = app.signed_in("payer@example.com").await;
    let intent = create_intent(&app, &token).await;
    let payment_id = intent["payment_id"].as_i64().unwrap();
    let refund_uri = format!("/api/payments/{payment_id}/refund");

    let response = app.post_json(&refund_uri, json!({}), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let event = json!({
        "id": "evt_paid",
        "type": "payment_intent.succeeded",
        "data": { "object": { "id": intent["payment_intent_id"] } }
    });
    assert_eq!(app.send(signed(&event)).await.status(), StatusCode::OK);

    let response = app.post_json(&refund_uri, json!({}), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "refunded");
}

#[tokio::test]
async fn intent_validation() {
    let app = TestApp::new().await;
    let token = app.signed_in("payer@example.com").await;

    let response = app
        .post_json(
            "/api/payments/create-intent",
            json!({ "amount": 1500, "currency": "xyz" }),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .post_json(
            "/api/payments/create-intent",
            json!({ "amount": 1500, "currency": "usd" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

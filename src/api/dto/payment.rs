//! Payment DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Payment, PaymentStatus};
use crate::services::payments::{CreatedIntent, WebhookOutcome};

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateIntentRequest {
    /// Amount in the smallest currency unit
    #[validate(range(min = 1, message = "Amount must be positive"))]
    #[schema(example = 1999, minimum = 1)]
    pub amount: i64,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    #[schema(example = "usd")]
    pub currency: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IntentResponse {
    /// Handed to the client to confirm the payment with the provider
    pub client_secret: String,
    #[schema(example = "pi_3Nxyz")]
    pub payment_intent_id: String,
    pub payment_id: i32,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
}

impl From<CreatedIntent> for IntentResponse {
    fn from(created: CreatedIntent) -> Self {
        let payment = created.payment;
        Self {
            client_secret: created.client_secret,
            payment_intent_id: payment.external_id,
            payment_id: payment.id,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i32,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub external_id: String,
    pub description: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id,
            amount: payment.amount,
            currency: payment.currency,
            status: payment.status,
            external_id: payment.external_id,
            description: payment.description,
            created_at: payment.created_at.to_jiff().to_string(),
            updated_at: payment.updated_at.to_jiff().to_string(),
        }
    }
}

/// Acknowledgement returned to the provider.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookResponse {
    pub received: bool,
    /// `true` when the event id was already processed
    pub duplicate: bool,
}

impl From<WebhookOutcome> for WebhookResponse {
    fn from(outcome: WebhookOutcome) -> Self {
        Self {
            received: outcome.received,
            duplicate: outcome.duplicate,
        }
    }
}

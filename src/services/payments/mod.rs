//! Payments: intents, refunds and the provider webhook.
//!
//! Status only moves forward (`pending → succeeded | failed`,
//! `succeeded → refunded`) and every move is a compare-and-set in the
//! repository. Webhook events are applied first and recorded in the event
//! ledger afterwards: a recorded id is acknowledged without side effects, and
//! a delivery that died before recording is simply applied again, which the
//! compare-and-set moves make harmless.

mod event;
mod provider;

use std::sync::Arc;

pub use event::{EventKind, EventObject, ProviderEvent};
pub use provider::{IntentRequest, PaymentProvider, ProviderIntent, SandboxPaymentProvider};

use crate::config::PaymentsConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewPayment, Payment, PaymentStatus};
use crate::repositories::{PaymentRepository, UserRepository, WebhookEventRepository};
use crate::utils::signature::verify_signature;

/// A freshly created intent and its pending payment row.
#[derive(Debug, Clone)]
pub struct CreatedIntent {
    pub payment: Payment,
    pub client_secret: String,
}

/// Webhook acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebhookOutcome {
    pub received: bool,
    pub duplicate: bool,
}

#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    events: Arc<dyn WebhookEventRepository>,
    users: Arc<dyn UserRepository>,
    provider: Arc<dyn PaymentProvider>,
    config: PaymentsConfig,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        events: Arc<dyn WebhookEventRepository>,
        users: Arc<dyn UserRepository>,
        provider: Arc<dyn PaymentProvider>,
        config: PaymentsConfig,
    ) -> Self {
        Self {
            payments,
            events,
            users,
            provider,
            config,
        }
    }

    fn validate_intent(&self, amount: i64, currency: &str) -> AppResult<String> {
        if amount < self.config.min_amount || amount > self.config.max_amount {
            return Err(AppError::validation(
                "amount",
                format!(
                    "Amount must be between {} and {} minor units",
                    self.config.min_amount, self.config.max_amount
                ),
            ));
        }
        let currency = currency.trim().to_lowercase();
        if !self.config.currencies.iter().any(|c| c == &currency) {
            return Err(AppError::validation(
                "currency",
                format!(
                    "Unsupported currency, expected one of: {}",
                    self.config.currencies.join(", ")
                ),
            ));
        }
        Ok(currency)
    }

    pub async fn create_intent(
        &self,
        user_id: i32,
        amount: i64,
        currency: &str,
        description: Option<String>,
    ) -> AppResult<CreatedIntent> {
        let currency = self.validate_intent(amount, currency)?;
        let description = description.filter(|d| !d.trim().is_empty());

        let intent = self
            .provider
            .create_intent(IntentRequest {
                user_id,
                amount,
                currency: &currency,
                description: description.as_deref(),
            })
            .await?;

        let payment = self
            .payments
            .create(NewPayment {
                user_id,
                amount,
                currency,
                status: PaymentStatus::Pending,
                external_id: intent.id,
                description,
            })
            .await?;

        tracing::info!(
            payment_id = payment.id,
            user_id,
            amount,
            currency = %payment.currency,
            provider = self.provider.name(),
            "Payment intent created"
        );
        Ok(CreatedIntent {
            payment,
            client_secret: intent.client_secret,
        })
    }

    /// Newest first.
    pub async fn history(&self, user_id: i32) -> AppResult<Vec<Payment>> {
        self.payments.list_by_user(user_id).await
    }

    pub async fn get(&self, user_id: i32, payment_id: i32) -> AppResult<Payment> {
        self.payments
            .find_for_user(payment_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("payment", "id", payment_id))
    }

    /// Refunds a succeeded payment: provider first, then the status move.
    /// Concurrent attempts share one provider idempotency key, so at most one
    /// refund is issued and only one caller sees the status move.
    pub async fn refund(&self, user_id: i32, payment_id: i32) -> AppResult<Payment> {
        let payment = self.get(user_id, payment_id).await?;
        if payment.status != PaymentStatus::Succeeded {
            return Err(AppError::bad_request(format!(
                "Only succeeded payments can be refunded (status is {})",
                payment.status.as_str()
            )));
        }

        self.provider
            .refund(&payment.external_id, &refund_key(payment.id))
            .await?;

        let refunded = self
            .payments
            .transition(payment.id, PaymentStatus::Succeeded, PaymentStatus::Refunded)
            .await?
            .ok_or_else(|| AppError::bad_request("Payment is no longer refundable"))?;

        tracing::info!(payment_id, user_id, "Payment refunded");
        Ok(refunded)
    }

    /// Verifies, deduplicates and applies one provider delivery.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature_header: Option<&str>,
    ) -> AppResult<WebhookOutcome> {
        if self.config.webhook_secret.is_empty() {
            return Err(AppError::Configuration {
                key: "payments.webhook_secret".to_string(),
                source: anyhow::anyhow!("webhook secret is not configured"),
            });
        }
        let header = signature_header
            .ok_or_else(|| AppError::bad_request("Missing Stripe-Signature header"))?;
        verify_signature(
            payload,
            header,
            &self.config.webhook_secret,
            self.config.webhook_tolerance,
            jiff::Timestamp::now().as_second(),
        )?;

        let event: ProviderEvent = serde_json::from_slice(payload)
            .map_err(|e| AppError::bad_request(format!("Invalid webhook payload: {e}")))?;

        if self.events.exists(&event.id).await? {
            tracing::info!(event_id = %event.id, event_type = %event.event_type, "Duplicate webhook ignored");
            return Ok(WebhookOutcome {
                received: true,
                duplicate: true,
            });
        }

        // Nothing is recorded when applying fails, so the provider's retry
        // is processed
        self.apply(&event).await?;

        let first = self.events.record(&event.id, &event.event_type).await?;
        if !first {
            tracing::info!(event_id = %event.id, "Webhook delivered concurrently, already recorded");
        }
        Ok(WebhookOutcome {
            received: true,
            duplicate: !first,
        })
    }

    async fn apply(&self, event: &ProviderEvent) -> AppResult<()> {
        let kind = event.kind();
        if kind == EventKind::Other {
            tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Unhandled webhook event acknowledged");
            return Ok(());
        }

        let intent_id = event
            .intent_id()
            .ok_or_else(|| AppError::bad_request("Webhook event does not reference a payment intent"))?;
        let existing = self.payments.find_by_external_id(intent_id).await?;

        match (kind, existing) {
            (EventKind::IntentSucceeded, Some(payment)) => {
                self.advance(&payment, PaymentStatus::Pending, PaymentStatus::Succeeded)
                    .await
            }
            (EventKind::IntentSucceeded, None) => {
                self.record_external_success(intent_id, &event.data.object)
                    .await
            }
            (EventKind::IntentFailed, Some(payment)) => {
                self.advance(&payment, PaymentStatus::Pending, PaymentStatus::Failed)
                    .await
            }
            (EventKind::ChargeRefunded, Some(payment)) => {
                self.advance(&payment, PaymentStatus::Succeeded, PaymentStatus::Refunded)
                    .await
            }
            (_, None) => {
                tracing::warn!(event_id = %event.id, intent = intent_id, "Webhook for unknown payment ignored");
                Ok(())
            }
            (EventKind::Other, Some(_)) => Ok(()),
        }
    }

    /// Moves `payment` from `from` to `to`. A payment that already left
    /// `from` is logged and left alone.
    async fn advance(
        &self,
        payment: &Payment,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> AppResult<()> {
        if payment.status != from {
            tracing::info!(
                payment_id = payment.id,
                status = payment.status.as_str(),
                target = to.as_str(),
                "Payment transition no longer applies"
            );
            return Ok(());
        }

        match self.payments.transition(payment.id, from, to).await? {
            Some(updated) => tracing::info!(
                payment_id = updated.id,
                from = from.as_str(),
                to = to.as_str(),
                "Payment status updated"
            ),
            None => tracing::info!(
                payment_id = payment.id,
                target = to.as_str(),
                "Payment changed concurrently, transition skipped"
            ),
        }
        Ok(())
    }

    /// A success for an intent we never created, e.g. one made from the
    /// provider dashboard. Recorded when its metadata names a known user.
    async fn record_external_success(&self, intent_id: &str, object: &EventObject) -> AppResult<()> {
        let Some(user_id) = object.metadata_user_id() else {
            tracing::warn!(intent = intent_id, "Unknown intent without user metadata ignored");
            return Ok(());
        };
        if self.users.find_by_id(user_id).await?.is_none() {
            tracing::warn!(intent = intent_id, user_id, "Unknown intent for missing user ignored");
            return Ok(());
        }
        let (Some(amount), Some(currency)) = (object.amount, object.currency.as_deref()) else {
            tracing::warn!(intent = intent_id, "Unknown intent without amount or currency ignored");
            return Ok(());
        };

        let created = self
            .payments
            .create(NewPayment {
                user_id,
                amount,
                currency: currency.to_lowercase(),
                status: PaymentStatus::Succeeded,
                external_id: intent_id.to_string(),
                description: object.description.clone(),
            })
            .await;

        match created {
            Ok(payment) => {
                tracing::info!(payment_id = payment.id, user_id, intent = intent_id, "External payment recorded");
                Ok(())
            }
            Err(AppError::Duplicate { .. }) => {
                tracing::info!(intent = intent_id, "External payment already recorded");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Provider idempotency key for refunding `payment_id`.
fn refund_key(payment_id: i32) -> String {
    format!("refund-{payment_id}")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::models::{NewUser, UserRole};
    use crate::repositories::{
        MemoryPaymentRepository, MemoryUserRepository, MemoryWebhookEventRepository,
    };
    use crate::utils::signature::sign_payload;
    use async_trait::async_trait;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    struct Fixture {
        service: PaymentService,
        users: Arc<MemoryUserRepository>,
        provider: Arc<SandboxPaymentProvider>,
    }

    fn fixture() -> Fixture {
        fixture_with_events(Arc::new(MemoryWebhookEventRepository::new()))
    }

    fn fixture_with_events(events: Arc<dyn WebhookEventRepository>) -> Fixture {
        let users = Arc::new(MemoryUserRepository::new());
        let provider = Arc::new(SandboxPaymentProvider::new());
        let config = PaymentsConfig {
            webhook_secret: SECRET.to_string(),
            ..Default::default()
        };
        let service = PaymentService::new(
            Arc::new(MemoryPaymentRepository::new()),
            events,
            users.clone(),
            provider.clone(),
            config,
        );
        Fixture {
            service,
            users,
            provider,
        }
    }

    /// Ledger whose next `record` fails, as if the process died right after
    /// applying the event.
    #[derive(Default)]
    struct LedgerLostOnce {
        inner: MemoryWebhookEventRepository,
        lost: AtomicBool,
    }

    #[async_trait]
    impl WebhookEventRepository for LedgerLostOnce {
        async fn exists(&self, event_id: &str) -> AppResult<bool> {
            self.inner.exists(event_id).await
        }

        async fn record(&self, event_id: &str, event_type: &str) -> AppResult<bool> {
            if !self.lost.swap(true, Ordering::SeqCst) {
                return Err(AppError::Internal {
                    source: anyhow::anyhow!("ledger unavailable"),
                });
            }
            self.inner.record(event_id, event_type).await
        }
    }

    async fn user(repo: &MemoryUserRepository) -> i32 {
        repo.create(NewUser {
            email: "payer@example.com".into(),
            hashed_password: "x".into(),
            full_name: None,
            role: UserRole::User,
        })
        .await
        .unwrap()
        .id
    }

    fn signed(body: &serde_json::Value) -> (Vec<u8>, String) {
        let payload = serde_json::to_vec(body).unwrap();
        let header = sign_payload(SECRET, jiff::Timestamp::now().as_second(), &payload);
        (payload, header)
    }

    fn event(id: &str, kind: &str, object: serde_json::Value) -> serde_json::Value {
        json!({"id": id, "type": kind, "data": {"object": object}})
    }

    #[tokio::test]
    async fn test_create_intent_validates() {
        let f = fixture();
        let uid = user(&f.users).await;

        let created = f
            .service
            .create_intent(uid, 1_000, " USD ", Some("Pro plan".into()))
            .await
            .unwrap();
        assert_eq!(created.payment.status, PaymentStatus::Pending);
        assert_eq!(created.payment.currency, "usd");
        assert!(created.client_secret.starts_with(&created.payment.external_id));

        assert!(matches!(
            f.service.create_intent(uid, 1, "usd", None).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            f.service.create_intent(uid, 1_000, "xyz", None).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_webhook_replay_is_noop() {
        let f = fixture();
        let uid = user(&f.users).await;
        let created = f.service.create_intent(uid, 1_000, "usd", None).await.unwrap();
        let intent = created.payment.external_id.clone();

        let (payload, header) = signed(&event(
            "evt_1",
            "payment_intent.succeeded",
            json!({"id": intent}),
        ));
        let first = f.service.handle_webhook(&payload, Some(&header)).await.unwrap();
        assert!(!first.duplicate);
        assert_eq!(
            f.service.get(uid, created.payment.id).await.unwrap().status,
            PaymentStatus::Succeeded
        );

        // refund through the API, then replay the success event
        f.service.refund(uid, created.payment.id).await.unwrap();
        let second = f.service.handle_webhook(&payload, Some(&header)).await.unwrap();
        assert!(second.duplicate);
        assert_eq!(
            f.service.get(uid, created.payment.id).await.unwrap().status,
            PaymentStatus::Refunded
        );
    }

    #[tokio::test]
    async fn test_bad_signature_is_rejected() {
        let f = fixture();
        let (payload, _) = signed(&event("evt_1", "customer.created", json!({})));
        let forged = sign_payload("other", jiff::Timestamp::now().as_second(), &payload);

        assert!(matches!(
            f.service.handle_webhook(&payload, Some(&forged)).await,
            Err(AppError::BadRequest { .. })
        ));
        assert!(matches!(
            f.service.handle_webhook(&payload, None).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_and_out_of_order_events() {
        let f = fixture();
        let uid = user(&f.users).await;
        let created = f.service.create_intent(uid, 700, "eur", None).await.unwrap();
        let intent = created.payment.external_id.clone();

        // refund before success does not apply
        let (p, h) = signed(&event("evt_r", "charge.refunded", json!({"id": "ch_1", "payment_intent": intent})));
        f.service.handle_webhook(&p, Some(&h)).await.unwrap();
        assert_eq!(
            f.service.get(uid, created.payment.id).await.unwrap().status,
            PaymentStatus::Pending
        );

        let (p, h) = signed(&event("evt_f", "payment_intent.payment_failed", json!({"id": intent})));
        f.service.handle_webhook(&p, Some(&h)).await.unwrap();
        assert_eq!(
            f.service.get(uid, created.payment.id).await.unwrap().status,
            PaymentStatus::Failed
        );

        assert!(matches!(
            f.service.refund(uid, created.payment.id).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_intent_with_user_metadata_is_recorded() {
        let f = fixture();
        let uid = user(&f.users).await;
        let (p, h) = signed(&event(
            "evt_ext",
            "payment_intent.succeeded",
            json!({"id": "pi_external", "amount": 2500, "currency": "GBP",
                   "metadata": {"user_id": uid.to_string()}}),
        ));
        f.service.handle_webhook(&p, Some(&h)).await.unwrap();

        let history = f.service.history(uid).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, PaymentStatus::Succeeded);
        assert_eq!(history[0].currency, "gbp");
    }

    #[tokio::test]
    async fn test_other_users_payment_is_not_found() {
        let f = fixture();
        let uid = user(&f.users).await;
        let created = f.service.create_intent(uid, 1_000, "usd", None).await.unwrap();
        assert!(matches!(
            f.service.get(uid + 1, created.payment.id).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            f.service.refund(uid + 1, created.payment.id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_repeated_refund_reaches_provider_once() {
        let f = fixture();
        let uid = user(&f.users).await;
        let created = f.service.create_intent(uid, 1_000, "usd", None).await.unwrap();
        let (p, h) = signed(&event(
            "evt_ok",
            "payment_intent.succeeded",
            json!({"id": created.payment.external_id}),
        ));
        f.service.handle_webhook(&p, Some(&h)).await.unwrap();

        let (a, b) = tokio::join!(
            f.service.refund(uid, created.payment.id),
            f.service.refund(uid, created.payment.id),
        );
        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(f.provider.refunds_issued(), 1);

        // A caller that read `succeeded` before the move reuses the same key
        f.provider
            .refund(&created.payment.external_id, &refund_key(created.payment.id))
            .await
            .unwrap();
        assert_eq!(f.provider.refunds_issued(), 1);
    }

    #[tokio::test]
    async fn test_event_applied_but_not_recorded_is_reprocessed() {
        let f = fixture_with_events(Arc::new(LedgerLostOnce::default()));
        let uid = user(&f.users).await;
        let created = f.service.create_intent(uid, 1_000, "usd", None).await.unwrap();
        let (p, h) = signed(&event(
            "evt_lost",
            "payment_intent.succeeded",
            json!({"id": created.payment.external_id}),
        ));

        assert!(f.service.handle_webhook(&p, Some(&h)).await.is_err());
        assert_eq!(
            f.service.get(uid, created.payment.id).await.unwrap().status,
            PaymentStatus::Succeeded
        );

        // The provider retries: processed again without a second transition
        let retry = f.service.handle_webhook(&p, Some(&h)).await.unwrap();
        assert!(!retry.duplicate);
        let replay = f.service.handle_webhook(&p, Some(&h)).await.unwrap();
        assert!(replay.duplicate);
        assert_eq!(
            f.service.get(uid, created.payment.id).await.unwrap().status,
            PaymentStatus::Succeeded
        );
    }
}

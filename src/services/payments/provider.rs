//! Payment processor abstraction.
//!
//! The service only talks to a [`PaymentProvider`]; the sandbox implementation
//! stands in for a real processor and never moves money.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::error::AppResult;

/// Intent creation parameters, amounts in minor units.
#[derive(Debug, Clone)]
pub struct IntentRequest<'a> {
    pub user_id: i32,
    pub amount: i64,
    pub currency: &'a str,
    pub description: Option<&'a str>,
}

/// What the processor hands back for a new intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIntent {
    /// Processor-side id, recorded as the payment's external id
    pub id: String,
    /// Given to the client to confirm the payment
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_intent(&self, request: IntentRequest<'_>) -> AppResult<ProviderIntent>;

    /// Refunds a settled intent in full. Calls sharing an `idempotency_key`
    /// issue at most one refund.
    async fn refund(&self, external_id: &str, idempotency_key: &str) -> AppResult<()>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Generates processor-shaped ids locally.
#[derive(Debug, Clone, Default)]
pub struct SandboxPaymentProvider {
    /// idempotency key → refund id
    refunds: Arc<DashMap<String, String>>,
}

impl SandboxPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct refunds issued so far.
    pub fn refunds_issued(&self) -> usize {
        self.refunds.len()
    }

    fn random_token(len: usize) -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}

#[async_trait]
impl PaymentProvider for SandboxPaymentProvider {
    async fn create_intent(&self, request: IntentRequest<'_>) -> AppResult<ProviderIntent> {
        let id = format!("pi_{}", Self::random_token(24));
        let client_secret = format!("{}_secret_{}", id, Self::random_token(24));
        tracing::debug!(
            intent = %id,
            user_id = request.user_id,
            amount = request.amount,
            currency = request.currency,
            "Sandbox intent created"
        );
        Ok(ProviderIntent { id, client_secret })
    }

    async fn refund(&self, external_id: &str, idempotency_key: &str) -> AppResult<()> {
        match self.refunds.entry(idempotency_key.to_string()) {
            Entry::Occupied(entry) => {
                tracing::debug!(intent = external_id, refund = %entry.get(), "Sandbox refund replayed");
            }
            Entry::Vacant(entry) => {
                let id = format!("re_{}", Self::random_token(24));
                tracing::debug!(intent = external_id, refund = %id, "Sandbox refund issued");
                entry.insert(id);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sandbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sandbox_ids_have_processor_shape() {
        let provider = SandboxPaymentProvider::new();
        let request = IntentRequest {
            user_id: 1,
            amount: 500,
            currency: "usd",
            description: None,
        };
        let a = provider.create_intent(request.clone()).await.unwrap();
        let b = provider.create_intent(request).await.unwrap();

        assert!(a.id.starts_with("pi_"));
        assert_eq!(a.id.len(), 27);
        assert!(a.client_secret.starts_with(&format!("{}_secret_", a.id)));
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_refund_is_idempotent_per_key() {
        let provider = SandboxPaymentProvider::new();
        provider.refund("pi_a", "refund-1").await.unwrap();
        provider.refund("pi_a", "refund-1").await.unwrap();
        assert_eq!(provider.refunds_issued(), 1);

        provider.refund("pi_b", "refund-2").await.unwrap();
        assert_eq!(provider.refunds_issued(), 2);
    }
}

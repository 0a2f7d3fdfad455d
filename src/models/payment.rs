use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, utoipa::ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::PaymentStatus")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Allowed moves: pending → succeeded | failed, succeeded → refunded.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Succeeded)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Succeeded, PaymentStatus::Refunded)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Payment {
    pub id: i32,
    pub user_id: i32,
    /// Minor currency units (cents)
    pub amount: i64,
    /// Lowercase ISO 4217 code
    pub currency: String,
    pub status: PaymentStatus,
    /// Provider payment intent id
    pub external_id: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPayment {
    pub user_id: i32,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub external_id: String,
    pub description: Option<String>,
}

/// Idempotency ledger entry for a processed provider event.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::webhook_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WebhookEvent {
    pub event_id: String,
    pub event_type: String,
    pub processed_at: Timestamp,
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::webhook_events)]
pub struct NewWebhookEvent {
    pub event_id: String,
    pub event_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus::*;

    #[test]
    fn test_transitions_are_one_directional() {
        assert!(Pending.can_transition_to(Succeeded));
        assert!(Pending.can_transition_to(Failed));
        assert!(Succeeded.can_transition_to(Refunded));

        assert!(!Succeeded.can_transition_to(Pending));
        assert!(!Failed.can_transition_to(Succeeded));
        assert!(!Refunded.can_transition_to(Succeeded));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Succeeded.can_transition_to(Succeeded));
    }
}

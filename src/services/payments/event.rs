//! Provider event payloads as delivered to the webhook.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: EventObject,
}

/// The subset of intent and charge objects we act on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventObject {
    pub id: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub description: Option<String>,
    /// Set on charge objects
    pub payment_intent: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, JsonValue>,
}

impl EventObject {
    /// `metadata.user_id`, sent either as a string or a number.
    pub fn metadata_user_id(&self) -> Option<i32> {
        match self.metadata.get("user_id")? {
            JsonValue::String(s) => s.trim().parse().ok(),
            JsonValue::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    IntentSucceeded,
    IntentFailed,
    ChargeRefunded,
    Other,
}

impl ProviderEvent {
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            "payment_intent.succeeded" => EventKind::IntentSucceeded,
            "payment_intent.payment_failed" => EventKind::IntentFailed,
            "charge.refunded" => EventKind::ChargeRefunded,
            _ => EventKind::Other,
        }
    }

    /// The intent the event refers to: the object itself for intent events,
    /// `payment_intent` for charge events.
    pub fn intent_id(&self) -> Option<&str> {
        let object = &self.data.object;
        match self.kind() {
            EventKind::ChargeRefunded => object.payment_intent.as_deref(),
            _ => object.id.as_deref(),
        }
    }
}

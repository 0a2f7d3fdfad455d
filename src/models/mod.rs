mod check;
mod document;
mod payment;
mod user;

pub use check::{Check, CheckMode, NewCheck, SimilarityMatch};
pub use document::{Document, DocumentStatus, NewDocument};
pub use payment::{NewPayment, NewWebhookEvent, Payment, PaymentStatus, WebhookEvent};
pub use user::{NewUser, UpdateUser, User, UserRole};

use jiff_diesel::ToDiesel;

/// Current time in the representation the models carry.
pub fn db_now() -> jiff_diesel::Timestamp {
    jiff::Timestamp::now().to_diesel()
}

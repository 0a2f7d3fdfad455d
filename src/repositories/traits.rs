//! Storage seams. Services only see these traits, so the postgres and
//! in-memory backends are interchangeable.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Check, Document, NewCheck, NewDocument, NewPayment, NewUser, Payment, PaymentStatus,
    UpdateUser, User,
};

/// One page of rows plus the total row count across all pages.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Duplicate` if the email is taken.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, user_id: i32) -> AppResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Applies the set fields of `changes`; `None` if the user does not exist.
    async fn update(&self, user_id: i32, changes: UpdateUser) -> AppResult<Option<User>>;

    /// Ordered by id.
    async fn list(&self, offset: i64, limit: i64) -> AppResult<Page<User>>;
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, new_document: NewDocument) -> AppResult<Document>;

    /// Only returns the document if `user_id` owns it.
    async fn find_for_user(&self, document_id: i32, user_id: i32) -> AppResult<Option<Document>>;

    /// Newest first.
    async fn list_by_user(&self, user_id: i32, offset: i64, limit: i64)
    -> AppResult<Page<Document>>;

    /// Deletes an owned document and returns the removed row.
    async fn delete_for_user(&self, document_id: i32, user_id: i32)
    -> AppResult<Option<Document>>;
}

#[async_trait]
pub trait CheckRepository: Send + Sync {
    async fn create(&self, new_check: NewCheck) -> AppResult<Check>;

    async fn find_for_user(&self, check_id: i32, user_id: i32) -> AppResult<Option<Check>>;

    /// Newest first.
    async fn list_by_user(&self, user_id: i32, offset: i64, limit: i64) -> AppResult<Page<Check>>;

    /// Newest first.
    async fn list_by_document(&self, document_id: i32) -> AppResult<Vec<Check>>;

    /// Removes every check run against the document. Returns how many went.
    async fn delete_by_document(&self, document_id: i32) -> AppResult<usize>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Fails with `Duplicate` if `external_id` is already recorded.
    async fn create(&self, new_payment: NewPayment) -> AppResult<Payment>;

    async fn find_for_user(&self, payment_id: i32, user_id: i32) -> AppResult<Option<Payment>>;

    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>>;

    /// Newest first.
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Payment>>;

    /// Compare-and-set: moves the payment to `to` only while it is still in
    /// `from`. Returns `None` when the row was not in `from`.
    async fn transition(
        &self,
        payment_id: i32,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> AppResult<Option<Payment>>;
}

#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn exists(&self, event_id: &str) -> AppResult<bool>;

    /// Records the event id; `false` if it had already been recorded.
    async fn record(&self, event_id: &str, event_type: &str) -> AppResult<bool>;
}

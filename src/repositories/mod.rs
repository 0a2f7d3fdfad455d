//! Repository layer for data access operations.
//!
//! Each entity has an async trait with a postgres implementation (diesel-async
//! over the bb8 pool) and an in-memory one.

mod check_repo;
mod document_repo;
mod memory;
mod payment_repo;
mod traits;
mod user_repo;

use std::sync::Arc;

pub use check_repo::PgCheckRepository;
pub use document_repo::PgDocumentRepository;
pub use memory::{
    MemoryCheckRepository, MemoryDocumentRepository, MemoryPaymentRepository,
    MemoryUserRepository, MemoryWebhookEventRepository,
};
pub use payment_repo::{PgPaymentRepository, PgWebhookEventRepository};
pub use traits::{
    CheckRepository, DocumentRepository, Page, PaymentRepository, UserRepository,
    WebhookEventRepository,
};
pub use user_repo::PgUserRepository;

use crate::db::AsyncDbPool;

/// Aggregates all repositories for convenient access.
///
/// Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub checks: Arc<dyn CheckRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
}

impl Repositories {
    /// Postgres-backed repositories sharing one pool.
    pub fn postgres(pool: AsyncDbPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            documents: Arc::new(PgDocumentRepository::new(pool.clone())),
            checks: Arc::new(PgCheckRepository::new(pool.clone())),
            payments: Arc::new(PgPaymentRepository::new(pool.clone())),
            webhook_events: Arc::new(PgWebhookEventRepository::new(pool)),
        }
    }

    /// Process-local repositories; data is lost on restart.
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            documents: Arc::new(MemoryDocumentRepository::new()),
            checks: Arc::new(MemoryCheckRepository::new()),
            payments: Arc::new(MemoryPaymentRepository::new()),
            webhook_events: Arc::new(MemoryWebhookEventRepository::new()),
        }
    }
}

//! Service layer for business logic operations.
//!
//! Services encapsulate business logic and coordinate between
//! repositories and handlers.

mod document_service;
pub mod payments;
pub mod similarity;
pub mod storage;
mod user_service;

use std::sync::Arc;

pub use document_service::{DocumentService, UploadedFile};
pub use payments::{PaymentProvider, PaymentService, SandboxPaymentProvider};
pub use similarity::{CheckOptions, CorpusSimilarityEngine, SimilarityEngine, SimilarityService};
pub use storage::{DocumentStorage, LocalStorage};
pub use user_service::{UserService, normalize_email};

use crate::config::Settings;
use crate::error::AppResult;
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning only bumps reference counts.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub documents: DocumentService,
    pub similarity: SimilarityService,
    pub payments: PaymentService,
}

impl Services {
    /// Wires services over `repos` with local file storage, the configured
    /// patent corpus and the sandbox payment provider.
    pub fn new(repos: Repositories, settings: &Settings) -> AppResult<Self> {
        let engine = CorpusSimilarityEngine::load(settings.similarity.corpus_path.as_deref())?;
        Ok(Self::with_parts(
            repos,
            settings,
            Arc::new(LocalStorage::new(&settings.storage.upload_dir)),
            Arc::new(engine),
            Arc::new(SandboxPaymentProvider::new()),
        ))
    }

    pub fn with_parts(
        repos: Repositories,
        settings: &Settings,
        storage: Arc<dyn DocumentStorage>,
        engine: Arc<dyn SimilarityEngine>,
        provider: Arc<dyn PaymentProvider>,
    ) -> Self {
        Self {
            users: UserService::new(repos.users.clone()),
            documents: DocumentService::new(
                repos.documents.clone(),
                repos.checks.clone(),
                storage,
                settings.storage.clone(),
            ),
            similarity: SimilarityService::new(
                engine,
                repos.checks,
                repos.documents,
                settings.similarity.clone(),
            ),
            payments: PaymentService::new(
                repos.payments,
                repos.webhook_events,
                repos.users,
                provider,
                settings.payments.clone(),
            ),
        }
    }
}

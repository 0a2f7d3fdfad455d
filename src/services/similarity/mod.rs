//! Patent similarity checks.
//!
//! Text is scored against a patent corpus by a [`SimilarityEngine`]; every
//! run is persisted as a [`Check`] owned by the requesting user.

mod engine;
mod text;

use std::sync::Arc;

pub use engine::{CorpusSimilarityEngine, Patent, SimilarityEngine};

use crate::config::SimilarityConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Check, CheckMode, NewCheck};
use crate::repositories::{CheckRepository, DocumentRepository, Page};

/// Caller overrides; unset fields fall back to configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckOptions {
    pub mode: Option<CheckMode>,
    pub threshold: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct SimilarityService {
    engine: Arc<dyn SimilarityEngine>,
    checks: Arc<dyn CheckRepository>,
    documents: Arc<dyn DocumentRepository>,
    config: SimilarityConfig,
}

impl SimilarityService {
    pub fn new(
        engine: Arc<dyn SimilarityEngine>,
        checks: Arc<dyn CheckRepository>,
        documents: Arc<dyn DocumentRepository>,
        config: SimilarityConfig,
    ) -> Self {
        Self {
            engine,
            checks,
            documents,
            config,
        }
    }

    pub fn corpus_size(&self) -> usize {
        self.engine.corpus_size()
    }

    fn resolve(&self, options: CheckOptions) -> AppResult<(CheckMode, f64, usize)> {
        let threshold = options.threshold.unwrap_or(self.config.default_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AppError::validation(
                "threshold",
                "Threshold must be between 0 and 1",
            ));
        }
        let limit = options
            .limit
            .unwrap_or(self.config.default_limit)
            .clamp(1, self.config.max_limit.max(1));
        Ok((options.mode.unwrap_or_default(), threshold, limit))
    }

    async fn run(
        &self,
        user_id: i32,
        document_id: Option<i32>,
        text: String,
        options: CheckOptions,
    ) -> AppResult<Check> {
        let (mode, threshold, limit) = self.resolve(options)?;

        let engine = Arc::clone(&self.engine);
        let matches =
            tokio::task::spawn_blocking(move || engine.search(&text, mode, threshold, limit))
                .await
                .map_err(|e| AppError::Internal {
                    source: anyhow::Error::new(e).context("similarity search panicked"),
                })?;

        let check = self
            .checks
            .create(NewCheck::from_matches(
                user_id,
                document_id,
                mode,
                threshold,
                &matches,
            ))
            .await?;

        tracing::info!(
            check_id = check.id,
            user_id,
            ?document_id,
            ?mode,
            total_matches = check.total_matches,
            "Similarity check completed"
        );
        Ok(check)
    }

    /// Checks pasted text without a stored document.
    pub async fn quick_check(
        &self,
        user_id: i32,
        text: &str,
        options: CheckOptions,
    ) -> AppResult<Check> {
        if text.trim().is_empty() {
            return Err(AppError::validation("text", "Text cannot be empty"));
        }
        self.run(user_id, None, text.to_string(), options).await
    }

    /// Checks an owned document. A document without extracted text is 422.
    pub async fn check_document(
        &self,
        user_id: i32,
        document_id: i32,
        options: CheckOptions,
    ) -> AppResult<Check> {
        let document = self
            .documents
            .find_for_user(document_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("document", "id", document_id))?;

        let text = document
            .searchable_text()
            .ok_or_else(|| AppError::UnprocessableContent {
                message: format!("Document {document_id} has no extracted text to check"),
            })?
            .to_string();

        self.run(user_id, Some(document_id), text, options).await
    }

    pub async fn list_document_checks(
        &self,
        user_id: i32,
        document_id: i32,
    ) -> AppResult<Vec<Check>> {
        if self
            .documents
            .find_for_user(document_id, user_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("document", "id", document_id));
        }
        self.checks.list_by_document(document_id).await
    }

    pub async fn get_check(&self, user_id: i32, check_id: i32) -> AppResult<Check> {
        self.checks
            .find_for_user(check_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("check", "id", check_id))
    }

    pub async fn list_checks(&self, user_id: i32, offset: i64, limit: i64) -> AppResult<Page<Check>> {
        self.checks.list_by_user(user_id, offset, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentStatus, NewDocument};
    use crate::repositories::{MemoryCheckRepository, MemoryDocumentRepository};

    struct Fixture {
        service: SimilarityService,
        documents: Arc<MemoryDocumentRepository>,
    }

    fn fixture() -> Fixture {
        let documents = Arc::new(MemoryDocumentRepository::new());
        let service = SimilarityService::new(
            Arc::new(CorpusSimilarityEngine::bundled().unwrap()),
            Arc::new(MemoryCheckRepository::new()),
            documents.clone(),
            SimilarityConfig::default(),
        );
        Fixture { service, documents }
    }

    async fn document(repo: &MemoryDocumentRepository, user_id: i32, text: Option<&str>) -> i32 {
        repo.create(NewDocument {
            user_id,
            title: "doc".into(),
            description: None,
            filename: "doc.txt".into(),
            content_type: "text/plain".into(),
            size_bytes: 10,
            storage_path: format!("{user_id}/doc.txt"),
            extracted_text: text.map(str::to_string),
            status: if text.is_some() {
                DocumentStatus::Completed
            } else {
                DocumentStatus::Pending
            },
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_quick_check_persists_result() {
        let f = fixture();
        let check = f
            .service
            .quick_check(
                1,
                "wind turbine rotor blade with serrated trailing edge",
                CheckOptions {
                    mode: Some(CheckMode::Accurate),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(check.total_matches >= 1);
        assert_eq!(check.match_list()[0].patent_number, "US10100001B2");
        assert!(check.max_similarity <= 1.0);
        assert_eq!(f.service.get_check(1, check.id).await.unwrap().id, check.id);
        assert!(matches!(
            f.service.get_check(2, check.id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_threshold_and_empty_text() {
        let f = fixture();
        let bad = CheckOptions {
            threshold: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(
            f.service.quick_check(1, "rotor", bad).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            f.service.quick_check(1, "  ", CheckOptions::default()).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_document_without_text_is_unprocessable() {
        let f = fixture();
        let id = document(&f.documents, 1, None).await;
        assert!(matches!(
            f.service.check_document(1, id, CheckOptions::default()).await,
            Err(AppError::UnprocessableContent { .. })
        ));
    }

    #[tokio::test]
    async fn test_document_checks_are_owner_scoped() {
        let f = fixture();
        let id = document(&f.documents, 1, Some("battery pack cooling plates coolant")).await;

        let check = f
            .service
            .check_document(1, id, CheckOptions::default())
            .await
            .unwrap();
        assert_eq!(check.document_id, Some(id));

        assert_eq!(f.service.list_document_checks(1, id).await.unwrap().len(), 1);
        assert!(matches!(
            f.service.list_document_checks(2, id).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            f.service.check_document(2, id, CheckOptions::default()).await,
            Err(AppError::NotFound { .. })
        ));
        assert_eq!(f.service.list_checks(1, 0, 20).await.unwrap().total, 1);
    }
}

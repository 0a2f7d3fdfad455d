//! Document uploads and their lifecycle.

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Document, DocumentStatus, NewDocument};
use crate::repositories::{CheckRepository, DocumentRepository, Page};
use crate::services::storage::DocumentStorage;

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lowercased extension without the dot.
    pub fn extension(&self) -> Option<String> {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Text is only extracted inline for plain text; other formats stay pending.
fn extract_text(extension: &str, bytes: &[u8]) -> (Option<String>, DocumentStatus) {
    if extension != "txt" {
        return (None, DocumentStatus::Pending);
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => (Some(text.to_string()), DocumentStatus::Completed),
        Err(_) => (None, DocumentStatus::Failed),
    }
}

#[derive(Clone)]
pub struct DocumentService {
    repo: Arc<dyn DocumentRepository>,
    checks: Arc<dyn CheckRepository>,
    storage: Arc<dyn DocumentStorage>,
    config: StorageConfig,
}

impl DocumentService {
    pub fn new(
        repo: Arc<dyn DocumentRepository>,
        checks: Arc<dyn CheckRepository>,
        storage: Arc<dyn DocumentStorage>,
        config: StorageConfig,
    ) -> Self {
        Self {
            repo,
            checks,
            storage,
            config,
        }
    }

    fn validate_upload(&self, title: &str, file: &UploadedFile) -> AppResult<String> {
        if title.trim().is_empty() {
            return Err(AppError::validation("title", "Title cannot be empty"));
        }
        if file.bytes.is_empty() {
            return Err(AppError::validation("file", "File is empty"));
        }
        if file.bytes.len() > self.config.max_file_size {
            return Err(AppError::PayloadTooLarge {
                message: format!(
                    "file is {} bytes, limit is {} bytes",
                    file.bytes.len(),
                    self.config.max_file_size
                ),
            });
        }

        let extension = file
            .extension()
            .filter(|ext| self.config.allowed_extensions.iter().any(|a| a == ext))
            .ok_or_else(|| {
                AppError::validation(
                    "file",
                    format!(
                        "File type not allowed, expected one of: {}",
                        self.config.allowed_extensions.join(", ")
                    ),
                )
            })?;
        Ok(extension)
    }

    pub async fn upload(
        &self,
        user_id: i32,
        title: String,
        description: Option<String>,
        file: UploadedFile,
    ) -> AppResult<Document> {
        let extension = self.validate_upload(&title, &file)?;
        let storage_path = self.storage.save(user_id, &extension, &file.bytes).await?;
        let (extracted_text, status) = extract_text(&extension, &file.bytes);

        let new_document = NewDocument {
            user_id,
            title: title.trim().to_string(),
            description: description.filter(|d| !d.trim().is_empty()),
            content_type: file
                .content_type
                .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
                .unwrap_or_else(|| content_type_for(&extension).to_string()),
            filename: file.filename,
            size_bytes: file.bytes.len() as i64,
            storage_path: storage_path.clone(),
            extracted_text,
            status,
        };

        match self.repo.create(new_document).await {
            Ok(document) => {
                tracing::info!(
                    document_id = document.id,
                    user_id,
                    size = document.size_bytes,
                    status = ?document.status,
                    "Document uploaded"
                );
                Ok(document)
            }
            Err(e) => {
                // Do not leave an orphaned file behind a failed insert
                if let Err(cleanup) = self.storage.delete(&storage_path).await {
                    tracing::warn!(path = %storage_path, error = %cleanup, "Failed to remove orphaned upload");
                }
                Err(e)
            }
        }
    }

    pub async fn list(&self, user_id: i32, offset: i64, limit: i64) -> AppResult<Page<Document>> {
        self.repo.list_by_user(user_id, offset, limit).await
    }

    /// Another user's document is reported as missing.
    pub async fn get(&self, user_id: i32, document_id: i32) -> AppResult<Document> {
        self.repo
            .find_for_user(document_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("document", "id", document_id))
    }

    /// Deletes the record and its checks, then the stored file on a
    /// best-effort basis.
    pub async fn delete(&self, user_id: i32, document_id: i32) -> AppResult<()> {
        let document = self
            .repo
            .delete_for_user(document_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("document", "id", document_id))?;
        let removed_checks = self.checks.delete_by_document(document_id).await?;

        if let Err(e) = self.storage.delete(&document.storage_path).await {
            tracing::warn!(
                document_id,
                path = %document.storage_path,
                error = %e,
                "Stored file could not be removed"
            );
        }

        tracing::info!(document_id, user_id, removed_checks, "Document deleted");
        Ok(())
    }
}

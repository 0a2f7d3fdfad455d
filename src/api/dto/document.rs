//! Document DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Document, DocumentStatus};

/// Shape of the multipart upload, for the OpenAPI document only.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct DocumentUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    #[schema(example = "Blade tip design notes")]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "notes.txt")]
    pub filename: String,
    #[schema(example = "text/plain")]
    pub content_type: String,
    pub size_bytes: i64,
    pub status: DocumentStatus,
    /// Whether text was extracted and the document can be checked
    pub has_text: bool,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            has_text: document.searchable_text().is_some(),
            id: document.id,
            title: document.title,
            description: document.description,
            filename: document.filename,
            content_type: document.content_type,
            size_bytes: document.size_bytes,
            status: document.status,
            created_at: document.created_at.to_jiff().to_string(),
        }
    }
}

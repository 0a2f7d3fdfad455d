use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff_diesel::Timestamp;
use serde::{Deserialize, Serialize};

/// Processing state of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, utoipa::ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::DocumentStatus")]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Document {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Name as uploaded by the client
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Location inside the storage backend
    pub storage_path: String,
    pub extracted_text: Option<String>,
    pub status: DocumentStatus,
    pub created_at: Timestamp,
}

impl Document {
    /// Extracted text if there is any non-blank content to compare.
    pub fn searchable_text(&self) -> Option<&str> {
        self.extracted_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::documents)]
pub struct NewDocument {
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub storage_path: String,
    pub extracted_text: Option<String>,
    pub status: DocumentStatus,
}

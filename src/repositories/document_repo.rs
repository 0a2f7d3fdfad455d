//! Document repository for async database operations.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Document, NewDocument};
use crate::repositories::traits::{DocumentRepository, Page};

#[derive(Clone)]
pub struct PgDocumentRepository {
    pool: AsyncDbPool,
}

impl PgDocumentRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn create(&self, new_document: NewDocument) -> AppResult<Document> {
        use crate::schema::documents::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(documents)
            .values(&new_document)
            .returning(Document::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_for_user(&self, document_id: i32, owner_id: i32) -> AppResult<Option<Document>> {
        use crate::schema::documents::dsl::*;
        let mut conn = self.pool.get().await?;

        documents
            .filter(id.eq(document_id))
            .filter(user_id.eq(owner_id))
            .select(Document::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list_by_user(
        &self,
        owner_id: i32,
        offset: i64,
        limit: i64,
    ) -> AppResult<Page<Document>> {
        use crate::schema::documents::dsl::*;
        let mut conn = self.pool.get().await?;

        let total = documents
            .filter(user_id.eq(owner_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        let items = documents
            .filter(user_id.eq(owner_id))
            .select(Document::as_select())
            .order((created_at.desc(), id.desc()))
            .offset(offset)
            .limit(limit)
            .load(&mut conn)
            .await?;

        Ok(Page { items, total })
    }

    async fn delete_for_user(
        &self,
        document_id: i32,
        owner_id: i32,
    ) -> AppResult<Option<Document>> {
        use crate::schema::documents::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(documents.filter(id.eq(document_id)).filter(user_id.eq(owner_id)))
            .returning(Document::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}

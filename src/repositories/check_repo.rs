//! Similarity check repository. Checks are never updated; they go away
//! with their document.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Check, NewCheck};
use crate::repositories::traits::{CheckRepository, Page};

#[derive(Clone)]
pub struct PgCheckRepository {
    pool: AsyncDbPool,
}

impl PgCheckRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckRepository for PgCheckRepository {
    async fn create(&self, new_check: NewCheck) -> AppResult<Check> {
        use crate::schema::checks::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(checks)
            .values(&new_check)
            .returning(Check::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_for_user(&self, check_id: i32, owner_id: i32) -> AppResult<Option<Check>> {
        use crate::schema::checks::dsl::*;
        let mut conn = self.pool.get().await?;

        checks
            .filter(id.eq(check_id))
            .filter(user_id.eq(owner_id))
            .select(Check::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list_by_user(&self, owner_id: i32, offset: i64, limit: i64) -> AppResult<Page<Check>> {
        use crate::schema::checks::dsl::*;
        let mut conn = self.pool.get().await?;

        let total = checks
            .filter(user_id.eq(owner_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await?;
        let items = checks
            .filter(user_id.eq(owner_id))
            .select(Check::as_select())
            .order((created_at.desc(), id.desc()))
            .offset(offset)
            .limit(limit)
            .load(&mut conn)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_by_document(&self, doc_id: i32) -> AppResult<Vec<Check>> {
        use crate::schema::checks::dsl::*;
        let mut conn = self.pool.get().await?;

        checks
            .filter(document_id.eq(doc_id))
            .select(Check::as_select())
            .order((created_at.desc(), id.desc()))
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    /// Usually a no-op: the foreign key already cascades.
    async fn delete_by_document(&self, doc_id: i32) -> AppResult<usize> {
        use crate::schema::checks::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::delete(checks.filter(document_id.eq(doc_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }
}

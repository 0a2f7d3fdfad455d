//! Payment and webhook-ledger repositories.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewPayment, NewWebhookEvent, Payment, PaymentStatus};
use crate::repositories::traits::{PaymentRepository, WebhookEventRepository};

#[derive(Clone)]
pub struct PgPaymentRepository {
    pool: AsyncDbPool,
}

impl PgPaymentRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn create(&self, new_payment: NewPayment) -> AppResult<Payment> {
        use crate::schema::payments::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::insert_into(payments)
            .values(&new_payment)
            .returning(Payment::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn find_for_user(&self, payment_id: i32, owner_id: i32) -> AppResult<Option<Payment>> {
        use crate::schema::payments::dsl::*;
        let mut conn = self.pool.get().await?;

        payments
            .filter(id.eq(payment_id))
            .filter(user_id.eq(owner_id))
            .select(Payment::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn find_by_external_id(&self, ext_id: &str) -> AppResult<Option<Payment>> {
        use crate::schema::payments::dsl::*;
        let mut conn = self.pool.get().await?;

        payments
            .filter(external_id.eq(ext_id))
            .select(Payment::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }

    async fn list_by_user(&self, owner_id: i32) -> AppResult<Vec<Payment>> {
        use crate::schema::payments::dsl::*;
        let mut conn = self.pool.get().await?;

        payments
            .filter(user_id.eq(owner_id))
            .select(Payment::as_select())
            .order((created_at.desc(), id.desc()))
            .load(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn transition(
        &self,
        payment_id: i32,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> AppResult<Option<Payment>> {
        use crate::schema::payments::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::update(payments.filter(id.eq(payment_id)).filter(status.eq(from)))
            .set(status.eq(to))
            .returning(Payment::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(AppError::from)
    }
}

#[derive(Clone)]
pub struct PgWebhookEventRepository {
    pool: AsyncDbPool,
}

impl PgWebhookEventRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookEventRepository for PgWebhookEventRepository {
    async fn exists(&self, evt_id: &str) -> AppResult<bool> {
        use crate::schema::webhook_events::dsl::*;
        let mut conn = self.pool.get().await?;

        diesel::select(diesel::dsl::exists(webhook_events.filter(event_id.eq(evt_id))))
            .get_result(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn record(&self, evt_id: &str, evt_type: &str) -> AppResult<bool> {
        use crate::schema::webhook_events::dsl::*;
        let mut conn = self.pool.get().await?;

        let inserted = diesel::insert_into(webhook_events)
            .values(&NewWebhookEvent {
                event_id: evt_id.to_string(),
                event_type: evt_type.to_string(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await?;

        Ok(inserted == 1)
    }
}

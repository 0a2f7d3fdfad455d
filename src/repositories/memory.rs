//! In-memory repositories backed by `DashMap`.
//!
//! Selected with `database.backend = "memory"` and used by the integration
//! tests. Uniqueness rules mirror the database constraints and surface as the
//! same `AppError::Duplicate` the postgres converter produces.

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::{AppError, AppResult};
use crate::models::{
    Check, Document, NewCheck, NewDocument, NewPayment, NewUser, Payment, PaymentStatus,
    UpdateUser, User, db_now,
};
use crate::repositories::traits::{
    CheckRepository, DocumentRepository, Page, PaymentRepository, UserRepository,
    WebhookEventRepository,
};

fn duplicate(entity: &str, field: &str, value: &str) -> AppError {
    AppError::Duplicate {
        entity: entity.to_string(),
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Newest first, ties broken by id, matching the SQL `ORDER BY`.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (jiff::Timestamp, i32)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn paginate<T>(items: Vec<T>, offset: i64, limit: i64) -> Page<T> {
    let total = items.len() as i64;
    let items = items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect();
    Page { items, total }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Default)]
pub struct MemoryUserRepository {
    rows: DashMap<i32, User>,
    emails: DashMap<String, i32>,
    next_id: AtomicI32,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let id = match self.emails.entry(new_user.email.clone()) {
            Entry::Occupied(_) => return Err(duplicate("users", "email", &new_user.email)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                slot.insert(id);
                id
            }
        };

        let now = db_now();
        let user = User {
            id,
            email: new_user.email,
            hashed_password: new_user.hashed_password,
            full_name: new_user.full_name,
            is_active: true,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i32) -> AppResult<Option<User>> {
        Ok(self.rows.get(&user_id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn update(&self, user_id: i32, changes: UpdateUser) -> AppResult<Option<User>> {
        let Some(mut row) = self.rows.get_mut(&user_id) else {
            return Ok(None);
        };

        if let Some(email) = changes.email
            && email != row.email
        {
            match self.emails.entry(email.clone()) {
                Entry::Occupied(_) => return Err(duplicate("users", "email", &email)),
                Entry::Vacant(slot) => {
                    slot.insert(user_id);
                }
            }
            self.emails.remove(&row.email);
            row.email = email;
        }
        if let Some(hash) = changes.hashed_password {
            row.hashed_password = hash;
        }
        if let Some(name) = changes.full_name {
            row.full_name = Some(name);
        }
        if let Some(active) = changes.is_active {
            row.is_active = active;
        }
        row.updated_at = db_now();

        Ok(Some(row.value().clone()))
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<Page<User>> {
        let mut users: Vec<User> = self.rows.iter().map(|r| r.value().clone()).collect();
        users.sort_by_key(|u| u.id);
        Ok(paginate(users, offset, limit))
    }
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Default)]
pub struct MemoryDocumentRepository {
    rows: DashMap<i32, Document>,
    next_id: AtomicI32,
}

impl MemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for MemoryDocumentRepository {
    async fn create(&self, new_document: NewDocument) -> AppResult<Document> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let document = Document {
            id,
            user_id: new_document.user_id,
            title: new_document.title,
            description: new_document.description,
            filename: new_document.filename,
            content_type: new_document.content_type,
            size_bytes: new_document.size_bytes,
            storage_path: new_document.storage_path,
            extracted_text: new_document.extracted_text,
            status: new_document.status,
            created_at: db_now(),
        };
        self.rows.insert(id, document.clone());
        Ok(document)
    }

    async fn find_for_user(&self, document_id: i32, user_id: i32) -> AppResult<Option<Document>> {
        Ok(self
            .rows
            .get(&document_id)
            .filter(|d| d.user_id == user_id)
            .map(|d| d.value().clone()))
    }

    async fn list_by_user(
        &self,
        user_id: i32,
        offset: i64,
        limit: i64,
    ) -> AppResult<Page<Document>> {
        let mut docs: Vec<Document> = self
            .rows
            .iter()
            .filter(|d| d.user_id == user_id)
            .map(|d| d.value().clone())
            .collect();
        newest_first(&mut docs, |d| (d.created_at.to_jiff(), d.id));
        Ok(paginate(docs, offset, limit))
    }

    async fn delete_for_user(
        &self,
        document_id: i32,
        user_id: i32,
    ) -> AppResult<Option<Document>> {
        Ok(self
            .rows
            .remove_if(&document_id, |_, d| d.user_id == user_id)
            .map(|(_, d)| d))
    }
}

// ============================================================================
// Checks
// ============================================================================

#[derive(Default)]
pub struct MemoryCheckRepository {
    rows: DashMap<i32, Check>,
    next_id: AtomicI32,
}

impl MemoryCheckRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(&self, keep: impl Fn(&Check) -> bool) -> Vec<Check> {
        let mut checks: Vec<Check> = self
            .rows
            .iter()
            .filter(|c| keep(c))
            .map(|c| c.value().clone())
            .collect();
        newest_first(&mut checks, |c| (c.created_at.to_jiff(), c.id));
        checks
    }
}

#[async_trait]
impl CheckRepository for MemoryCheckRepository {
    async fn create(&self, new_check: NewCheck) -> AppResult<Check> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let check = Check {
            id,
            user_id: new_check.user_id,
            document_id: new_check.document_id,
            mode: new_check.mode,
            threshold: new_check.threshold,
            total_matches: new_check.total_matches,
            avg_similarity: new_check.avg_similarity,
            max_similarity: new_check.max_similarity,
            matches: new_check.matches,
            created_at: db_now(),
        };
        self.rows.insert(id, check.clone());
        Ok(check)
    }

    async fn find_for_user(&self, check_id: i32, user_id: i32) -> AppResult<Option<Check>> {
        Ok(self
            .rows
            .get(&check_id)
            .filter(|c| c.user_id == user_id)
            .map(|c| c.value().clone()))
    }

    async fn list_by_user(&self, user_id: i32, offset: i64, limit: i64) -> AppResult<Page<Check>> {
        Ok(paginate(self.sorted(|c| c.user_id == user_id), offset, limit))
    }

    async fn list_by_document(&self, document_id: i32) -> AppResult<Vec<Check>> {
        Ok(self.sorted(|c| c.document_id == Some(document_id)))
    }

    async fn delete_by_document(&self, document_id: i32) -> AppResult<usize> {
        let mut removed = 0;
        self.rows.retain(|_, c| {
            let keep = c.document_id != Some(document_id);
            removed += usize::from(!keep);
            keep
        });
        Ok(removed)
    }
}

// ============================================================================
// Payments
// ============================================================================

#[derive(Default)]
pub struct MemoryPaymentRepository {
    rows: DashMap<i32, Payment>,
    external_ids: DashMap<String, i32>,
    next_id: AtomicI32,
}

impl MemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn create(&self, new_payment: NewPayment) -> AppResult<Payment> {
        let id = match self.external_ids.entry(new_payment.external_id.clone()) {
            Entry::Occupied(_) => {
                return Err(duplicate(
                    "payments",
                    "external_id",
                    &new_payment.external_id,
                ));
            }
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                slot.insert(id);
                id
            }
        };

        let now = db_now();
        let payment = Payment {
            id,
            user_id: new_payment.user_id,
            amount: new_payment.amount,
            currency: new_payment.currency,
            status: new_payment.status,
            external_id: new_payment.external_id,
            description: new_payment.description,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, payment.clone());
        Ok(payment)
    }

    async fn find_for_user(&self, payment_id: i32, user_id: i32) -> AppResult<Option<Payment>> {
        Ok(self
            .rows
            .get(&payment_id)
            .filter(|p| p.user_id == user_id)
            .map(|p| p.value().clone()))
    }

    async fn find_by_external_id(&self, external_id: &str) -> AppResult<Option<Payment>> {
        let Some(id) = self.external_ids.get(external_id).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.rows.get(&id).map(|p| p.value().clone()))
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .rows
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.value().clone())
            .collect();
        newest_first(&mut payments, |p| (p.created_at.to_jiff(), p.id));
        Ok(payments)
    }

    async fn transition(
        &self,
        payment_id: i32,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> AppResult<Option<Payment>> {
        // The shard write lock makes the check and the update atomic
        let Some(mut row) = self.rows.get_mut(&payment_id) else {
            return Ok(None);
        };
        if row.status != from {
            return Ok(None);
        }
        row.status = to;
        row.updated_at = db_now();
        Ok(Some(row.value().clone()))
    }
}

// ============================================================================
// Webhook events
// ============================================================================

#[derive(Default)]
pub struct MemoryWebhookEventRepository {
    events: DashMap<String, String>,
}

impl MemoryWebhookEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookEventRepository for MemoryWebhookEventRepository {
    async fn exists(&self, event_id: &str) -> AppResult<bool> {
        Ok(self.events.contains_key(event_id))
    }

    async fn record(&self, event_id: &str, event_type: &str) -> AppResult<bool> {
        match self.events.entry(event_id.to_string()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(event_type.to_string());
                Ok(true)
            }
        }
    }
}

//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `auth` - registration, login and token DTOs
//! - `user` - profile DTOs
//! - `document`, `check`, `payment` - resource DTOs
//! - `health` - health check responses
//! - `error` - the uniform error body
//! - `pagination` - pagination-related DTOs

mod auth;
mod check;
mod document;
mod error;
mod health;
mod pagination;
mod payment;
mod user;

pub use auth::{LoginForm, RefreshTokenRequest, RegisterRequest, TokenResponse};
pub use check::{CheckRequest, CheckResponse, QuickCheckRequest};
pub use document::{DocumentResponse, DocumentUploadForm};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus, overall_status};
pub use pagination::{Paginated, PaginationParams};
pub use payment::{
    CreateIntentRequest, IntentResponse, PaymentResponse, WebhookResponse,
};
pub use user::{ChangePasswordRequest, UpdateProfileRequest, UserResponse};

//! HTTP request handlers for API endpoints.
//!
//! Each module exposes an `OpenApiRouter` for its resource; protected groups
//! take the state so they can attach the auth layer.

pub mod auth;
pub mod checks;
pub mod documents;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod users;

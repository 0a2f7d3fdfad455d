//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::user::UserResponse;
use crate::utils::jwt::TokenPair;

/// Register request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// User's email address (unique, case-insensitive)
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "user@example.com", format = "email")]
    pub email: String,
    /// User's password (plain text, will be hashed)
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    #[schema(example = "password123", format = "password", min_length = 8, max_length = 128)]
    pub password: String,
    #[validate(length(max = 255, message = "Full name must be at most 255 characters"))]
    #[schema(example = "Ada Lovelace")]
    pub full_name: Option<String>,
}

/// OAuth2 password-flow form; `username` carries the email.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Username cannot be empty"))]
    #[schema(example = "user@example.com")]
    pub username: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    #[schema(example = "password123", format = "password")]
    pub password: String,
}

/// Refresh token request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token cannot be empty"))]
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub refresh_token: String,
}

/// Issued by login and refresh.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Access token (short-lived)
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub access_token: String,
    /// Refresh token (long-lived)
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub refresh_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Access token lifetime in seconds
    #[schema(example = 1800)]
    pub expires_in: i64,
    pub user: UserResponse,
}

impl TokenResponse {
    pub fn new(tokens: TokenPair, user: UserResponse) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "bearer".to_string(),
            expires_in: tokens.expires_in,
            user,
        }
    }
}

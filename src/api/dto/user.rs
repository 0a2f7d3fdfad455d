//! User-related DTOs for API requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{User, UserRole};

/// Request body for `PATCH /api/users/me`. Omitted fields stay unchanged.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(format = "email")]
    pub email: Option<String>,
    #[validate(length(max = 255, message = "Full name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password cannot be empty"))]
    #[schema(format = "password")]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "Password must be between 8 and 128 characters"))]
    #[schema(format = "password", min_length = 8, max_length = 128)]
    pub new_password: String,
}

/// Response body for user data (excludes the password hash).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "user@example.com")]
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub role: UserRole,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: String,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            is_active: user.is_active,
            role: user.role,
            created_at: user.created_at.to_jiff().to_string(),
            updated_at: user.updated_at.to_jiff().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::db_now;

    #[test]
    fn test_user_response_hides_password_hash() {
        let user = User {
            id: 7,
            email: "a@b.co".into(),
            hashed_password: "$argon2id$secret".into(),
            full_name: Some("A".into()),
            is_active: true,
            role: UserRole::User,
            created_at: db_now(),
            updated_at: db_now(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["email"], "a@b.co");
        assert_eq!(json["role"], "user");
        assert!(json.get("hashed_password").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_update_profile_validation() {
        let req = UpdateProfileRequest {
            email: Some("nope".into()),
            full_name: None,
        };
        assert!(req.validate().is_err());
    }
}

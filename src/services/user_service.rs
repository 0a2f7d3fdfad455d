//! User service for business logic operations.
//!
//! Registration, credential checks and profile maintenance. Emails are
//! normalized to lowercase before every lookup or write.

use std::sync::Arc;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, UpdateUser, User, UserRole};
use crate::repositories::{Page, UserRepository};
use crate::utils::password::{hash_password_blocking, verify_password_blocking};

const BAD_CREDENTIALS: &str = "Incorrect email or password";

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Creates an account with the `user` role.
    ///
    /// A taken email is `Duplicate` (409), whether caught by the lookup or by
    /// the unique constraint when two registrations race.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
    ) -> AppResult<User> {
        self.create_with_role(email, password, full_name, UserRole::User)
            .await
    }

    /// Same as [`register`](Self::register) with an explicit role; used for
    /// bootstrapping admins.
    pub async fn create_with_role(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
        role: UserRole,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Duplicate {
                entity: "users".to_string(),
                field: "email".to_string(),
                value: email,
            });
        }

        let hashed_password = hash_password_blocking(password.to_string()).await?;
        let user = self
            .repo
            .create(NewUser {
                email,
                hashed_password,
                full_name: full_name.filter(|n| !n.trim().is_empty()),
                role,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Checks credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let email = normalize_email(email);
        let Some(user) = self.repo.find_by_email(&email).await? else {
            return Err(AppError::unauthorized(BAD_CREDENTIALS));
        };

        if !verify_password_blocking(password.to_string(), user.hashed_password.clone()).await? {
            tracing::debug!(user_id = user.id, "Password mismatch");
            return Err(AppError::unauthorized(BAD_CREDENTIALS));
        }

        if !user.is_active {
            return Err(AppError::forbidden("Inactive user"));
        }

        Ok(user)
    }

    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("user", "id", id))
    }

    /// Resolves the subject of a token: a vanished user is 401, a
    /// deactivated one 403.
    pub async fn get_active_user(&self, id: i32) -> AppResult<User> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;
        if !user.is_active {
            return Err(AppError::forbidden("Inactive user"));
        }
        Ok(user)
    }

    pub async fn update_profile(
        &self,
        id: i32,
        email: Option<String>,
        full_name: Option<String>,
    ) -> AppResult<User> {
        let changes = UpdateUser {
            email: email.as_deref().map(normalize_email),
            full_name,
            ..Default::default()
        };
        self.repo
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::not_found("user", "id", id))
    }

    /// Requires the current password; a mismatch is 400.
    pub async fn change_password(
        &self,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.get_user(id).await?;
        if !verify_password_blocking(current_password.to_string(), user.hashed_password).await? {
            return Err(AppError::bad_request("Incorrect password"));
        }

        let hashed_password = hash_password_blocking(new_password.to_string()).await?;
        self.repo
            .update(
                id,
                UpdateUser {
                    hashed_password: Some(hashed_password),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(user_id = id, "Password changed");
        Ok(())
    }

    /// Soft delete: the row stays so documents, checks and payments keep
    /// their owner, but the account can no longer log in.
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        self.repo
            .update(
                id,
                UpdateUser {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("user", "id", id))?;

        tracing::info!(user_id = id, "User deactivated");
        Ok(())
    }

    pub async fn list_users(&self, offset: i64, limit: i64) -> AppResult<Page<User>> {
        self.repo.list(offset, limit).await
    }
}

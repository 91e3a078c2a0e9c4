//! Account registration, login and session resolution

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use warden_db::{CreateUser, UserRepository};
use warden_types::{User, UserId};

use crate::password::{hash_password, verify_password};
use crate::session::{IssuedSession, SessionSigner};
use crate::validation;
use crate::{CoreError, CoreResult};

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Account operations
pub struct AccountService<U: UserRepository> {
    users: Arc<U>,
    signer: SessionSigner,
}

impl<U: UserRepository> AccountService<U> {
    /// Create a new account service
    pub fn new(users: Arc<U>, signer: SessionSigner) -> Self {
        Self { users, signer }
    }

    /// Register a new account.
    ///
    /// A taken username or email is a validation failure, whether caught by
    /// the lookup or by the store's unique constraint.
    #[tracing::instrument(skip_all, fields(username = %form.username))]
    pub async fn register(&self, form: Registration, now: DateTime<Utc>) -> CoreResult<User> {
        let username = validation::validate_username(&form.username)?;
        let email = validation::validate_email(&form.email)?;
        validation::validate_password(&form.password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(CoreError::validation("username already taken"));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CoreError::validation("email already registered"));
        }

        let password_hash = hash_password(&form.password)?;
        let row = self
            .users
            .create(CreateUser {
                username,
                email,
                password_hash,
                created_at: now,
            })
            .await
            .map_err(|e| match e {
                e if e.is_unique_violation_on("users.username") => {
                    CoreError::validation("username already taken")
                }
                e if e.is_unique_violation_on("users.email") => {
                    CoreError::validation("email already registered")
                }
                e => CoreError::from(e),
            })?;

        let user = User::from(row);
        tracing::info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Check a username and password
    pub async fn authenticate(&self, username: &str, password: &str) -> CoreResult<User> {
        let row = self
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        if !verify_password(password, &row.password_hash) {
            tracing::debug!(user_id = row.id, "Password mismatch");
            return Err(CoreError::InvalidCredentials);
        }
        if !row.is_active {
            return Err(CoreError::AccountDisabled);
        }
        Ok(User::from(row))
    }

    /// Authenticate and issue a session token
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<(User, IssuedSession)> {
        let user = self.authenticate(username, password).await?;
        let session = self.signer.issue(user.id, &user.username, now)?;
        tracing::info!(user_id = %user.id, "Login succeeded");
        Ok((user, session))
    }

    /// Resolve a session token to its (still active) user
    pub async fn resolve_session(&self, token: &str, now: DateTime<Utc>) -> CoreResult<User> {
        let payload = self.signer.verify(token, now)?;
        let user = self.find(payload.user_id()).await.map_err(|e| match e {
            CoreError::NotFound(_) => CoreError::InvalidToken,
            other => other,
        })?;

        if !user.is_active {
            return Err(CoreError::AccountDisabled);
        }
        Ok(user)
    }

    /// Look up a user by id
    pub async fn find(&self, user_id: UserId) -> CoreResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or(CoreError::NotFound("user"))
    }
}


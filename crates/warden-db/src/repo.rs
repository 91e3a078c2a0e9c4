//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use warden_types::{ServiceType, SubscriptionId, UserId};

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>>;

    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>>;

    /// Create a new user. Duplicate username or email is a `ConstraintViolated`.
    async fn create(&self, user: CreateUser) -> DbResult<UserRow>;

    /// Flip the trial flag for `service` from false to true.
    ///
    /// Returns `true` only for the call that performed the transition; a
    /// flag that is already set yields `false`. Unknown users are `NotFound`.
    async fn mark_trial_used(&self, id: UserId, service: ServiceType) -> DbResult<bool>;
}

/// Create user input
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by ID
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<SubscriptionRow>>;

    /// Find all subscriptions for a user, newest first
    async fn find_by_user_id(&self, user_id: UserId) -> DbResult<Vec<SubscriptionRow>>;

    /// Find subscriptions flagged active for a user and service.
    ///
    /// Expiry is deliberately not filtered here; callers check it against
    /// their own clock.
    async fn find_active_for_service(
        &self,
        user_id: UserId,
        service: ServiceType,
    ) -> DbResult<Vec<SubscriptionRow>>;

    /// Create a new subscription
    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow>;

    /// Find auto-renewing active subscriptions expiring at or before `threshold`
    async fn find_due_for_renewal(
        &self,
        threshold: DateTime<Utc>,
    ) -> DbResult<Vec<SubscriptionRow>>;

    /// Move a subscription's expiry forward.
    ///
    /// Applied only while the row is still active, auto-renewing and at
    /// `expected_expiry`; returns `false` when any of those no longer hold.
    /// Unknown ids are `NotFound`.
    async fn apply_renewal(&self, id: SubscriptionId, renewal: RenewalUpdate) -> DbResult<bool>;
}

/// Create subscription input
#[derive(Debug, Clone)]
pub struct CreateSubscription {
    pub user_id: UserId,
    pub service_type: ServiceType,
    pub payment_method: String,
    pub payment_reference: String,
    pub amount_cents: i64,
    pub purchase_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub duration_days: i64,
    pub auto_renew: bool,
    pub renewal_contact: Option<String>,
}

/// Renewal write, guarded by the expiry the caller computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenewalUpdate {
    pub expected_expiry: DateTime<Utc>,
    pub new_expiry: DateTime<Utc>,
    pub renewed_at: DateTime<Utc>,
}

/// Check history repository trait (append-only)
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Append a geolocation search
    async fn record_geolocation(&self, entry: NewGeolocationSearch) -> DbResult<GeolocationSearchRow>;

    /// Append a link check
    async fn record_link_check(&self, entry: NewLinkCheck) -> DbResult<LinkCheckRow>;

    /// Append a file check
    async fn record_file_check(&self, entry: NewFileCheck) -> DbResult<FileCheckRow>;

    /// Latest geolocation searches for a user, newest first
    async fn recent_geolocation(&self, user_id: UserId, limit: i64)
        -> DbResult<Vec<GeolocationSearchRow>>;

    /// Latest link checks for a user, newest first
    async fn recent_link_checks(&self, user_id: UserId, limit: i64) -> DbResult<Vec<LinkCheckRow>>;

    /// Latest file checks for a user, newest first
    async fn recent_file_checks(&self, user_id: UserId, limit: i64) -> DbResult<Vec<FileCheckRow>>;
}

/// New geolocation search input
#[derive(Debug, Clone)]
pub struct NewGeolocationSearch {
    pub user_id: UserId,
    pub ip_address: String,
    pub location: String,
    pub isp: String,
    pub timestamp: DateTime<Utc>,
}

/// New link check input
#[derive(Debug, Clone)]
pub struct NewLinkCheck {
    pub user_id: UserId,
    pub url: String,
    pub is_safe: bool,
    pub risk_score: i64,
    pub timestamp: DateTime<Utc>,
}

/// New file check input
#[derive(Debug, Clone)]
pub struct NewFileCheck {
    pub user_id: UserId,
    pub filename: String,
    pub file_type: String,
    pub is_safe: bool,
    pub scan_result: String,
    pub timestamp: DateTime<Utc>,
}

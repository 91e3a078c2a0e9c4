//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use warden_types::{
    FileCheck, GeolocationSearch, LinkCheck, ServiceType, Subscription, SubscriptionId, TrialFlags,
    User, UserId,
};

use crate::DbError;

/// User row from the database
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub geolocation_trial_used: bool,
    pub link_checker_trial_used: bool,
    pub file_checker_trial_used: bool,
    pub created_at: DateTime<Utc>,
}

/// Subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SubscriptionRow {
    pub id: i64,
    pub user_id: i64,
    pub service_type: String,
    pub payment_method: String,
    pub payment_reference: String,
    pub amount_cents: i64,
    pub purchase_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub duration_days: i64,
    pub is_active: bool,
    pub auto_renew: bool,
    pub renewal_contact: Option<String>,
    pub last_renewal_date: Option<DateTime<Utc>>,
}

/// Geolocation search row from the database
#[derive(Debug, Clone, FromRow)]
pub struct GeolocationSearchRow {
    pub id: i64,
    pub user_id: i64,
    pub ip_address: String,
    pub location: String,
    pub isp: String,
    pub timestamp: DateTime<Utc>,
}

/// Link check row from the database
#[derive(Debug, Clone, FromRow)]
pub struct LinkCheckRow {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub is_safe: bool,
    pub risk_score: i64,
    pub timestamp: DateTime<Utc>,
}

/// File check row from the database
#[derive(Debug, Clone, FromRow)]
pub struct FileCheckRow {
    pub id: i64,
    pub user_id: i64,
    pub filename: String,
    pub file_type: String,
    pub is_safe: bool,
    pub scan_result: String,
    pub timestamp: DateTime<Utc>,
}

// Conversion implementations from Row types to warden-types domain types
impl UserRow {
    /// Convert to domain UserId
    pub fn user_id(&self) -> UserId {
        UserId(self.id)
    }

    /// Trial flags as a domain value
    pub fn trials(&self) -> TrialFlags {
        TrialFlags {
            geolocation: self.geolocation_trial_used,
            link_checker: self.link_checker_trial_used,
            file_checker: self.file_checker_trial_used,
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id(),
            trials: row.trials(),
            username: row.username,
            email: row.email,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

impl SubscriptionRow {
    /// Convert to domain SubscriptionId
    pub fn subscription_id(&self) -> SubscriptionId {
        SubscriptionId(self.id)
    }
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DbError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let service_type: ServiceType = row
            .service_type
            .parse()
            .map_err(|e| DbError::Decode(format!("subscription {}: {e}", row.id)))?;
        let payment_method = row
            .payment_method
            .parse()
            .map_err(|e| DbError::Decode(format!("subscription {}: {e}", row.id)))?;

        Ok(Self {
            id: SubscriptionId(row.id),
            user_id: UserId(row.user_id),
            service_type,
            payment_method,
            payment_reference: row.payment_reference,
            amount_cents: row.amount_cents,
            purchase_date: row.purchase_date,
            expiry_date: row.expiry_date,
            duration_days: row.duration_days,
            is_active: row.is_active,
            auto_renew: row.auto_renew,
            renewal_contact: row.renewal_contact,
            last_renewal_date: row.last_renewal_date,
        })
    }
}

impl From<GeolocationSearchRow> for GeolocationSearch {
    fn from(row: GeolocationSearchRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId(row.user_id),
            ip_address: row.ip_address,
            location: row.location,
            isp: row.isp,
            timestamp: row.timestamp,
        }
    }
}

impl From<LinkCheckRow> for LinkCheck {
    fn from(row: LinkCheckRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId(row.user_id),
            url: row.url,
            is_safe: row.is_safe,
            risk_score: row.risk_score,
            timestamp: row.timestamp,
        }
    }
}

impl From<FileCheckRow> for FileCheck {
    fn from(row: FileCheckRow) -> Self {
        Self {
            id: row.id,
            user_id: UserId(row.user_id),
            filename: row.filename,
            file_type: row.file_type,
            is_safe: row.is_safe,
            scan_result: row.scan_result,
            timestamp: row.timestamp,
        }
    }
}

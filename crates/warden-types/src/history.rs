//! Check history records (append-only audit rows)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// IP geolocation lookup made by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationSearch {
    pub id: i64,
    pub user_id: UserId,
    pub ip_address: String,
    pub location: String,
    pub isp: String,
    pub timestamp: DateTime<Utc>,
}

/// Link safety check made by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkCheck {
    pub id: i64,
    pub user_id: UserId,
    pub url: String,
    pub is_safe: bool,
    pub risk_score: i64,
    pub timestamp: DateTime<Utc>,
}

/// File scan made by a user. The uploaded bytes are not retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCheck {
    pub id: i64,
    pub user_id: UserId,
    pub filename: String,
    pub file_type: String,
    pub is_safe: bool,
    pub scan_result: String,
    pub timestamp: DateTime<Utc>,
}

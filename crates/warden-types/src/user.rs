//! User types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ServiceType;

/// Unique user identifier (surrogate integer key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// One-way trial flags, one per service type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialFlags {
    pub geolocation: bool,
    pub link_checker: bool,
    pub file_checker: bool,
}

impl TrialFlags {
    /// Whether the trial for `service` has been consumed
    pub const fn is_used(&self, service: ServiceType) -> bool {
        match service {
            ServiceType::Geolocation => self.geolocation,
            ServiceType::LinkChecker => self.link_checker,
            ServiceType::FileChecker => self.file_checker,
        }
    }

    /// Set the flag for `service`. Returns whether it flipped.
    pub fn mark_used(&mut self, service: ServiceType) -> bool {
        let flag = match service {
            ServiceType::Geolocation => &mut self.geolocation,
            ServiceType::LinkChecker => &mut self.link_checker,
            ServiceType::FileChecker => &mut self.file_checker,
        };
        let flipped = !*flag;
        *flag = true;
        flipped
    }
}

/// Registered account. The password hash never leaves the store layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Account enabled flag
    pub is_active: bool,
    pub trials: TrialFlags,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the trial for `service` has already been consumed
    pub fn trial_used(&self, service: ServiceType) -> bool {
        self.trials.is_used(service)
    }
}

//! Subscription types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{ParseError, ServiceType, UserId};

/// Unique subscription identifier (surrogate integer key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub i64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Purchasable subscription lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTerm {
    /// 30 days - 99.00
    Monthly,
    /// 90 days - 249.00
    Quarterly,
    /// 365 days - 899.00
    Yearly,
}

impl SubscriptionTerm {
    /// Length of the term in days
    pub const fn days(&self) -> i64 {
        match self {
            Self::Monthly => 30,
            Self::Quarterly => 90,
            Self::Yearly => 365,
        }
    }

    /// Term length as a chrono duration
    pub fn duration(&self) -> Duration {
        Duration::days(self.days())
    }

    /// Look up the term for a caller-supplied day count
    pub fn from_days(days: i64) -> Result<Self, ParseError> {
        match days {
            30 => Ok(Self::Monthly),
            90 => Ok(Self::Quarterly),
            365 => Ok(Self::Yearly),
            other => Err(ParseError::Term(other)),
        }
    }
}

impl std::fmt::Display for SubscriptionTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Monthly => write!(f, "1 month"),
            Self::Quarterly => write!(f, "3 months"),
            Self::Yearly => write!(f, "1 year"),
        }
    }
}

/// How the customer claims to have paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// GCash mobile wallet transfer
    #[default]
    Gcash,
}

impl PaymentMethod {
    /// Get the persisted tag
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gcash => "gcash",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gcash" => Ok(Self::Gcash),
            _ => Err(ParseError::PaymentMethod(s.to_string())),
        }
    }
}

/// User subscription to one service type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub service_type: ServiceType,
    pub payment_method: PaymentMethod,
    /// Reference number as entered by the customer (unverified)
    pub payment_reference: String,
    /// Amount paid in minor units
    pub amount_cents: i64,
    /// Original purchase time; renewals never move it
    pub purchase_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    /// Term length chosen at purchase
    pub duration_days: i64,
    pub is_active: bool,
    pub auto_renew: bool,
    /// Wallet number to charge on renewal
    pub renewal_contact: Option<String>,
    pub last_renewal_date: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Whether this record grants access at `now`.
    ///
    /// Expiry is checked live: `is_active` is never cleared when a
    /// subscription lapses, so it cannot be trusted on its own.
    pub fn grants_access_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expiry_date > now
    }
}

//! Access decision types

use serde::{Deserialize, Serialize};

use crate::ServiceType;

/// How a request for a feature was (or was not) entitled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// A live subscription covers the service
    Subscription,
    /// The one-time free trial is available
    Trial,
    /// No subscription and the trial is spent (or not offered)
    Denied,
    /// The service is not gated at all
    Open,
}

impl AccessMode {
    /// Get the mode tag
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "subscription",
            Self::Trial => "trial",
            Self::Denied => "denied",
            Self::Open => "open",
        }
    }
}

impl std::fmt::Display for AccessMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entitlement decision for one user and service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub mode: AccessMode,
}

impl AccessDecision {
    pub const SUBSCRIPTION: Self = Self::allow(AccessMode::Subscription);
    pub const TRIAL: Self = Self::allow(AccessMode::Trial);
    pub const OPEN: Self = Self::allow(AccessMode::Open);
    pub const DENIED: Self = Self {
        allowed: false,
        mode: AccessMode::Denied,
    };

    const fn allow(mode: AccessMode) -> Self {
        Self {
            allowed: true,
            mode,
        }
    }
}

/// Per-service access snapshot, used for dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccess {
    pub service_type: ServiceType,
    pub decision: AccessDecision,
    /// Whether the service offers a trial at all
    pub trial_offered: bool,
    pub trial_used: bool,
}

//! Entitlement configuration

use chrono::Duration;
use std::collections::HashMap;
use warden_types::ServiceType;

use crate::lifecycle::RenewalBasis;

/// Access gate for one service type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Anyone signed in may use the service
    Ungated,
    /// Requires a live subscription, or the one-time trial when `trial` is set
    Gated { trial: bool },
}

/// Mapping from service type to its gate.
///
/// Services without an entry are ungated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatingPolicy {
    gates: HashMap<ServiceType, Gate>,
}

impl GatingPolicy {
    /// Policy with every service ungated
    pub fn open() -> Self {
        Self {
            gates: HashMap::new(),
        }
    }

    /// Build from the list of gated services and the subset offering a trial
    pub fn from_lists(gated: &[ServiceType], trials: &[ServiceType]) -> Self {
        gated.iter().fold(Self::open(), |policy, service| {
            policy.with_gate(
                *service,
                Gate::Gated {
                    trial: trials.contains(service),
                },
            )
        })
    }

    /// Set the gate for a service
    pub fn with_gate(mut self, service: ServiceType, gate: Gate) -> Self {
        self.gates.insert(service, gate);
        self
    }

    /// Get the gate for a service
    pub fn gate(&self, service: ServiceType) -> Gate {
        self.gates.get(&service).copied().unwrap_or(Gate::Ungated)
    }

    /// Whether `service` offers a one-time trial
    pub fn offers_trial(&self, service: ServiceType) -> bool {
        matches!(self.gate(service), Gate::Gated { trial: true })
    }
}

/// Geolocation is gated behind a subscription with a one-time trial; the
/// link and file checkers are free.
impl Default for GatingPolicy {
    fn default() -> Self {
        Self::open().with_gate(ServiceType::Geolocation, Gate::Gated { trial: true })
    }
}

/// Core service configuration
#[derive(Debug, Clone)]
pub struct EntitlementConfig {
    /// Per-service gates
    pub gating: GatingPolicy,
    /// How renewals compute the next term
    pub renewal_basis: RenewalBasis,
    /// Subscriptions expiring within this window are swept
    pub renewal_lookahead: Duration,
    /// HMAC secret for session signing
    pub session_secret: String,
    /// Session lifetime
    pub session_duration: Duration,
    /// Rows returned by "recent history" queries
    pub history_limit: i64,
}

impl EntitlementConfig {
    /// Create a new config with defaults
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            gating: GatingPolicy::default(),
            renewal_basis: RenewalBasis::default(),
            renewal_lookahead: Duration::days(1),
            session_secret: session_secret.into(),
            session_duration: Duration::hours(24),
            history_limit: 5,
        }
    }

    /// Set the gating policy
    pub fn with_gating(mut self, gating: GatingPolicy) -> Self {
        self.gating = gating;
        self
    }

    /// Set the renewal basis
    pub fn with_renewal_basis(mut self, basis: RenewalBasis) -> Self {
        self.renewal_basis = basis;
        self
    }

    /// Set the sweep lookahead window
    pub fn with_renewal_lookahead(mut self, lookahead: Duration) -> Self {
        self.renewal_lookahead = lookahead;
        self
    }

    /// Set session duration
    pub fn with_session_duration(mut self, duration: Duration) -> Self {
        self.session_duration = duration;
        self
    }
}

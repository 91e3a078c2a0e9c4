//! Auto-renewal sweeper
//!
//! One pass renews every auto-renewing subscription that expires within the
//! lookahead window. Each subscription is renewed on its own; a failure is
//! logged and recorded against that subscription, and the pass moves on.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use warden_db::{SubscriptionRepository, UserRepository};
use warden_types::SubscriptionId;

use crate::lifecycle::SubscriptionLifecycle;
use crate::CoreResult;

/// Outcome of renewing one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenewalOutcome {
    Renewed { new_expiry: DateTime<Utc> },
    /// No longer eligible, or already moved by another writer
    Skipped,
    NotFound,
    Failed(String),
}

impl RenewalOutcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Renewed { .. } => "renewed",
            Self::Skipped => "skipped",
            Self::NotFound => "not_found",
            Self::Failed(_) => "failed",
        }
    }
}

/// Counts for one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub candidates: usize,
    pub renewed: usize,
    pub skipped: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl SweepReport {
    /// Summarise a sweep result
    pub fn from_outcomes(outcomes: &[(SubscriptionId, RenewalOutcome)]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut report, (_, outcome)| {
                report.candidates += 1;
                match outcome {
                    RenewalOutcome::Renewed { .. } => report.renewed += 1,
                    RenewalOutcome::Skipped => report.skipped += 1,
                    RenewalOutcome::NotFound => report.not_found += 1,
                    RenewalOutcome::Failed(_) => report.failed += 1,
                }
                report
            })
    }

    /// Whether any candidate failed
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Auto-renewal sweeper
pub struct RenewalSweeper<U: UserRepository, S: SubscriptionRepository> {
    lifecycle: Arc<SubscriptionLifecycle<U, S>>,
    subscriptions: Arc<S>,
    lookahead: Duration,
}

impl<U: UserRepository, S: SubscriptionRepository> RenewalSweeper<U, S> {
    /// Create a new sweeper
    pub fn new(
        lifecycle: Arc<SubscriptionLifecycle<U, S>>,
        subscriptions: Arc<S>,
        lookahead: Duration,
    ) -> Self {
        Self {
            lifecycle,
            subscriptions,
            lookahead,
        }
    }

    /// Run one pass at `now`.
    ///
    /// Only a failure of the candidate query is returned as an error.
    #[tracing::instrument(skip(self), fields(lookahead_hours = self.lookahead.num_hours()))]
    pub async fn sweep(
        &self,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<(SubscriptionId, RenewalOutcome)>> {
        let threshold = now + self.lookahead;
        let candidates = self.subscriptions.find_due_for_renewal(threshold).await?;
        tracing::info!(candidates = candidates.len(), threshold = %threshold, "Starting renewal sweep");

        let mut outcomes = Vec::with_capacity(candidates.len());
        for row in candidates {
            let id = row.subscription_id();
            let outcome = match self.lifecycle.try_renew(id, now).await {
                Ok(Some(renewal)) => RenewalOutcome::Renewed {
                    new_expiry: renewal.new_expiry,
                },
                Ok(None) => RenewalOutcome::Skipped,
                Err(e) if e.is_not_found() => {
                    tracing::warn!(subscription_id = %id, "Subscription vanished during sweep");
                    RenewalOutcome::NotFound
                }
                Err(e) => {
                    tracing::error!(subscription_id = %id, error = %e, "Renewal failed");
                    RenewalOutcome::Failed(e.to_string())
                }
            };

            metrics::counter!("warden_renewals_total", "outcome" => outcome.as_str()).increment(1);
            outcomes.push((id, outcome));
        }

        let report = SweepReport::from_outcomes(&outcomes);
        tracing::info!(
            renewed = report.renewed,
            skipped = report.skipped,
            not_found = report.not_found,
            failed = report.failed,
            "Renewal sweep finished"
        );
        Ok(outcomes)
    }
}

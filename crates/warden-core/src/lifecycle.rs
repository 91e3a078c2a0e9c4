//! Subscription lifecycle: creation from a payment claim and renewal
//!
//! Renewal is a pure computation ([`renew`]) plus a guarded write
//! ([`SubscriptionLifecycle::renew_by_id`]). The write only lands while the
//! row still carries the expiry the computation started from, so a sweep
//! racing another writer can never extend a subscription twice.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use warden_db::{CreateSubscription, RenewalUpdate, SubscriptionRepository, UserRepository};
use warden_types::{
    PaymentMethod, ServiceType, Subscription, SubscriptionId, SubscriptionTerm, UserId,
};

use crate::payment::{PaymentClaim, PaymentVerifier};
use crate::validation;
use crate::{CoreError, CoreResult};

/// How a renewal computes the length of the next term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenewalBasis {
    /// The term length chosen at purchase (`duration_days`)
    #[default]
    FixedTerm,
    /// Whole days between `purchase_date` and the current `expiry_date`.
    ///
    /// `purchase_date` never moves, so every late renewal widens the span
    /// used by the next one.
    PurchaseSpan,
}

impl RenewalBasis {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FixedTerm => "fixed_term",
            Self::PurchaseSpan => "purchase_span",
        }
    }

    /// Length of the next term for `sub`
    pub fn term_for(&self, sub: &Subscription) -> Duration {
        match self {
            Self::FixedTerm => Duration::days(sub.duration_days),
            Self::PurchaseSpan => {
                Duration::days((sub.expiry_date - sub.purchase_date).num_days())
            }
        }
    }
}

impl std::fmt::Display for RenewalBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenewalBasis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "fixed_term" => Ok(Self::FixedTerm),
            "purchase_span" => Ok(Self::PurchaseSpan),
            other => Err(CoreError::validation(format!("unknown renewal basis: {other}"))),
        }
    }
}

/// Result of a renewal computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Renewal {
    pub new_expiry: DateTime<Utc>,
    pub renewed_at: DateTime<Utc>,
}

/// Compute the renewal of `sub` at `now`.
///
/// Returns `None` when the subscription is inactive, not auto-renewing, or
/// the computed term is empty. `purchase_date` is never part of the result.
pub fn renew(sub: &Subscription, now: DateTime<Utc>, basis: RenewalBasis) -> Option<Renewal> {
    if !sub.auto_renew || !sub.is_active {
        return None;
    }

    let term = basis.term_for(sub);
    if term <= Duration::zero() {
        return None;
    }

    Some(Renewal {
        new_expiry: now + term,
        renewed_at: now,
    })
}

/// Subscription request from the payment form
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: UserId,
    pub service_type: ServiceType,
    pub payment_method: PaymentMethod,
    pub reference: String,
    pub amount_cents: i64,
    pub duration_days: i64,
    pub auto_renew: bool,
    /// Wallet number charged on renewal
    pub contact: String,
}

/// Subscription lifecycle operations
pub struct SubscriptionLifecycle<U: UserRepository, S: SubscriptionRepository> {
    users: Arc<U>,
    subscriptions: Arc<S>,
    verifier: Arc<dyn PaymentVerifier>,
    basis: RenewalBasis,
}

impl<U: UserRepository, S: SubscriptionRepository> SubscriptionLifecycle<U, S> {
    /// Create a new lifecycle
    pub fn new(
        users: Arc<U>,
        subscriptions: Arc<S>,
        verifier: Arc<dyn PaymentVerifier>,
        basis: RenewalBasis,
    ) -> Self {
        Self {
            users,
            subscriptions,
            verifier,
            basis,
        }
    }

    /// Renewal basis in effect
    pub fn basis(&self) -> RenewalBasis {
        self.basis
    }

    /// Materialise a subscription from a payment claim.
    ///
    /// The subscription runs from `now` for the requested term.
    #[tracing::instrument(skip(self, req), fields(user_id = %req.user_id, service = %req.service_type))]
    pub async fn create_subscription(
        &self,
        req: NewSubscription,
        now: DateTime<Utc>,
    ) -> CoreResult<Subscription> {
        let term = SubscriptionTerm::from_days(req.duration_days)?;
        validation::validate_amount_cents(req.amount_cents)?;
        let reference = validation::validate_reference(&req.reference)?;
        let contact = validation::validate_contact_number(&req.contact)?;

        if self.users.find_by_id(req.user_id).await?.is_none() {
            return Err(CoreError::NotFound("user"));
        }

        let claim = PaymentClaim {
            user_id: req.user_id,
            service_type: req.service_type,
            method: req.payment_method,
            reference,
            amount_cents: req.amount_cents,
        };
        let payment = self.verifier.verify(&claim).await?;

        let row = self
            .subscriptions
            .create(CreateSubscription {
                user_id: req.user_id,
                service_type: req.service_type,
                payment_method: payment.method.as_str().to_string(),
                payment_reference: payment.reference,
                amount_cents: payment.amount_cents,
                purchase_date: now,
                expiry_date: now + term.duration(),
                duration_days: term.days(),
                auto_renew: req.auto_renew,
                renewal_contact: Some(contact),
            })
            .await?;
        let subscription = Subscription::try_from(row)?;

        metrics::counter!(
            "warden_subscriptions_created_total",
            "service" => subscription.service_type.as_str()
        )
        .increment(1);
        tracing::info!(
            subscription_id = %subscription.id,
            term = %term,
            expiry = %subscription.expiry_date,
            confirmed = payment.confirmed,
            "Subscription created"
        );

        Ok(subscription)
    }

    /// Renew a subscription in place.
    ///
    /// Returns `false` when the subscription is not eligible or another
    /// writer moved its expiry first. Unknown ids are `NotFound`.
    pub async fn renew_by_id(&self, id: SubscriptionId, now: DateTime<Utc>) -> CoreResult<bool> {
        Ok(self.try_renew(id, now).await?.is_some())
    }

    /// Renew a subscription in place, returning the applied renewal
    pub async fn try_renew(
        &self,
        id: SubscriptionId,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<Renewal>> {
        let row = self
            .subscriptions
            .find_by_id(id)
            .await?
            .ok_or(CoreError::NotFound("subscription"))?;
        let sub = Subscription::try_from(row)?;

        let Some(renewal) = renew(&sub, now, self.basis) else {
            tracing::debug!(subscription_id = %id, "Subscription not eligible for renewal");
            return Ok(None);
        };

        let applied = self
            .subscriptions
            .apply_renewal(
                id,
                RenewalUpdate {
                    expected_expiry: sub.expiry_date,
                    new_expiry: renewal.new_expiry,
                    renewed_at: renewal.renewed_at,
                },
            )
            .await?;

        if !applied {
            tracing::debug!(subscription_id = %id, "Subscription changed before renewal was applied");
            return Ok(None);
        }

        tracing::info!(
            subscription_id = %id,
            basis = %self.basis,
            previous_expiry = %sub.expiry_date,
            new_expiry = %renewal.new_expiry,
            "Subscription renewed"
        );
        Ok(Some(renewal))
    }

    /// All subscriptions of a user, newest first
    pub async fn list_for_user(&self, user_id: UserId) -> CoreResult<Vec<Subscription>> {
        self.subscriptions
            .find_by_user_id(user_id)
            .await?
            .into_iter()
            .map(|row| Subscription::try_from(row).map_err(CoreError::from))
            .collect()
    }
}

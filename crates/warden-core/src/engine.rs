//! Entitlement engine
//!
//! Decides whether a user may use a service right now, and consumes the
//! one-time trial when that is the path taken. Every decision reads the
//! store fresh; subscription expiry is compared against the caller's clock
//! on each call and never cached.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use warden_db::{SubscriptionRepository, UserRepository};
use warden_types::{
    AccessDecision, AccessMode, ServiceAccess, ServiceType, Subscription, User, UserId,
};

use crate::config::{Gate, GatingPolicy};
use crate::{CoreError, CoreResult};

/// Decide access for `user` to `service` at `now`.
///
/// Gated services check, in order: a live subscription for the service, then
/// an unused trial (when the gate offers one). `subscriptions` may contain
/// rows for other users or services; they are ignored.
pub fn evaluate_access(
    user: &User,
    subscriptions: &[Subscription],
    service: ServiceType,
    now: DateTime<Utc>,
    policy: &GatingPolicy,
) -> AccessDecision {
    let trial = match policy.gate(service) {
        Gate::Ungated => return AccessDecision::OPEN,
        Gate::Gated { trial } => trial,
    };

    let subscribed = subscriptions.iter().any(|sub| {
        sub.user_id == user.id && sub.service_type == service && sub.grants_access_at(now)
    });

    if subscribed {
        AccessDecision::SUBSCRIPTION
    } else if trial && !user.trial_used(service) {
        AccessDecision::TRIAL
    } else {
        AccessDecision::DENIED
    }
}

/// Entitlement engine over the user and subscription stores
pub struct EntitlementEngine<U: UserRepository, S: SubscriptionRepository> {
    users: Arc<U>,
    subscriptions: Arc<S>,
    policy: GatingPolicy,
}

impl<U: UserRepository, S: SubscriptionRepository> EntitlementEngine<U, S> {
    /// Create a new engine
    pub fn new(users: Arc<U>, subscriptions: Arc<S>, policy: GatingPolicy) -> Self {
        Self {
            users,
            subscriptions,
            policy,
        }
    }

    /// Gating policy in effect
    pub fn policy(&self) -> &GatingPolicy {
        &self.policy
    }

    async fn load_user(&self, user_id: UserId) -> CoreResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(User::from)
            .ok_or(CoreError::NotFound("user"))
    }

    async fn active_subscriptions(
        &self,
        user_id: UserId,
        service: ServiceType,
    ) -> CoreResult<Vec<Subscription>> {
        self.subscriptions
            .find_active_for_service(user_id, service)
            .await?
            .into_iter()
            .map(|row| Subscription::try_from(row).map_err(CoreError::from))
            .collect()
    }

    /// Evaluate access without side effects
    pub async fn evaluate(
        &self,
        user_id: UserId,
        service: ServiceType,
        now: DateTime<Utc>,
    ) -> CoreResult<AccessDecision> {
        let user = self.load_user(user_id).await?;
        if self.policy.gate(service) == Gate::Ungated {
            return Ok(AccessDecision::OPEN);
        }

        let subscriptions = self.active_subscriptions(user_id, service).await?;
        Ok(evaluate_access(&user, &subscriptions, service, now, &self.policy))
    }

    /// Mark the trial for `service` as used.
    ///
    /// Returns `true` only for the call that consumed it. Services without a
    /// trial are never marked.
    pub async fn consume_trial(&self, user_id: UserId, service: ServiceType) -> CoreResult<bool> {
        if !self.policy.offers_trial(service) {
            tracing::debug!(user_id = %user_id, service = %service, "Service offers no trial");
            return Ok(false);
        }

        let consumed = self.users.mark_trial_used(user_id, service).await?;
        if consumed {
            metrics::counter!("warden_trials_consumed_total", "service" => service.as_str())
                .increment(1);
            tracing::info!(user_id = %user_id, service = %service, "Trial consumed");
        }
        Ok(consumed)
    }

    /// Evaluate access and consume the trial if that is the path taken.
    ///
    /// A caller that loses the race for the trial gets the re-evaluated
    /// decision, which is `Denied` unless a subscription appeared meanwhile.
    #[tracing::instrument(skip_all, fields(user_id = %user_id, service = %service))]
    pub async fn authorize(
        &self,
        user_id: UserId,
        service: ServiceType,
        now: DateTime<Utc>,
    ) -> CoreResult<AccessDecision> {
        let mut decision = self.evaluate(user_id, service, now).await?;

        if decision.mode == AccessMode::Trial && !self.consume_trial(user_id, service).await? {
            decision = match self.evaluate(user_id, service, now).await? {
                d if d.mode == AccessMode::Trial => AccessDecision::DENIED,
                d => d,
            };
        }

        metrics::counter!("warden_access_decisions_total", "mode" => decision.mode.as_str())
            .increment(1);
        tracing::debug!(mode = %decision.mode, allowed = decision.allowed, "Access decided");
        Ok(decision)
    }

    /// [`authorize`](Self::authorize), failing with `AccessDenied` when not allowed
    pub async fn require(
        &self,
        user_id: UserId,
        service: ServiceType,
        now: DateTime<Utc>,
    ) -> CoreResult<AccessDecision> {
        let decision = self.authorize(user_id, service, now).await?;
        if decision.allowed {
            Ok(decision)
        } else {
            Err(CoreError::AccessDenied(service))
        }
    }

    /// Access decision for every service, without consuming anything
    pub async fn access_summary(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> CoreResult<Vec<ServiceAccess>> {
        let user = self.load_user(user_id).await?;
        let subscriptions = self
            .subscriptions
            .find_by_user_id(user_id)
            .await?
            .into_iter()
            .map(|row| Subscription::try_from(row).map_err(CoreError::from))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(ServiceType::ALL
            .iter()
            .map(|&service| ServiceAccess {
                service_type: service,
                decision: evaluate_access(&user, &subscriptions, service, now, &self.policy),
                trial_offered: self.policy.offers_trial(service),
                trial_used: user.trial_used(service),
            })
            .collect())
    }
}

//! Warden service - ties together accounts, entitlements, lifecycle and checks

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use warden_db::sqlite::{SqliteHistoryRepository, SqliteSubscriptionRepository, SqliteUserRepository};
use warden_db::{
    HistoryRepository, NewFileCheck, NewGeolocationSearch, NewLinkCheck, Repositories,
    SubscriptionRepository, UserRepository,
};
use warden_types::{
    AccessMode, FileCheck, GeolocationSearch, LinkCheck, ServiceAccess, ServiceType, Subscription,
    User, UserId,
};

use crate::accounts::AccountService;
use crate::checks::{self, FileReport, GeolocationReport, LinkReport};
use crate::config::EntitlementConfig;
use crate::engine::EntitlementEngine;
use crate::lifecycle::{NewSubscription, SubscriptionLifecycle};
use crate::payment::{PaymentVerifier, TrustedReferenceVerifier};
use crate::session::SessionSigner;
use crate::sweeper::RenewalSweeper;
use crate::validation;
use crate::{CoreError, CoreResult};

/// Check result along with how access was granted
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome<T> {
    pub access: AccessMode,
    pub report: T,
}

/// Dashboard view of one user
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub access: Vec<ServiceAccess>,
    pub subscriptions: Vec<Subscription>,
}

/// SQLite-backed service
pub type SqliteWardenService =
    WardenService<SqliteUserRepository, SqliteSubscriptionRepository, SqliteHistoryRepository>;

/// Warden service
///
/// Every gated check goes through [`EntitlementEngine::require`] before
/// anything is recorded, so a trial is consumed before its usage row exists.
pub struct WardenService<U: UserRepository, S: SubscriptionRepository, H: HistoryRepository> {
    config: EntitlementConfig,
    accounts: AccountService<U>,
    engine: EntitlementEngine<U, S>,
    lifecycle: Arc<SubscriptionLifecycle<U, S>>,
    sweeper: RenewalSweeper<U, S>,
    history: Arc<H>,
}

impl<U: UserRepository, S: SubscriptionRepository, H: HistoryRepository> WardenService<U, S, H> {
    /// Create a new service
    pub fn new(
        config: EntitlementConfig,
        users: Arc<U>,
        subscriptions: Arc<S>,
        history: Arc<H>,
        verifier: Arc<dyn PaymentVerifier>,
    ) -> CoreResult<Self> {
        let signer = SessionSigner::new(&config.session_secret, config.session_duration)?;
        let lifecycle = Arc::new(SubscriptionLifecycle::new(
            Arc::clone(&users),
            Arc::clone(&subscriptions),
            verifier,
            config.renewal_basis,
        ));

        Ok(Self {
            accounts: AccountService::new(Arc::clone(&users), signer),
            engine: EntitlementEngine::new(
                users,
                Arc::clone(&subscriptions),
                config.gating.clone(),
            ),
            sweeper: RenewalSweeper::new(
                Arc::clone(&lifecycle),
                subscriptions,
                config.renewal_lookahead,
            ),
            lifecycle,
            history,
            config,
        })
    }

    pub fn config(&self) -> &EntitlementConfig {
        &self.config
    }

    pub fn accounts(&self) -> &AccountService<U> {
        &self.accounts
    }

    pub fn engine(&self) -> &EntitlementEngine<U, S> {
        &self.engine
    }

    pub fn lifecycle(&self) -> &SubscriptionLifecycle<U, S> {
        &self.lifecycle
    }

    pub fn sweeper(&self) -> &RenewalSweeper<U, S> {
        &self.sweeper
    }

    // =========================================================================
    // Checks
    // =========================================================================

    /// Geolocation lookup, gated per policy
    pub async fn geolocate(
        &self,
        user_id: UserId,
        ip: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<CheckOutcome<GeolocationReport>> {
        let ip = validation::validate_ip(ip)?;
        let decision = self
            .engine
            .require(user_id, ServiceType::Geolocation, now)
            .await?;

        let report = checks::geolocate(ip);
        self.history
            .record_geolocation(NewGeolocationSearch {
                user_id,
                ip_address: report.ip_address.clone(),
                location: report.location.clone(),
                isp: report.isp.clone(),
                timestamp: now,
            })
            .await?;

        Ok(CheckOutcome {
            access: decision.mode,
            report,
        })
    }

    /// Link safety check, gated per policy
    pub async fn check_link(
        &self,
        user_id: UserId,
        url: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<CheckOutcome<LinkReport>> {
        let url = validation::validate_url(url)?;
        let decision = self
            .engine
            .require(user_id, ServiceType::LinkChecker, now)
            .await?;

        let report = checks::check_link(&url);
        self.history
            .record_link_check(NewLinkCheck {
                user_id,
                url: report.url.clone(),
                is_safe: report.is_safe,
                risk_score: report.risk_score,
                timestamp: now,
            })
            .await?;

        Ok(CheckOutcome {
            access: decision.mode,
            report,
        })
    }

    /// Reject a file check before the upload is read. Consumes nothing.
    pub async fn precheck_file_check(&self, user_id: UserId, now: DateTime<Utc>) -> CoreResult<()> {
        let decision = self
            .engine
            .evaluate(user_id, ServiceType::FileChecker, now)
            .await?;
        if decision.allowed {
            Ok(())
        } else {
            Err(CoreError::AccessDenied(ServiceType::FileChecker))
        }
    }

    /// Grant a file check once the upload is stored, consuming the trial if
    /// that is the only way in
    pub async fn authorize_file_check(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> CoreResult<AccessMode> {
        let decision = self
            .engine
            .require(user_id, ServiceType::FileChecker, now)
            .await?;
        Ok(decision.mode)
    }

    /// Record a scan of an already-stored upload.
    ///
    /// Callers authorize first with [`authorize_file_check`](Self::authorize_file_check).
    pub async fn record_file_scan(
        &self,
        user_id: UserId,
        filename: &str,
        size_bytes: u64,
        now: DateTime<Utc>,
    ) -> CoreResult<FileReport> {
        let report = checks::scan_file(filename, size_bytes);
        self.history
            .record_file_check(NewFileCheck {
                user_id,
                filename: report.filename.clone(),
                file_type: report.file_type.clone(),
                is_safe: report.is_safe,
                scan_result: report.scan_result.clone(),
                timestamp: now,
            })
            .await?;
        Ok(report)
    }

    // =========================================================================
    // History
    // =========================================================================

    pub async fn recent_geolocation(&self, user_id: UserId) -> CoreResult<Vec<GeolocationSearch>> {
        let rows = self
            .history
            .recent_geolocation(user_id, self.config.history_limit)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn recent_link_checks(&self, user_id: UserId) -> CoreResult<Vec<LinkCheck>> {
        let rows = self
            .history
            .recent_link_checks(user_id, self.config.history_limit)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn recent_file_checks(&self, user_id: UserId) -> CoreResult<Vec<FileCheck>> {
        let rows = self
            .history
            .recent_file_checks(user_id, self.config.history_limit)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Create a subscription from the payment form
    pub async fn subscribe(&self, req: NewSubscription, now: DateTime<Utc>) -> CoreResult<Subscription> {
        self.lifecycle.create_subscription(req, now).await
    }

    pub async fn subscriptions(&self, user_id: UserId) -> CoreResult<Vec<Subscription>> {
        self.lifecycle.list_for_user(user_id).await
    }

    /// User, per-service access and subscriptions
    pub async fn dashboard(&self, user_id: UserId, now: DateTime<Utc>) -> CoreResult<Dashboard> {
        let user = self.accounts.find(user_id).await?;
        let access = self.engine.access_summary(user_id, now).await?;
        let subscriptions = self.lifecycle.list_for_user(user_id).await?;
        Ok(Dashboard {
            user,
            access,
            subscriptions,
        })
    }
}

impl SqliteWardenService {
    /// Build from SQLite repositories with the trusted-reference verifier
    pub fn from_repositories(repos: Repositories, config: EntitlementConfig) -> CoreResult<Self> {
        Self::new(
            config,
            Arc::new(repos.users),
            Arc::new(repos.subscriptions),
            Arc::new(repos.history),
            Arc::new(TrustedReferenceVerifier),
        )
    }
}

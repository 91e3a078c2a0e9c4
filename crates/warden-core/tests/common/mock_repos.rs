//! In-memory repositories with failure injection

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use warden_db::{
    CreateSubscription, CreateUser, DbError, DbResult, FileCheckRow, GeolocationSearchRow,
    HistoryRepository, LinkCheckRow, NewFileCheck, NewGeolocationSearch, NewLinkCheck,
    RenewalUpdate, SubscriptionRepository, SubscriptionRow, UserRepository, UserRow,
};
use warden_types::{ServiceType, SubscriptionId, UserId};

#[allow(dead_code)]
pub const TEST_SECRET: &str = "test-session-secret-that-is-32-bytes!";

fn injected() -> DbError {
    DbError::Sqlx(sqlx::Error::PoolTimedOut)
}

/// In-memory user repository for testing
#[derive(Default, Clone)]
pub struct MockUserRepository {
    users: Arc<DashMap<i64, UserRow>>,
    next_id: Arc<AtomicI64>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test user with unused trials
    #[allow(dead_code)]
    pub fn insert_user(&self, username: &str) -> UserId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.users.insert(
            id,
            UserRow {
                id,
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "$argon2id$not-a-real-hash".to_string(),
                is_active: true,
                geolocation_trial_used: false,
                link_checker_trial_used: false,
                file_checker_trial_used: false,
                created_at: Utc::now(),
            },
        );
        UserId(id)
    }

    /// Read the stored trial flag
    #[allow(dead_code)]
    pub fn trial_used(&self, id: UserId, service: ServiceType) -> bool {
        self.users
            .get(&id.0)
            .is_some_and(|row| row.trials().is_used(service))
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>> {
        Ok(self.users.get(&id.0).map(|r| r.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .users
            .iter()
            .find(|r| r.username == username)
            .map(|r| r.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        Ok(self
            .users
            .iter()
            .find(|r| r.email == email)
            .map(|r| r.value().clone()))
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        if self.find_by_username(&user.username).await?.is_some() {
            return Err(DbError::ConstraintViolated(
                "UNIQUE constraint failed: users.username".into(),
            ));
        }
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(DbError::ConstraintViolated(
                "UNIQUE constraint failed: users.email".into(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = UserRow {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
            geolocation_trial_used: false,
            link_checker_trial_used: false,
            file_checker_trial_used: false,
            created_at: user.created_at,
        };
        self.users.insert(id, row.clone());
        Ok(row)
    }

    async fn mark_trial_used(&self, id: UserId, service: ServiceType) -> DbResult<bool> {
        let mut row = self.users.get_mut(&id.0).ok_or(DbError::NotFound)?;
        let flag = match service {
            ServiceType::Geolocation => &mut row.geolocation_trial_used,
            ServiceType::LinkChecker => &mut row.link_checker_trial_used,
            ServiceType::FileChecker => &mut row.file_checker_trial_used,
        };
        let flipped = !*flag;
        *flag = true;
        Ok(flipped)
    }
}

/// In-memory subscription repository for testing
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    subscriptions: Arc<DashMap<i64, SubscriptionRow>>,
    next_id: Arc<AtomicI64>,
    failing_renewals: Arc<DashSet<i64>>,
    fail_queries: Arc<AtomicBool>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `apply_renewal` fail for one subscription
    #[allow(dead_code)]
    pub fn fail_renewal_of(&self, id: SubscriptionId) {
        self.failing_renewals.insert(id.0);
    }

    /// Make the sweep candidate query fail
    #[allow(dead_code)]
    pub fn fail_queries(&self) {
        self.fail_queries.store(true, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn get(&self, id: SubscriptionId) -> Option<SubscriptionRow> {
        self.subscriptions.get(&id.0).map(|r| r.value().clone())
    }

    /// Remove a row behind the caller's back
    #[allow(dead_code)]
    pub fn remove(&self, id: SubscriptionId) {
        self.subscriptions.remove(&id.0);
    }

    /// Insert a subscription row directly
    #[allow(dead_code)]
    pub fn insert(
        &self,
        user_id: UserId,
        purchase_date: DateTime<Utc>,
        duration_days: i64,
        auto_renew: bool,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.subscriptions.insert(
            id,
            SubscriptionRow {
                id,
                user_id: user_id.0,
                service_type: ServiceType::Geolocation.as_str().to_string(),
                payment_method: "gcash".to_string(),
                payment_reference: format!("REF{id:06}"),
                amount_cents: 9_900,
                purchase_date,
                expiry_date: purchase_date + chrono::Duration::days(duration_days),
                duration_days,
                is_active: true,
                auto_renew,
                renewal_contact: Some("09171234567".to_string()),
                last_renewal_date: None,
            },
        );
        SubscriptionId(id)
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<SubscriptionRow>> {
        Ok(self.get(id))
    }

    async fn find_by_user_id(&self, user_id: UserId) -> DbResult<Vec<SubscriptionRow>> {
        let mut rows: Vec<_> = self
            .subscriptions
            .iter()
            .filter(|r| r.user_id == user_id.0)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_active_for_service(
        &self,
        user_id: UserId,
        service: ServiceType,
    ) -> DbResult<Vec<SubscriptionRow>> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|r| r.user_id == user_id.0 && r.service_type == service.as_str() && r.is_active)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        if sub.amount_cents <= 0 {
            return Err(DbError::ConstraintViolated(
                "CHECK constraint failed: amount_cents > 0".into(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = SubscriptionRow {
            id,
            user_id: sub.user_id.0,
            service_type: sub.service_type.as_str().to_string(),
            payment_method: sub.payment_method,
            payment_reference: sub.payment_reference,
            amount_cents: sub.amount_cents,
            purchase_date: sub.purchase_date,
            expiry_date: sub.expiry_date,
            duration_days: sub.duration_days,
            is_active: true,
            auto_renew: sub.auto_renew,
            renewal_contact: sub.renewal_contact,
            last_renewal_date: None,
        };
        self.subscriptions.insert(id, row.clone());
        Ok(row)
    }

    async fn find_due_for_renewal(
        &self,
        threshold: DateTime<Utc>,
    ) -> DbResult<Vec<SubscriptionRow>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(injected());
        }

        let mut rows: Vec<_> = self
            .subscriptions
            .iter()
            .filter(|r| r.auto_renew && r.is_active && r.expiry_date <= threshold)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.expiry_date.cmp(&b.expiry_date).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn apply_renewal(&self, id: SubscriptionId, renewal: RenewalUpdate) -> DbResult<bool> {
        if self.failing_renewals.contains(&id.0) {
            return Err(injected());
        }

        let mut row = self.subscriptions.get_mut(&id.0).ok_or(DbError::NotFound)?;
        if !row.is_active || !row.auto_renew || row.expiry_date != renewal.expected_expiry {
            return Ok(false);
        }
        row.expiry_date = renewal.new_expiry;
        row.last_renewal_date = Some(renewal.renewed_at);
        Ok(true)
    }
}

/// In-memory history repository for testing
#[derive(Default, Clone)]
pub struct MockHistoryRepository {
    geolocation: Arc<DashMap<i64, GeolocationSearchRow>>,
    links: Arc<DashMap<i64, LinkCheckRow>>,
    files: Arc<DashMap<i64, FileCheckRow>>,
    next_id: Arc<AtomicI64>,
}

impl MockHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[allow(dead_code)]
    pub fn geolocation_count(&self) -> usize {
        self.geolocation.len()
    }
}

fn newest_first<T: Clone>(
    map: &DashMap<i64, T>,
    user_id: UserId,
    limit: i64,
    key: impl Fn(&T) -> (i64, DateTime<Utc>),
) -> Vec<T> {
    let mut rows: Vec<_> = map
        .iter()
        .filter(|r| key(r.value()).0 == user_id.0)
        .map(|r| (*r.key(), r.value().clone()))
        .collect();
    rows.sort_by(|(a_id, a), (b_id, b)| key(b).1.cmp(&key(a).1).then(b_id.cmp(a_id)));
    rows.into_iter()
        .take(usize::try_from(limit).unwrap_or(0))
        .map(|(_, row)| row)
        .collect()
}

#[async_trait]
impl HistoryRepository for MockHistoryRepository {
    async fn record_geolocation(&self, entry: NewGeolocationSearch) -> DbResult<GeolocationSearchRow> {
        let row = GeolocationSearchRow {
            id: self.next(),
            user_id: entry.user_id.0,
            ip_address: entry.ip_address,
            location: entry.location,
            isp: entry.isp,
            timestamp: entry.timestamp,
        };
        self.geolocation.insert(row.id, row.clone());
        Ok(row)
    }

    async fn record_link_check(&self, entry: NewLinkCheck) -> DbResult<LinkCheckRow> {
        let row = LinkCheckRow {
            id: self.next(),
            user_id: entry.user_id.0,
            url: entry.url,
            is_safe: entry.is_safe,
            risk_score: entry.risk_score,
            timestamp: entry.timestamp,
        };
        self.links.insert(row.id, row.clone());
        Ok(row)
    }

    async fn record_file_check(&self, entry: NewFileCheck) -> DbResult<FileCheckRow> {
        let row = FileCheckRow {
            id: self.next(),
            user_id: entry.user_id.0,
            filename: entry.filename,
            file_type: entry.file_type,
            is_safe: entry.is_safe,
            scan_result: entry.scan_result,
            timestamp: entry.timestamp,
        };
        self.files.insert(row.id, row.clone());
        Ok(row)
    }

    async fn recent_geolocation(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> DbResult<Vec<GeolocationSearchRow>> {
        Ok(newest_first(&self.geolocation, user_id, limit, |r| (r.user_id, r.timestamp)))
    }

    async fn recent_link_checks(&self, user_id: UserId, limit: i64) -> DbResult<Vec<LinkCheckRow>> {
        Ok(newest_first(&self.links, user_id, limit, |r| (r.user_id, r.timestamp)))
    }

    async fn recent_file_checks(&self, user_id: UserId, limit: i64) -> DbResult<Vec<FileCheckRow>> {
        Ok(newest_first(&self.files, user_id, limit, |r| (r.user_id, r.timestamp)))
    }
}

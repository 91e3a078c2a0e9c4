//! SQLite store integration tests
//!
//! Run against a migrated in-memory database.

use chrono::{Duration, Utc};
use warden_db::{
    create_memory_pool, create_pool, run_migrations, store_status, CreateSubscription, CreateUser,
    DbError, HistoryRepository, NewGeolocationSearch, RenewalUpdate, Repositories,
    SubscriptionRepository, UserRepository,
};
use warden_types::{ServiceType, SubscriptionId, UserId};

async fn repos() -> Repositories {
    let pool = create_memory_pool().await.expect("in-memory pool");
    Repositories::new(pool)
}

fn new_user(name: &str) -> CreateUser {
    CreateUser {
        username: name.to_string(),
        email: format!("{name}@example.com"),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        created_at: Utc::now(),
    }
}

fn new_subscription(user_id: UserId, days: i64, auto_renew: bool) -> CreateSubscription {
    let now = Utc::now();
    CreateSubscription {
        user_id,
        service_type: ServiceType::Geolocation,
        payment_method: "gcash".to_string(),
        payment_reference: "REF123456".to_string(),
        amount_cents: 9_900,
        purchase_date: now,
        expiry_date: now + Duration::days(days),
        duration_days: days,
        auto_renew,
        renewal_contact: Some("09171234567".to_string()),
    }
}

#[tokio::test]
async fn test_user_create_and_lookup() {
    let repos = repos().await;

    let user = repos.users.create(new_user("juan")).await.unwrap();
    assert!(user.is_active);
    assert!(!user.geolocation_trial_used);

    let by_name = repos.users.find_by_username("juan").await.unwrap().unwrap();
    assert_eq!(by_name.id, user.id);

    let by_email = repos.users.find_by_email("juan@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    assert!(repos.users.find_by_id(UserId(9_999)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_username_and_email_are_constraint_violations() {
    let repos = repos().await;
    repos.users.create(new_user("maria")).await.unwrap();

    let mut same_name = new_user("maria");
    same_name.email = "other@example.com".to_string();
    let err = repos.users.create(same_name).await.unwrap_err();
    assert!(err.is_unique_violation_on("users.username"), "{err:?}");

    let mut same_email = new_user("other");
    same_email.email = "maria@example.com".to_string();
    let err = repos.users.create(same_email).await.unwrap_err();
    assert!(err.is_unique_violation_on("users.email"), "{err:?}");
}

#[tokio::test]
async fn test_mark_trial_used_transitions_once() {
    let repos = repos().await;
    let user = repos.users.create(new_user("trial")).await.unwrap();
    let id = user.user_id();

    assert!(repos.users.mark_trial_used(id, ServiceType::Geolocation).await.unwrap());
    assert!(!repos.users.mark_trial_used(id, ServiceType::Geolocation).await.unwrap());

    let row = repos.users.find_by_id(id).await.unwrap().unwrap();
    assert!(row.geolocation_trial_used);
    assert!(!row.link_checker_trial_used);
}

#[tokio::test]
async fn test_mark_trial_used_unknown_user_is_not_found() {
    let repos = repos().await;
    let err = repos
        .users
        .mark_trial_used(UserId(42), ServiceType::Geolocation)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[tokio::test]
async fn test_concurrent_trial_consumption_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("warden.db").display());
    let pool = create_pool(&url).await.unwrap();
    run_migrations(&pool).await.unwrap();
    let repos = Repositories::new(pool);

    let user = repos.users.create(new_user("racer")).await.unwrap();
    let id = user.user_id();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let users = repos.users.clone();
        handles.push(tokio::spawn(async move {
            users.mark_trial_used(id, ServiceType::Geolocation).await
        }));
    }

    let mut transitions = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap() {
            transitions += 1;
        }
    }
    assert_eq!(transitions, 1);
}

#[tokio::test]
async fn test_subscription_round_trip_preserves_dates() {
    let repos = repos().await;
    let user = repos.users.create(new_user("sub")).await.unwrap();

    let created = repos
        .subscriptions
        .create(new_subscription(user.user_id(), 30, false))
        .await
        .unwrap();
    assert!(created.is_active);

    let fetched = repos
        .subscriptions
        .find_by_id(created.subscription_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.purchase_date, created.purchase_date);
    assert_eq!(fetched.expiry_date - fetched.purchase_date, Duration::days(30));
    assert_eq!(fetched.renewal_contact.as_deref(), Some("09171234567"));
    assert!(fetched.last_renewal_date.is_none());
}

#[tokio::test]
async fn test_subscription_rejects_non_positive_amount() {
    let repos = repos().await;
    let user = repos.users.create(new_user("cheap")).await.unwrap();

    let mut sub = new_subscription(user.user_id(), 30, false);
    sub.amount_cents = 0;
    let err = repos.subscriptions.create(sub).await.unwrap_err();
    assert!(matches!(err, DbError::ConstraintViolated(_)), "{err:?}");
}

#[tokio::test]
async fn test_find_active_for_service_filters_service() {
    let repos = repos().await;
    let user = repos.users.create(new_user("svc")).await.unwrap();
    repos
        .subscriptions
        .create(new_subscription(user.user_id(), 30, false))
        .await
        .unwrap();

    let geo = repos
        .subscriptions
        .find_active_for_service(user.user_id(), ServiceType::Geolocation)
        .await
        .unwrap();
    assert_eq!(geo.len(), 1);

    let links = repos
        .subscriptions
        .find_active_for_service(user.user_id(), ServiceType::LinkChecker)
        .await
        .unwrap();
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_due_for_renewal_query() {
    let repos = repos().await;
    let user = repos.users.create(new_user("renew")).await.unwrap();
    let uid = user.user_id();

    let soon = repos.subscriptions.create(new_subscription(uid, 30, true)).await.unwrap();
    let _later = repos.subscriptions.create(new_subscription(uid, 90, true)).await.unwrap();
    let _manual = repos.subscriptions.create(new_subscription(uid, 30, false)).await.unwrap();

    let threshold = Utc::now() + Duration::days(31);
    let due = repos.subscriptions.find_due_for_renewal(threshold).await.unwrap();
    let ids: Vec<i64> = due.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![soon.id]);
}

#[tokio::test]
async fn test_apply_renewal_is_guarded_by_expiry() {
    let repos = repos().await;
    let user = repos.users.create(new_user("cas")).await.unwrap();
    let sub = repos
        .subscriptions
        .create(new_subscription(user.user_id(), 30, true))
        .await
        .unwrap();

    let now = Utc::now();
    let update = RenewalUpdate {
        expected_expiry: sub.expiry_date,
        new_expiry: now + Duration::days(30),
        renewed_at: now,
    };

    assert!(repos.subscriptions.apply_renewal(sub.subscription_id(), update).await.unwrap());
    // The same guard no longer matches once the row has moved.
    assert!(!repos.subscriptions.apply_renewal(sub.subscription_id(), update).await.unwrap());

    let renewed = repos
        .subscriptions
        .find_by_id(sub.subscription_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renewed.expiry_date, update.new_expiry);
    assert_eq!(renewed.last_renewal_date, Some(now));
    assert_eq!(renewed.purchase_date, sub.purchase_date);
}

#[tokio::test]
async fn test_apply_renewal_unknown_id_is_not_found() {
    let repos = repos().await;
    let now = Utc::now();
    let err = repos
        .subscriptions
        .apply_renewal(
            SubscriptionId(77),
            RenewalUpdate {
                expected_expiry: now,
                new_expiry: now + Duration::days(30),
                renewed_at: now,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[tokio::test]
async fn test_recent_history_is_newest_first_and_limited() {
    let repos = repos().await;
    let user = repos.users.create(new_user("hist")).await.unwrap();
    let start = Utc::now();

    for i in 0..7 {
        repos
            .history
            .record_geolocation(NewGeolocationSearch {
                user_id: user.user_id(),
                ip_address: format!("10.0.0.{i}"),
                location: "Baguio City, Philippines".to_string(),
                isp: "PLDT".to_string(),
                timestamp: start + Duration::seconds(i),
            })
            .await
            .unwrap();
    }

    let recent = repos.history.recent_geolocation(user.user_id(), 5).await.unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].ip_address, "10.0.0.6");
    assert_eq!(recent[4].ip_address, "10.0.0.2");
}

#[tokio::test]
async fn test_store_status_tracks_migrations() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("status.db").display());
    let pool = create_pool(&url).await.unwrap();

    let before = store_status(&pool).await.unwrap();
    assert_eq!(before.journal_mode, "wal");
    assert_eq!(before.schema_version, 0);
    assert!(before.latest_schema_version >= 1);
    assert!(!before.is_current());

    run_migrations(&pool).await.unwrap();
    let after = store_status(&pool).await.unwrap();
    assert_eq!(after.schema_version, after.latest_schema_version);
    assert!(after.is_current());
}

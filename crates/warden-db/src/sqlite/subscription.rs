//! SQLite subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use warden_types::{ServiceType, SubscriptionId, UserId};

use crate::error::{DbError, DbResult};
use crate::models::SubscriptionRow;
use crate::repo::{CreateSubscription, RenewalUpdate, SubscriptionRepository};

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, service_type, payment_method, payment_reference, \
     amount_cents, purchase_date, expiry_date, duration_days, is_active, auto_renew, \
     renewal_contact, last_renewal_date";

/// SQLite subscription repository
#[derive(Clone)]
pub struct SqliteSubscriptionRepository {
    pool: SqlitePool,
}

impl SqliteSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SqliteSubscriptionRepository {
    async fn find_by_id(&self, id: SubscriptionId) -> DbResult<Option<SubscriptionRow>> {
        let sql = format!("SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions WHERE id = ?");
        let sub = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sub)
    }

    async fn find_by_user_id(&self, user_id: UserId) -> DbResult<Vec<SubscriptionRow>> {
        let sql = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE user_id = ? ORDER BY purchase_date DESC, id DESC"
        );
        let subs = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(user_id.0)
            .fetch_all(&self.pool)
            .await?;

        Ok(subs)
    }

    async fn find_active_for_service(
        &self,
        user_id: UserId,
        service: ServiceType,
    ) -> DbResult<Vec<SubscriptionRow>> {
        let sql = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE user_id = ? AND service_type = ? AND is_active = 1 \
             ORDER BY expiry_date DESC"
        );
        let subs = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(user_id.0)
            .bind(service.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(subs)
    }

    async fn create(&self, sub: CreateSubscription) -> DbResult<SubscriptionRow> {
        let sql = format!(
            "INSERT INTO subscriptions (user_id, service_type, payment_method, payment_reference, \
                                        amount_cents, purchase_date, expiry_date, duration_days, \
                                        is_active, auto_renew, renewal_contact) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?) \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(sub.user_id.0)
            .bind(sub.service_type.as_str())
            .bind(&sub.payment_method)
            .bind(&sub.payment_reference)
            .bind(sub.amount_cents)
            .bind(sub.purchase_date)
            .bind(sub.expiry_date)
            .bind(sub.duration_days)
            .bind(sub.auto_renew)
            .bind(&sub.renewal_contact)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_due_for_renewal(
        &self,
        threshold: DateTime<Utc>,
    ) -> DbResult<Vec<SubscriptionRow>> {
        let sql = format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE auto_renew = 1 AND is_active = 1 AND expiry_date <= ? \
             ORDER BY expiry_date, id"
        );
        let subs = sqlx::query_as::<_, SubscriptionRow>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        Ok(subs)
    }

    async fn apply_renewal(&self, id: SubscriptionId, renewal: RenewalUpdate) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET expiry_date = ?, last_renewal_date = ?
            WHERE id = ? AND auto_renew = 1 AND is_active = 1 AND expiry_date = ?
            "#,
        )
        .bind(renewal.new_expiry)
        .bind(renewal.renewed_at)
        .bind(id.0)
        .bind(renewal.expected_expiry)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT id FROM subscriptions WHERE id = ?")
                    .bind(id.0)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(DbError::NotFound);
            }
            tracing::debug!(subscription_id = %id, "Renewal guard did not match, row moved or ineligible");
        }
        tx.commit().await?;

        Ok(result.rows_affected() == 1)
    }
}

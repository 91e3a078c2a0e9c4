//! SQLite user repository implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use warden_types::{ServiceType, UserId};

use crate::error::{DbError, DbResult};
use crate::models::UserRow;
use crate::repo::{CreateUser, UserRepository};

const USER_COLUMNS: &str = "id, username, email, password_hash, is_active, \
     geolocation_trial_used, link_checker_trial_used, file_checker_trial_used, created_at";

/// Column holding the trial flag for a service
const fn trial_column(service: ServiceType) -> &'static str {
    match service {
        ServiceType::Geolocation => "geolocation_trial_used",
        ServiceType::LinkChecker => "link_checker_trial_used",
        ServiceType::FileChecker => "file_checker_trial_used",
    }
}

/// SQLite user repository
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> DbResult<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = ?");
        let user = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: UserId) -> DbResult<Option<UserRow>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let user = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<UserRow>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<UserRow>> {
        self.find_one("email", email).await
    }

    async fn create(&self, user: CreateUser) -> DbResult<UserRow> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, created_at) \
             VALUES (?, ?, ?, ?) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    async fn mark_trial_used(&self, id: UserId, service: ServiceType) -> DbResult<bool> {
        let column = trial_column(service);
        let sql = format!("UPDATE users SET {column} = 1 WHERE id = ? AND {column} = 0");

        // The conditional update is the read-modify-write: of any number of
        // concurrent callers exactly one sees a changed row.
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(&sql).bind(id.0).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
                .bind(id.0)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                return Err(DbError::NotFound);
            }
        }
        tx.commit().await?;

        Ok(result.rows_affected() == 1)
    }
}

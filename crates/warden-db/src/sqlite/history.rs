//! SQLite check history repository implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use warden_types::UserId;

use crate::error::DbResult;
use crate::models::{FileCheckRow, GeolocationSearchRow, LinkCheckRow};
use crate::repo::{HistoryRepository, NewFileCheck, NewGeolocationSearch, NewLinkCheck};

/// SQLite check history repository
#[derive(Clone)]
pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

impl SqliteHistoryRepository {
    /// Create a new history repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn record_geolocation(&self, entry: NewGeolocationSearch) -> DbResult<GeolocationSearchRow> {
        let row = sqlx::query_as::<_, GeolocationSearchRow>(
            r#"
            INSERT INTO geolocation_searches (user_id, ip_address, location, isp, timestamp)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, ip_address, location, isp, timestamp
            "#,
        )
        .bind(entry.user_id.0)
        .bind(&entry.ip_address)
        .bind(&entry.location)
        .bind(&entry.isp)
        .bind(entry.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn record_link_check(&self, entry: NewLinkCheck) -> DbResult<LinkCheckRow> {
        let row = sqlx::query_as::<_, LinkCheckRow>(
            r#"
            INSERT INTO link_checks (user_id, url, is_safe, risk_score, timestamp)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, user_id, url, is_safe, risk_score, timestamp
            "#,
        )
        .bind(entry.user_id.0)
        .bind(&entry.url)
        .bind(entry.is_safe)
        .bind(entry.risk_score)
        .bind(entry.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn record_file_check(&self, entry: NewFileCheck) -> DbResult<FileCheckRow> {
        let row = sqlx::query_as::<_, FileCheckRow>(
            r#"
            INSERT INTO file_checks (user_id, filename, file_type, is_safe, scan_result, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, filename, file_type, is_safe, scan_result, timestamp
            "#,
        )
        .bind(entry.user_id.0)
        .bind(&entry.filename)
        .bind(&entry.file_type)
        .bind(entry.is_safe)
        .bind(&entry.scan_result)
        .bind(entry.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn recent_geolocation(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> DbResult<Vec<GeolocationSearchRow>> {
        let rows = sqlx::query_as::<_, GeolocationSearchRow>(
            r#"
            SELECT id, user_id, ip_address, location, isp, timestamp
            FROM geolocation_searches
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn recent_link_checks(&self, user_id: UserId, limit: i64) -> DbResult<Vec<LinkCheckRow>> {
        let rows = sqlx::query_as::<_, LinkCheckRow>(
            r#"
            SELECT id, user_id, url, is_safe, risk_score, timestamp
            FROM link_checks
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn recent_file_checks(&self, user_id: UserId, limit: i64) -> DbResult<Vec<FileCheckRow>> {
        let rows = sqlx::query_as::<_, FileCheckRow>(
            r#"
            SELECT id, user_id, filename, file_type, is_safe, scan_result, timestamp
            FROM file_checks
            WHERE user_id = ?
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.0)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

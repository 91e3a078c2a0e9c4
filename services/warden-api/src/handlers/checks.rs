//! Security check handlers

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use warden_core::checks::{self, EmailReport, FileReport, GeolocationReport, LinkReport, PhoneReport};
use warden_core::validation::sanitize_filename;
use warden_core::CheckOutcome;
use warden_types::{AccessMode, FileCheck, GeolocationSearch, LinkCheck, UserId};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::handlers::shared::ListResponse;
use crate::state::AppState;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GeolocationRequest {
    pub ip_address: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkCheckRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct FileCheckQuery {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailCheckRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub phone_number: String,
}

/// Check result with the access path that allowed it
#[derive(Debug, Serialize)]
pub struct CheckResponse<T> {
    pub access: AccessMode,
    /// Set when this request used up the free trial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
    pub result: T,
}

impl<T> From<CheckOutcome<T>> for CheckResponse<T> {
    fn from(outcome: CheckOutcome<T>) -> Self {
        Self {
            notice: (outcome.access == AccessMode::Trial).then_some(
                "You used your free trial. Future checks require a subscription.",
            ),
            access: outcome.access,
            result: outcome.report,
        }
    }
}

// ============================================================================
// Gated checks
// ============================================================================

/// POST /api/v1/geolocation
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn geolocation(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<GeolocationRequest>,
) -> ApiResult<Json<CheckResponse<GeolocationReport>>> {
    let outcome = state
        .warden
        .geolocate(user.id, &req.ip_address, Utc::now())
        .await?;
    Ok(Json(outcome.into()))
}

/// GET /api/v1/geolocation/history
pub async fn geolocation_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ListResponse<GeolocationSearch>>> {
    Ok(Json(state.warden.recent_geolocation(user.id).await?.into()))
}

/// POST /api/v1/link-check
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn link_check(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<LinkCheckRequest>,
) -> ApiResult<Json<CheckResponse<LinkReport>>> {
    let outcome = state.warden.check_link(user.id, &req.url, Utc::now()).await?;
    Ok(Json(outcome.into()))
}

/// GET /api/v1/link-check/history
pub async fn link_check_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ListResponse<LinkCheck>>> {
    Ok(Json(state.warden.recent_link_checks(user.id).await?.into()))
}

/// POST /api/v1/file-check?filename=
///
/// The raw request body is the file. Access is checked before the body is
/// read; the trial, if any, is only spent once the upload is on disk. The
/// stored file is removed after the scan and only the history row remains.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn file_check(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<FileCheckQuery>,
    body: Body,
) -> ApiResult<Json<CheckResponse<FileReport>>> {
    let now = Utc::now();
    state.warden.precheck_file_check(user.id, now).await?;

    let body = axum::body::to_bytes(body, MAX_UPLOAD_BYTES)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Upload body rejected");
            ApiError::PayloadTooLarge(MAX_UPLOAD_BYTES)
        })?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty upload".into()));
    }

    let filename = sanitize_filename(&query.filename);
    let stored = store_upload(&state.config.upload_dir, &filename, &body).await?;

    let result = scan_upload(&state, user.id, &filename, body.len() as u64, now).await;
    remove_upload(&stored).await;
    Ok(Json(result?.into()))
}

async fn store_upload(upload_dir: &Path, filename: &str, body: &[u8]) -> ApiResult<PathBuf> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::Upload(format!("create {}: {e}", upload_dir.display())))?;

    let stored = upload_dir.join(format!("{}-{filename}", uuid::Uuid::new_v4()));
    tokio::fs::write(&stored, body)
        .await
        .map_err(|e| ApiError::Upload(format!("write {}: {e}", stored.display())))?;
    Ok(stored)
}

async fn scan_upload(
    state: &AppState,
    user_id: UserId,
    filename: &str,
    size_bytes: u64,
    now: DateTime<Utc>,
) -> ApiResult<CheckOutcome<FileReport>> {
    let access = state.warden.authorize_file_check(user_id, now).await?;
    let report = state
        .warden
        .record_file_scan(user_id, filename, size_bytes, now)
        .await?;
    Ok(CheckOutcome { access, report })
}

async fn remove_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove scanned upload");
    }
}

/// GET /api/v1/file-check/history
pub async fn file_check_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ListResponse<FileCheck>>> {
    Ok(Json(state.warden.recent_file_checks(user.id).await?.into()))
}

// ============================================================================
// Open checks
// ============================================================================

/// POST /api/v1/check-email
pub async fn check_email(Json(req): Json<EmailCheckRequest>) -> Json<EmailReport> {
    Json(checks::check_email(&req.content))
}

/// POST /api/v1/validate-phone
pub async fn validate_phone(Json(req): Json<PhoneRequest>) -> Json<PhoneReport> {
    Json(checks::validate_phone(&req.phone_number))
}

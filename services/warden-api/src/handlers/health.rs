//! Liveness and readiness probes

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_schema_version: Option<i64>,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /ready
///
/// Ready once the store answers and every embedded migration is applied.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    match warden_db::store_status(&state.pool).await {
        Ok(store) => {
            let current = store.is_current();
            if !current {
                tracing::warn!(
                    schema_version = store.schema_version,
                    latest = store.latest_schema_version,
                    "Schema migrations pending"
                );
            }
            let status = if current {
                StatusCode::OK
            } else {
                StatusCode::SERVICE_UNAVAILABLE
            };
            (
                status,
                Json(ReadyResponse {
                    status: if current { "ready" } else { "migrations_pending" },
                    database: "connected",
                    journal_mode: Some(store.journal_mode),
                    schema_version: Some(store.schema_version),
                    latest_schema_version: Some(store.latest_schema_version),
                }),
            )
        }
        Err(e) => {
            tracing::error!(error = ?e, "Store readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse {
                    status: "unavailable",
                    database: "disconnected",
                    journal_mode: None,
                    schema_version: None,
                    latest_schema_version: None,
                }),
            )
        }
    }
}

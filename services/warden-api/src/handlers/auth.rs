//! Account handlers (register, login)

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use warden_core::Registration;

use crate::error::ApiResult;
use crate::handlers::shared::UserInfo;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_at: String,
    pub user: UserInfo,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/register
#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .warden
        .accounts()
        .register(
            Registration {
                username: req.username,
                email: req.email,
                password: req.password,
            },
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

/// POST /api/v1/auth/login
///
/// Exchange a username and password for a bearer token
#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (user, session) = state
        .warden
        .accounts()
        .login(&req.username, &req.password, Utc::now())
        .await?;

    Ok(Json(LoginResponse {
        token: session.token,
        token_type: "Bearer",
        expires_at: session.expires_at.to_rfc3339(),
        user: UserInfo::from(&user),
    }))
}

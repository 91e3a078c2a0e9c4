//! Dashboard handler

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use warden_types::{ServiceAccess, Subscription};

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::shared::UserInfo;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: UserInfo,
    pub access: Vec<ServiceAccess>,
    pub subscriptions: Vec<Subscription>,
}

/// GET /api/v1/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<DashboardResponse>> {
    let dashboard = state.warden.dashboard(user.id, Utc::now()).await?;

    Ok(Json(DashboardResponse {
        user: UserInfo::from(&dashboard.user),
        access: dashboard.access,
        subscriptions: dashboard.subscriptions,
    }))
}

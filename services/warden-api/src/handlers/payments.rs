//! Payment and subscription handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;
use warden_core::validation::parse_amount;
use warden_core::NewSubscription;
use warden_types::{PaymentMethod, ServiceType, Subscription};

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::shared::ListResponse;
use crate::state::AppState;

fn default_service() -> ServiceType {
    ServiceType::Geolocation
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(default = "default_service")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Decimal amount, e.g. `"249.00"`
    pub amount: String,
    pub reference_number: String,
    pub duration_days: i64,
    #[serde(default)]
    pub auto_renew: bool,
    pub contact_number: String,
}

/// POST /api/v1/payments
///
/// The reference number is recorded as entered; reconciliation happens offline.
#[instrument(skip_all, fields(user_id = %user.id, service = %req.service_type))]
pub async fn create_payment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let amount_cents = parse_amount(&req.amount)?;

    let subscription = state
        .warden
        .subscribe(
            NewSubscription {
                user_id: user.id,
                service_type: req.service_type,
                payment_method: req.payment_method,
                reference: req.reference_number,
                amount_cents,
                duration_days: req.duration_days,
                auto_renew: req.auto_renew,
                contact: req.contact_number,
            },
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(subscription)))
}

/// GET /api/v1/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ListResponse<Subscription>>> {
    let subscriptions = state.warden.subscriptions(user.id).await?;
    Ok(Json(subscriptions.into()))
}

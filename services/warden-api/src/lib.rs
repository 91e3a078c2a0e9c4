//! Warden API
//!
//! HTTP surface for the security-check suite.
//!
//! ## Public Endpoints
//!
//! - `POST /api/v1/auth/register` - Create an account
//! - `POST /api/v1/auth/login` - Exchange credentials for a bearer token
//! - `POST /api/v1/check-email` - Phishing check
//! - `POST /api/v1/validate-phone` - Contact number check
//!
//! ## Authenticated Endpoints
//!
//! - `GET /api/v1/dashboard` - User, per-service access and subscriptions
//! - `POST /api/v1/geolocation`, `GET /api/v1/geolocation/history`
//! - `POST /api/v1/link-check`, `GET /api/v1/link-check/history`
//! - `POST /api/v1/file-check?filename=`, `GET /api/v1/file-check/history`
//! - `POST /api/v1/payments` - Subscribe from a wallet payment reference
//! - `GET /api/v1/subscriptions` - List subscriptions
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//! - `GET /metrics` - Prometheus metrics

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::map_response_body::MapResponseBodyLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use crate::config::{Config, ConfigError};
pub use crate::state::AppState;

use crate::handlers::checks::MAX_UPLOAD_BYTES;
use crate::handlers::shared::track_http_metrics;

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let api_v1 = Router::new()
        // Accounts
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/dashboard", get(handlers::dashboard))
        // Gated checks
        .route("/geolocation", post(handlers::geolocation))
        .route("/geolocation/history", get(handlers::geolocation_history))
        .route("/link-check", post(handlers::link_check))
        .route("/link-check/history", get(handlers::link_check_history))
        .route("/file-check", post(handlers::file_check))
        .route("/file-check/history", get(handlers::file_check_history))
        // Open checks
        .route("/check-email", post(handlers::check_email))
        .route("/validate-phone", post(handlers::validate_phone))
        // Subscriptions
        .route("/payments", post(handlers::create_payment))
        .route("/subscriptions", get(handlers::list_subscriptions));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(MapResponseBodyLayer::new(axum::body::Body::new))
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .nest("/api/v1", api_v1)
        .route_layer(middleware::from_fn(track_http_metrics))
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}

/// Install the Prometheus recorder and describe the service metrics
pub fn setup_metrics() -> anyhow::Result<PrometheusHandle> {
    let latency_buckets = &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.2, 0.5, 1.0, 2.5];

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            latency_buckets,
        )?
        .install_recorder()?;

    metrics::describe_counter!(
        "warden_trials_consumed_total",
        "One-time trials consumed, by service"
    );
    metrics::describe_counter!(
        "warden_subscriptions_created_total",
        "Subscriptions created from payment claims, by service"
    );
    metrics::describe_counter!(
        "warden_renewals_total",
        "Renewal attempts by outcome"
    );
    metrics::describe_counter!(
        "warden_access_decisions_total",
        "Access decisions for gated checks, by mode"
    );
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request latency in seconds"
    );

    Ok(handle)
}

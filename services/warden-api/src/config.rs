//! Configuration for the Warden API service.

use chrono::Duration as ChronoDuration;
use std::path::PathBuf;
use std::time::Duration;
use warden_core::{EntitlementConfig, GatingPolicy, RenewalBasis};
use warden_types::ServiceType;

/// Default SQLite location, created on first start
pub const DEFAULT_DATABASE_URL: &str = "sqlite://warden.db?mode=rwc";

/// Warden API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,
    /// Database URL
    pub database_url: String,
    /// Entitlement core configuration
    pub entitlement: EntitlementConfig,
    /// Request timeout
    pub request_timeout: Duration,
    /// Directory for uploads awaiting a scan
    pub upload_dir: PathBuf,
    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let http_port = parse_or(&lookup, "HTTP_PORT", 8080)?;

        let session_secret = lookup("SESSION_SECRET").ok_or(ConfigError::Missing("SESSION_SECRET"))?;
        if session_secret.len() < 32 {
            return Err(ConfigError::Invalid("SESSION_SECRET"));
        }
        let session_hours: i64 = parse_or(&lookup, "SESSION_DURATION_HOURS", 24)?;
        if session_hours <= 0 {
            return Err(ConfigError::Invalid("SESSION_DURATION_HOURS"));
        }

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let upload_dir = lookup("UPLOAD_DIR").map_or_else(|| PathBuf::from("uploads"), PathBuf::from);

        let metrics_enabled = lookup("METRICS_ENABLED")
            .map(|v| v.parse().unwrap_or(true))
            .unwrap_or(true);

        let renewal_basis: RenewalBasis = lookup("RENEWAL_BASIS")
            .map(|v| v.parse())
            .transpose()
            .map_err(|_| ConfigError::Invalid("RENEWAL_BASIS"))?
            .unwrap_or_default();
        let lookahead_hours: i64 = parse_or(&lookup, "RENEWAL_LOOKAHEAD_HOURS", 24)?;

        let gated = parse_services(&lookup, "GATED_SERVICES")?;
        let trials = parse_services(&lookup, "TRIAL_SERVICES")?;

        let entitlement = EntitlementConfig::new(session_secret)
            .with_gating(GatingPolicy::from_lists(&gated, &trials))
            .with_renewal_basis(renewal_basis)
            .with_renewal_lookahead(ChronoDuration::hours(lookahead_hours))
            .with_session_duration(ChronoDuration::hours(session_hours));

        Ok(Self {
            http_port,
            database_url,
            entitlement,
            request_timeout: Duration::from_secs(request_timeout_secs),
            upload_dir,
            metrics_enabled,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Comma-separated service list; unset means geolocation only
fn parse_services(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Vec<ServiceType>, ConfigError> {
    let Some(value) = lookup(key) else {
        return Ok(vec![ServiceType::Geolocation]);
    };

    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(|_| ConfigError::Invalid(key)))
        .collect()
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

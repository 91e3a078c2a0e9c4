//! Configuration for the renewal worker.

use chrono::Duration as ChronoDuration;
use std::time::Duration;
use warden_core::RenewalBasis;

/// Default SQLite location, shared with the API
pub const DEFAULT_DATABASE_URL: &str = "sqlite://warden.db?mode=rwc";

/// Renewal worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL
    pub database_url: String,
    /// How renewals compute the next term
    pub renewal_basis: RenewalBasis,
    /// Subscriptions expiring within this window are renewed
    pub lookahead: ChronoDuration,
    /// Time between sweeps; `None` sweeps once and exits
    pub interval: Option<Duration>,
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

        let renewal_basis = match lookup("RENEWAL_BASIS") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::Invalid("RENEWAL_BASIS"))?,
            None => RenewalBasis::default(),
        };

        let lookahead_hours: i64 = parse_or(&lookup, "RENEWAL_LOOKAHEAD_HOURS", 24)?;
        if lookahead_hours < 0 {
            return Err(ConfigError::Invalid("RENEWAL_LOOKAHEAD_HOURS"));
        }

        // 0 (the default) means a single sweep, for cron-style scheduling
        let interval_secs: u64 = parse_or(&lookup, "RENEWAL_INTERVAL_SECS", 0)?;

        Ok(Self {
            database_url,
            renewal_basis,
            lookahead: ChronoDuration::hours(lookahead_hours),
            interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
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

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

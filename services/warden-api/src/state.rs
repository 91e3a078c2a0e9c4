//! Application state

use std::sync::Arc;

use warden_core::SqliteWardenService;
use warden_db::DbPool;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Accounts, entitlements, checks and subscriptions
    pub warden: Arc<SqliteWardenService>,
    /// Database connection pool (health checks)
    pub pool: DbPool,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(warden: SqliteWardenService, pool: DbPool, config: Config) -> Self {
        Self {
            warden: Arc::new(warden),
            pool,
            config: Arc::new(config),
        }
    }

    /// Get request timeout from config
    pub fn request_timeout(&self) -> std::time::Duration {
        self.config.request_timeout
    }
}

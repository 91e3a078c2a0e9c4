//! Warden DB - Entitlement store
//!
//! SQLx/SQLite persistence for users, subscriptions and check history.
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("sqlite://warden.db?mode=rwc").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let user = repos.users.find_by_username("juan").await?;
//! ```

pub mod error;
pub mod models;
pub mod pool;
pub mod repo;
pub mod sqlite;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pool::{
    create_memory_pool, create_pool, create_pool_with_options, run_migrations, store_status,
    DbPool, PoolOptions, StoreStatus,
};
pub use repo::*;
pub use sqlite::Repositories;

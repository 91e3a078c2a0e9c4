//! SQLite repository implementations

mod history;
mod subscription;
mod user;

pub use history::SqliteHistoryRepository;
pub use subscription::SqliteSubscriptionRepository;
pub use user::SqliteUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: SqliteUserRepository,
    pub subscriptions: SqliteSubscriptionRepository,
    pub history: SqliteHistoryRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: SqliteUserRepository::new(pool.clone()),
            subscriptions: SqliteSubscriptionRepository::new(pool.clone()),
            history: SqliteHistoryRepository::new(pool),
        }
    }
}

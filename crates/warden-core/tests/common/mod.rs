//! Common test utilities for warden-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{
    MockHistoryRepository, MockSubscriptionRepository, MockUserRepository, TEST_SECRET,
};

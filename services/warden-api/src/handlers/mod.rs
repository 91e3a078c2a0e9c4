//! REST API handlers

pub mod auth;
pub mod checks;
pub mod dashboard;
pub mod health;
pub mod payments;
pub mod shared;

pub use auth::*;
pub use checks::*;
pub use dashboard::*;
pub use health::*;
pub use payments::*;

//! Warden Types - Shared domain types
//!
//! This crate contains domain types used across warden crates and services:
//! - User identity and per-service trial flags
//! - Service types and the access decision vocabulary
//! - Subscriptions, terms and payment claims
//! - Check history records

pub mod access;
pub mod error;
pub mod history;
pub mod service;
pub mod subscription;
pub mod user;

pub use access::*;
pub use error::*;
pub use history::*;
pub use service::*;
pub use subscription::*;
pub use user::*;

//! Warden Core - Entitlement business logic
//!
//! Core functionality for the security-check suite:
//! - Entitlement engine (subscription / trial / denied decisions)
//! - Subscription lifecycle (creation from a payment claim, renewal)
//! - Auto-renewal sweeper for the daily scheduler
//! - Accounts, password hashing and signed session tokens
//! - Mock security-check responders
//!
//! # Example
//!
//! ```rust,ignore
//! use warden_core::{EntitlementConfig, WardenService};
//! use warden_db::Repositories;
//!
//! let config = EntitlementConfig::new(session_secret);
//! let warden = WardenService::from_repositories(repos, config)?;
//!
//! let decision = warden.engine().authorize(user_id, ServiceType::Geolocation, Utc::now()).await?;
//! ```

pub mod accounts;
pub mod checks;
pub mod config;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod password;
pub mod payment;
pub mod service;
pub mod session;
pub mod sweeper;
pub mod validation;

pub use accounts::{AccountService, Registration};
pub use config::{EntitlementConfig, Gate, GatingPolicy};
pub use engine::{evaluate_access, EntitlementEngine};
pub use error::{CoreError, CoreResult};
pub use lifecycle::{renew, NewSubscription, Renewal, RenewalBasis, SubscriptionLifecycle};
pub use payment::{PaymentClaim, PaymentVerifier, TrustedReferenceVerifier, VerifiedPayment};
pub use service::{CheckOutcome, Dashboard, SqliteWardenService, WardenService};
pub use session::{IssuedSession, SessionPayload, SessionSigner};
pub use sweeper::{RenewalOutcome, RenewalSweeper, SweepReport};

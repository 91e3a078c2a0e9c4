//! Payment trust boundary
//!
//! Subscriptions are created from a payment the customer *claims* to have
//! made: a wallet transfer identified only by the reference number they
//! typed in. Nothing here contacts a payment rail. [`TrustedReferenceVerifier`]
//! accepts the claim as entered and leaves reconciliation to a human; swap in
//! another [`PaymentVerifier`] to check references against a real gateway.

use async_trait::async_trait;
use warden_types::{PaymentMethod, ServiceType, UserId};

use crate::CoreError;

/// Customer-asserted payment, already validated for shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentClaim {
    pub user_id: UserId,
    pub service_type: ServiceType,
    pub method: PaymentMethod,
    pub reference: String,
    pub amount_cents: i64,
}

/// Payment accepted by a verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    pub method: PaymentMethod,
    /// Reference to persist on the subscription
    pub reference: String,
    pub amount_cents: i64,
    /// Whether the reference was confirmed against the payment rail
    pub confirmed: bool,
}

/// Payment verifier trait
///
/// Rejections are reported as [`CoreError::PaymentRejected`].
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Accept or reject a payment claim
    async fn verify(&self, claim: &PaymentClaim) -> Result<VerifiedPayment, CoreError>;
}

/// Accepts every claim as entered, unconfirmed
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustedReferenceVerifier;

#[async_trait]
impl PaymentVerifier for TrustedReferenceVerifier {
    async fn verify(&self, claim: &PaymentClaim) -> Result<VerifiedPayment, CoreError> {
        tracing::warn!(
            user_id = %claim.user_id,
            service = %claim.service_type,
            method = %claim.method,
            reference = %claim.reference,
            amount_cents = claim.amount_cents,
            "Accepting unverified payment reference"
        );

        Ok(VerifiedPayment {
            method: claim.method,
            reference: claim.reference.clone(),
            amount_cents: claim.amount_cents,
            confirmed: false,
        })
    }
}

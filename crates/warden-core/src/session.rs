//! Signed session tokens
//!
//! Token format: `base64url(json payload).base64url(hmac-sha256 signature)`.
//! Tokens are stateless; the signature and the embedded expiry are all that
//! is checked.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use warden_types::UserId;

use crate::{CoreError, CoreResult};

/// Shortest accepted signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Session token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// User ID
    pub user_id: i64,
    pub username: String,
    /// Random per-token id
    pub nonce: String,
    /// Issue timestamp (milliseconds)
    pub issued: i64,
    /// Expiration timestamp (milliseconds)
    pub expires: i64,
}

impl SessionPayload {
    /// Check if the session is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() > self.expires
    }

    /// Get the user ID
    pub fn user_id(&self) -> UserId {
        UserId(self.user_id)
    }
}

/// Freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub payload: SessionPayload,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies session tokens.
///
/// The MAC is keyed once and cloned for each token.
#[derive(Clone)]
pub struct SessionSigner {
    mac: Hmac<Sha256>,
    duration: Duration,
}

impl SessionSigner {
    /// Create a signer.
    ///
    /// # Errors
    /// Fails when the secret is shorter than 32 bytes.
    pub fn new(secret: impl AsRef<[u8]>, duration: Duration) -> CoreResult<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(CoreError::validation(format!(
                "session secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }
        let mac = Hmac::<Sha256>::new_from_slice(secret)
            .map_err(|_| CoreError::validation("session secret rejected"))?;
        Ok(Self { mac, duration })
    }

    fn keyed(&self, payload_b64: &str) -> Hmac<Sha256> {
        let mut mac = self.mac.clone();
        mac.update(payload_b64.as_bytes());
        mac
    }

    /// Session lifetime
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Issue a token for `user_id`
    pub fn issue(
        &self,
        user_id: UserId,
        username: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<IssuedSession> {
        let expires_at = now + self.duration;
        let payload = SessionPayload {
            user_id: user_id.0,
            username: username.to_string(),
            nonce: uuid::Uuid::new_v4().to_string(),
            issued: now.timestamp_millis(),
            expires: expires_at.timestamp_millis(),
        };

        let json = serde_json::to_vec(&payload).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialize session payload");
            CoreError::Internal("failed to create session".to_string())
        })?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(&json);
        let signature = self.keyed(&payload_b64).finalize().into_bytes();
        let signature = URL_SAFE_NO_PAD.encode(signature);

        Ok(IssuedSession {
            token: format!("{payload_b64}.{signature}"),
            payload,
            expires_at,
        })
    }

    /// Verify a token's signature and expiry
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> CoreResult<SessionPayload> {
        let (payload_b64, signature_b64) =
            token.rsplit_once('.').ok_or(CoreError::InvalidToken)?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| CoreError::InvalidToken)?;
        // verify_slice compares in constant time
        if self.keyed(payload_b64).verify_slice(&signature).is_err() {
            tracing::debug!("Session signature mismatch");
            return Err(CoreError::InvalidToken);
        }

        let json = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CoreError::InvalidToken)?;
        let payload: SessionPayload =
            serde_json::from_slice(&json).map_err(|_| CoreError::InvalidToken)?;

        if payload.is_expired_at(now) {
            return Err(CoreError::TokenExpired);
        }
        Ok(payload)
    }
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner")
            .field("duration_hours", &self.duration.num_hours())
            .finish_non_exhaustive()
    }
}

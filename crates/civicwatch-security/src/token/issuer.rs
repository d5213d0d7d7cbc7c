//! Capability token creation with purpose-bound signing and TTL.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Header, encode};
use serde::Serialize;
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::types::Clock;

use super::claims::{CapabilityClaims, TokenPurpose};
use super::keys::PurposeKeyring;

/// Creates signed capability tokens.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    /// Per-purpose HMAC keys.
    keyring: Arc<PurposeKeyring>,
    /// Clock used to stamp `iat`/`exp`.
    clock: Arc<dyn Clock>,
}

/// Result of a successful token issuance.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IssuedToken {
    /// The signed token string.
    pub token: String,
    /// Session ID embedded in the token (`sid` claim).
    pub session_id: Uuid,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl TokenIssuer {
    /// Creates a new issuer over the shared keyring and clock.
    pub fn new(keyring: Arc<PurposeKeyring>, clock: Arc<dyn Clock>) -> Self {
        Self { keyring, clock }
    }

    /// Issues a token for the given purpose, subject, and payload.
    ///
    /// `iat` and `exp` come from the injected clock; the `sid` claim is a
    /// fresh UUID per issuance, so reissuing for the same subject produces
    /// a distinguishable token.
    pub fn issue<P: Serialize>(
        &self,
        purpose: TokenPurpose,
        subject: impl Into<String>,
        payload: P,
        ttl_seconds: u64,
    ) -> Result<IssuedToken, AppError> {
        let now = self.clock.now();
        let expires_at = now + chrono::Duration::seconds(ttl_seconds as i64);
        let session_id = Uuid::new_v4();

        let claims = CapabilityClaims {
            sub: subject.into(),
            sid: session_id,
            purpose,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            payload,
        };

        let token = encode(
            &Header::default(),
            &claims,
            self.keyring.encoding_key(purpose),
        )
        .map_err(|e| AppError::internal(format!("Failed to encode {purpose} token: {e}")))?;

        Ok(IssuedToken {
            token,
            session_id,
            expires_at,
        })
    }
}

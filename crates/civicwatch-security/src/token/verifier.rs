//! Capability token validation.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation, decode};
use serde::de::DeserializeOwned;

use civicwatch_core::error::AppError;
use civicwatch_core::types::Clock;

use super::claims::{CapabilityClaims, TokenPurpose};
use super::keys::PurposeKeyring;

/// Validates capability tokens against a purpose.
///
/// Rejections are distinguishable by error kind so callers can tell a
/// stale-but-authentic token (`ExpiredToken`) from a forged or
/// wrong-purpose one (`InvalidSignature`) and from garbage input
/// (`MalformedToken`).
#[derive(Clone)]
pub struct TokenVerifier {
    /// Per-purpose HMAC keys.
    keyring: Arc<PurposeKeyring>,
    /// Clock used for the expiry check.
    clock: Arc<dyn Clock>,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenVerifier {
    /// Creates a new verifier over the shared keyring and clock.
    pub fn new(keyring: Arc<PurposeKeyring>, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is enforced below against the injected clock, not the
        // library's wall clock.
        validation.validate_exp = false;

        Self {
            keyring,
            clock,
            validation,
        }
    }

    /// Decodes and validates a token string under the given purpose.
    ///
    /// Checks, in order:
    /// 1. Signature validity (purpose-bound key, constant-time MAC compare)
    /// 2. Purpose claim matches
    /// 3. Expiration against the injected clock
    /// 4. Payload deserializes to `P`
    pub fn verify<P: DeserializeOwned>(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<CapabilityClaims<P>, AppError> {
        let token_data = decode::<CapabilityClaims<serde_json::Value>>(
            token,
            self.keyring.decoding_key(purpose),
            &self.validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                AppError::invalid_signature("Token signature mismatch")
            }
            jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                AppError::invalid_signature("Token signed with an unexpected algorithm")
            }
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::expired_token("Token has expired")
            }
            jsonwebtoken::errors::ErrorKind::InvalidToken
            | jsonwebtoken::errors::ErrorKind::Base64(_)
            | jsonwebtoken::errors::ErrorKind::Json(_)
            | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                AppError::malformed_token("Token could not be parsed")
            }
            _ => AppError::malformed_token(format!("Token validation failed: {e}")),
        })?;

        let claims = token_data.claims;

        if claims.purpose != purpose {
            return Err(AppError::invalid_signature(
                "Token presented for the wrong purpose",
            ));
        }

        if self.clock.now_ts() > claims.exp {
            return Err(AppError::expired_token("Token has expired"));
        }

        let payload: P = serde_json::from_value(claims.payload)
            .map_err(|_| AppError::malformed_token("Token payload has an unexpected shape"))?;

        Ok(CapabilityClaims {
            sub: claims.sub,
            sid: claims.sid,
            purpose: claims.purpose,
            iat: claims.iat,
            exp: claims.exp,
            payload,
        })
    }
}

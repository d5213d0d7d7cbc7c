//! Per-purpose signing keys.

use jsonwebtoken::{DecodingKey, EncodingKey};
use tracing::warn;

use civicwatch_core::config::security::SecurityConfig;

use super::claims::TokenPurpose;

/// Holds one HMAC key pair per token purpose.
///
/// MFA challenge tokens and file access tokens are signed with distinct
/// secrets, so presenting a token under the wrong purpose fails the
/// signature check. The verifier additionally cross-checks the purpose
/// claim, which catches deployments where both secrets were set to the
/// same value.
pub struct PurposeKeyring {
    mfa_encoding: EncodingKey,
    mfa_decoding: DecodingKey,
    file_encoding: EncodingKey,
    file_decoding: DecodingKey,
}

impl std::fmt::Debug for PurposeKeyring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PurposeKeyring").finish_non_exhaustive()
    }
}

impl PurposeKeyring {
    /// Build the keyring from security configuration.
    pub fn from_config(config: &SecurityConfig) -> Self {
        if config.mfa_token_secret == config.file_token_secret {
            warn!(
                "mfa_token_secret and file_token_secret are identical; \
                 purpose isolation relies on the purpose claim only"
            );
        }

        Self {
            mfa_encoding: EncodingKey::from_secret(config.mfa_token_secret.as_bytes()),
            mfa_decoding: DecodingKey::from_secret(config.mfa_token_secret.as_bytes()),
            file_encoding: EncodingKey::from_secret(config.file_token_secret.as_bytes()),
            file_decoding: DecodingKey::from_secret(config.file_token_secret.as_bytes()),
        }
    }

    /// Return the signing key for a purpose.
    pub(crate) fn encoding_key(&self, purpose: TokenPurpose) -> &EncodingKey {
        match purpose {
            TokenPurpose::Mfa => &self.mfa_encoding,
            TokenPurpose::FileAccess => &self.file_encoding,
        }
    }

    /// Return the verification key for a purpose.
    pub(crate) fn decoding_key(&self, purpose: TokenPurpose) -> &DecodingKey {
        match purpose {
            TokenPurpose::Mfa => &self.mfa_decoding,
            TokenPurpose::FileAccess => &self.file_decoding,
        }
    }
}

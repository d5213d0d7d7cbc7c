//! Field-encryption key resolution.

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::{KeyInit, OsRng};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::warn;

use civicwatch_core::config::security::SecurityConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;

/// A resolved 256-bit field-encryption key.
///
/// Configured as hex (64 chars) or standard base64 (44 chars); either
/// encoding must decode to exactly 32 bytes. When no key is configured a
/// random ephemeral key is generated, which keeps the process usable but
/// makes previously stored ciphertexts unreadable after restart.
#[derive(Clone)]
pub struct FieldKey([u8; 32]);

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldKey").finish_non_exhaustive()
    }
}

impl FieldKey {
    /// Resolve the key from security configuration.
    pub fn resolve(config: &SecurityConfig) -> AppResult<Self> {
        match config.field_key.as_deref().map(str::trim) {
            Some(encoded) if !encoded.is_empty() => Self::parse(encoded),
            _ => {
                warn!(
                    "No field encryption key configured; using an ephemeral key. \
                     Fields encrypted now will be unreadable after restart"
                );
                Ok(Self::ephemeral())
            }
        }
    }

    /// Parse an encoded key, accepting hex first, then base64.
    pub fn parse(encoded: &str) -> AppResult<Self> {
        if let Ok(bytes) = hex::decode(encoded) {
            return Self::from_bytes(&bytes);
        }
        if let Ok(bytes) = STANDARD.decode(encoded) {
            return Self::from_bytes(&bytes);
        }
        Err(AppError::configuration(
            "Field encryption key is neither valid hex nor valid base64",
        ))
    }

    /// Build a key from raw bytes, enforcing the AES-256 key length.
    pub fn from_bytes(bytes: &[u8]) -> AppResult<Self> {
        if bytes.len() != 32 {
            return Err(AppError::configuration(format!(
                "Field encryption key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Generate a random ephemeral key.
    pub fn ephemeral() -> Self {
        let generated = Aes256Gcm::generate_key(OsRng);
        let mut key = [0u8; 32];
        key.copy_from_slice(&generated);
        Self(key)
    }

    /// Return the raw key bytes.
    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Return the key hex-encoded, for operator tooling.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Return the key base64-encoded, for operator tooling.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

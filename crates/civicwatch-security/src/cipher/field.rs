//! AES-256-GCM encryption for sensitive report fields.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use tracing::warn;

use civicwatch_core::config::security::SecurityConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;

use super::envelope::{Envelope, TAG_LEN};
use super::key::FieldKey;

/// Encrypts and decrypts individual string fields at rest.
///
/// Each call uses a fresh random nonce, so encrypting the same value twice
/// yields different envelopes. Decryption is tolerant by default: legacy
/// plaintext (no envelope separator) passes through unchanged, and failed
/// decryption returns the stored value as-is so a bad key never blanks out
/// a report. Setting `strict_decrypt` turns failures into errors instead.
pub struct FieldCipher {
    cipher: Aes256Gcm,
    strict: bool,
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher")
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl FieldCipher {
    /// Create a cipher over a resolved key.
    pub fn new(key: &FieldKey, strict: bool) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.as_bytes().into()),
            strict,
        }
    }

    /// Resolve the key from configuration and build the cipher.
    pub fn from_config(config: &SecurityConfig) -> AppResult<Self> {
        let key = FieldKey::resolve(config)?;
        Ok(Self::new(&key, config.strict_decrypt))
    }

    /// Encrypt one field value into its stored envelope form.
    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| AppError::internal("Field encryption failed"))?;

        // The AEAD output is ciphertext with the tag appended.
        let split_at = sealed.len() - TAG_LEN;
        let envelope = Envelope {
            iv: nonce.into(),
            ciphertext: sealed[..split_at].to_vec(),
            tag: sealed[split_at..].to_vec(),
        };
        Ok(envelope.encode())
    }

    /// Decrypt one stored value back to its field form.
    ///
    /// Values without the envelope separator are returned unchanged.
    /// Malformed envelopes and authentication failures follow the
    /// configured policy: tolerant mode logs and returns the stored value,
    /// strict mode returns a `DecryptionFailed` error.
    pub fn decrypt(&self, stored: &str) -> AppResult<String> {
        if !Envelope::looks_encrypted(stored) {
            return Ok(stored.to_string());
        }

        match self.open(stored) {
            Ok(plaintext) => Ok(plaintext),
            Err(err) if self.strict => Err(err),
            Err(err) => {
                warn!(error = %err, "Field decryption failed; returning stored value");
                Ok(stored.to_string())
            }
        }
    }

    /// Encrypt an optional field, passing `None` through.
    pub fn encrypt_opt(&self, value: Option<&str>) -> AppResult<Option<String>> {
        value.map(|v| self.encrypt(v)).transpose()
    }

    /// Decrypt an optional field, passing `None` through.
    pub fn decrypt_opt(&self, value: Option<&str>) -> AppResult<Option<String>> {
        value.map(|v| self.decrypt(v)).transpose()
    }

    fn open(&self, stored: &str) -> AppResult<String> {
        let envelope = Envelope::parse(stored)?;

        let mut sealed = envelope.ciphertext;
        sealed.extend_from_slice(&envelope.tag);

        let nonce = Nonce::from(envelope.iv);
        let plaintext = self
            .cipher
            .decrypt(&nonce, sealed.as_slice())
            .map_err(|_| AppError::decryption_failed("Field failed authentication"))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::decryption_failed("Decrypted field is not valid UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicwatch_core::error::ErrorKind;

    fn cipher() -> FieldCipher {
        FieldCipher::new(&FieldKey::from_bytes(&[42u8; 32]).unwrap(), false)
    }

    fn strict_cipher() -> FieldCipher {
        FieldCipher::new(&FieldKey::from_bytes(&[42u8; 32]).unwrap(), true)
    }

    #[test]
    fn test_round_trip() {
        let cipher = cipher();
        let stored = cipher.encrypt("1600 Main St, apartment 4").unwrap();
        assert_ne!(stored, "1600 Main St, apartment 4");
        assert_eq!(stored.matches(':').count(), 2);
        assert_eq!(cipher.decrypt(&stored).unwrap(), "1600 Main St, apartment 4");
    }

    #[test]
    fn test_fresh_nonce_per_call() {
        let cipher = cipher();
        let a = cipher.encrypt("same input").unwrap();
        let b = cipher.encrypt("same input").unwrap();
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a).unwrap(), cipher.decrypt(&b).unwrap());
    }

    #[test]
    fn test_empty_string_round_trip() {
        let cipher = cipher();
        let stored = cipher.encrypt("").unwrap();
        assert_eq!(cipher.decrypt(&stored).unwrap(), "");
    }

    #[test]
    fn test_unicode_round_trip() {
        let cipher = cipher();
        let stored = cipher.encrypt("報告: 事件 #42 🚨").unwrap();
        assert_eq!(cipher.decrypt(&stored).unwrap(), "報告: 事件 #42 🚨");
    }

    #[test]
    fn test_legacy_plaintext_passthrough() {
        let cipher = cipher();
        assert_eq!(
            cipher.decrypt("never encrypted").unwrap(),
            "never encrypted"
        );
    }

    #[test]
    fn test_tampered_ciphertext_tolerant_mode() {
        let cipher = cipher();
        let stored = cipher.encrypt("secret witness statement").unwrap();
        let tampered = tamper_segment(&stored, 1);
        // Tolerant mode hands back the stored value untouched.
        assert_eq!(cipher.decrypt(&tampered).unwrap(), tampered);
    }

    #[test]
    fn test_tampered_ciphertext_strict_mode() {
        let tolerant = cipher();
        let strict = strict_cipher();
        let stored = tolerant.encrypt("secret witness statement").unwrap();
        let tampered = tamper_segment(&stored, 1);
        let err = strict.decrypt(&tampered).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DecryptionFailed);
    }

    #[test]
    fn test_tampered_tag_follows_policy() {
        let tolerant = cipher();
        let strict = strict_cipher();
        let stored = tolerant.encrypt("secret witness statement").unwrap();
        let tampered = tamper_segment(&stored, 2);
        assert_eq!(tolerant.decrypt(&tampered).unwrap(), tampered);
        assert_eq!(
            strict.decrypt(&tampered).unwrap_err().kind,
            ErrorKind::DecryptionFailed
        );
    }

    #[test]
    fn test_wrong_key_follows_policy() {
        let cipher_a = cipher();
        let cipher_b = FieldCipher::new(&FieldKey::from_bytes(&[7u8; 32]).unwrap(), false);
        let strict_b = FieldCipher::new(&FieldKey::from_bytes(&[7u8; 32]).unwrap(), true);

        let stored = cipher_a.encrypt("cross-key value").unwrap();
        assert_eq!(cipher_b.decrypt(&stored).unwrap(), stored);
        assert_eq!(
            strict_b.decrypt(&stored).unwrap_err().kind,
            ErrorKind::DecryptionFailed
        );
    }

    #[test]
    fn test_malformed_envelope_follows_policy() {
        let tolerant = cipher();
        let strict = strict_cipher();
        let malformed = "not-base64!:@@:??";
        assert_eq!(tolerant.decrypt(malformed).unwrap(), malformed);
        assert_eq!(
            strict.decrypt(malformed).unwrap_err().kind,
            ErrorKind::DecryptionFailed
        );
    }

    #[test]
    fn test_optional_variants_pass_none_through() {
        let cipher = cipher();
        assert_eq!(cipher.encrypt_opt(None).unwrap(), None);
        assert_eq!(cipher.decrypt_opt(None).unwrap(), None);
        let stored = cipher.encrypt_opt(Some("present")).unwrap().unwrap();
        assert_eq!(
            cipher.decrypt_opt(Some(&stored)).unwrap(),
            Some("present".to_string())
        );
    }

    fn tamper_segment(stored: &str, index: usize) -> String {
        let mut parts: Vec<String> = stored.split(':').map(str::to_string).collect();
        let mut chars: Vec<char> = parts[index].chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        parts[index] = chars.into_iter().collect();
        parts.join(":")
    }
}

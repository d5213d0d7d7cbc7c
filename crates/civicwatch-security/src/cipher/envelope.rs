//! The stored-ciphertext envelope format.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;

/// AES-GCM nonce length in bytes.
pub(crate) const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub(crate) const TAG_LEN: usize = 16;

/// A parsed ciphertext envelope.
///
/// Stored form is `base64(iv):base64(ciphertext):base64(tag)`. The colon
/// never appears in base64 output, so its presence is what distinguishes
/// an envelope from legacy plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Envelope {
    pub iv: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

impl Envelope {
    /// Whether a stored value carries the envelope separator at all.
    pub fn looks_encrypted(value: &str) -> bool {
        value.contains(':')
    }

    /// Render the envelope into its stored form.
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}",
            STANDARD.encode(self.iv),
            STANDARD.encode(&self.ciphertext),
            STANDARD.encode(&self.tag)
        )
    }

    /// Parse a stored value into an envelope.
    pub fn parse(value: &str) -> AppResult<Self> {
        let mut segments = value.split(':');
        let (Some(iv), Some(ciphertext), Some(tag), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AppError::decryption_failed(
                "Encrypted value must have exactly three segments",
            ));
        };

        let iv = STANDARD
            .decode(iv)
            .map_err(|_| AppError::decryption_failed("Envelope IV is not valid base64"))?;
        let ciphertext = STANDARD
            .decode(ciphertext)
            .map_err(|_| AppError::decryption_failed("Envelope ciphertext is not valid base64"))?;
        let tag = STANDARD
            .decode(tag)
            .map_err(|_| AppError::decryption_failed("Envelope tag is not valid base64"))?;

        let iv: [u8; NONCE_LEN] = iv.try_into().map_err(|iv: Vec<u8>| {
            AppError::decryption_failed(format!(
                "Envelope IV must be {NONCE_LEN} bytes, got {}",
                iv.len()
            ))
        })?;
        if tag.len() != TAG_LEN {
            return Err(AppError::decryption_failed(format!(
                "Envelope tag must be {TAG_LEN} bytes, got {}",
                tag.len()
            )));
        }

        Ok(Self {
            iv,
            ciphertext,
            tag,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_parse_round_trip() {
        let envelope = Envelope {
            iv: [1u8; NONCE_LEN],
            ciphertext: vec![2, 3, 4],
            tag: vec![5u8; TAG_LEN],
        };
        let stored = envelope.encode();
        assert_eq!(stored.matches(':').count(), 2);
        assert_eq!(Envelope::parse(&stored).unwrap(), envelope);
    }

    #[test]
    fn test_empty_ciphertext_is_representable() {
        let envelope = Envelope {
            iv: [0u8; NONCE_LEN],
            ciphertext: Vec::new(),
            tag: vec![9u8; TAG_LEN],
        };
        let parsed = Envelope::parse(&envelope.encode()).unwrap();
        assert!(parsed.ciphertext.is_empty());
    }

    #[test]
    fn test_segment_count_enforced() {
        assert!(Envelope::parse("onlyone:two").is_err());
        assert!(Envelope::parse("a:b:c:d").is_err());
    }

    #[test]
    fn test_bad_lengths_rejected() {
        let short_iv = format!(
            "{}:{}:{}",
            STANDARD.encode([1u8; 8]),
            STANDARD.encode([2u8; 4]),
            STANDARD.encode([3u8; TAG_LEN]),
        );
        assert!(Envelope::parse(&short_iv).is_err());

        let short_tag = format!(
            "{}:{}:{}",
            STANDARD.encode([1u8; NONCE_LEN]),
            STANDARD.encode([2u8; 4]),
            STANDARD.encode([3u8; 4]),
        );
        assert!(Envelope::parse(&short_tag).is_err());
    }

    #[test]
    fn test_plaintext_detection() {
        assert!(!Envelope::looks_encrypted("just a plain sentence"));
        assert!(Envelope::looks_encrypted("abc:def:ghi"));
    }
}

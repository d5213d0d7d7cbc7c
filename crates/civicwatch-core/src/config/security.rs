//! Security configuration.

use serde::{Deserialize, Serialize};

/// Token, challenge, and field-encryption configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// AES-256 key for field encryption, hex or base64 encoded (32 bytes
    /// decoded). When absent an ephemeral key is generated at startup.
    #[serde(default)]
    pub field_key: Option<String>,
    /// Whether decryption failures surface as errors instead of returning
    /// the stored value unchanged.
    #[serde(default)]
    pub strict_decrypt: bool,
    /// Secret key for signing MFA challenge tokens (HMAC-SHA256).
    #[serde(default = "default_mfa_token_secret")]
    pub mfa_token_secret: String,
    /// Secret key for signing file access tokens (HMAC-SHA256).
    #[serde(default = "default_file_token_secret")]
    pub file_token_secret: String,
    /// MFA challenge token TTL in seconds.
    #[serde(default = "default_mfa_code_ttl")]
    pub mfa_code_ttl_seconds: u64,
    /// Minimum interval between verification code sends per account, in
    /// seconds.
    #[serde(default = "default_resend_cooldown")]
    pub mfa_resend_cooldown_seconds: u64,
    /// File access grant TTL in seconds.
    #[serde(default = "default_file_grant_ttl")]
    pub file_grant_ttl_seconds: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            field_key: None,
            strict_decrypt: false,
            mfa_token_secret: default_mfa_token_secret(),
            file_token_secret: default_file_token_secret(),
            mfa_code_ttl_seconds: default_mfa_code_ttl(),
            mfa_resend_cooldown_seconds: default_resend_cooldown(),
            file_grant_ttl_seconds: default_file_grant_ttl(),
        }
    }
}

fn default_mfa_token_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION_MFA".to_string()
}

fn default_file_token_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION_FILE".to_string()
}

fn default_mfa_code_ttl() -> u64 {
    300
}

fn default_resend_cooldown() -> u64 {
    60
}

fn default_file_grant_ttl() -> u64 {
    600
}

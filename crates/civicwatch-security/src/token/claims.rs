//! Capability token claims structure and purposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a capability token authorizes.
///
/// Each purpose is signed with its own secret, so a token minted for one
/// purpose can never verify under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Completing a login step with a one-time verification code.
    Mfa,
    /// Downloading a single protected file.
    FileAccess,
}

impl TokenPurpose {
    /// Return the lowercase purpose name used in logs and audit records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mfa => "mfa",
            Self::FileAccess => "file_access",
        }
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims payload embedded in every capability token.
///
/// `P` is the purpose-specific payload: the hashed verification code for
/// MFA challenges, the resource grant for file access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityClaims<P> {
    /// Subject the capability was granted for.
    pub sub: String,
    /// Challenge/grant session ID. Every issuance gets a fresh one.
    pub sid: Uuid,
    /// The purpose this token is valid for.
    pub purpose: TokenPurpose,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Purpose-specific payload.
    pub payload: P,
}

impl<P> CapabilityClaims<P> {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purpose_serializes_snake_case() {
        let json = serde_json::to_string(&TokenPurpose::FileAccess).unwrap();
        assert_eq!(json, "\"file_access\"");
        let json = serde_json::to_string(&TokenPurpose::Mfa).unwrap();
        assert_eq!(json, "\"mfa\"");
    }
}

//! Unified application error types for CivicWatch.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Messages are written for end users:
//! they never echo codes, key material, or raw token contents.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The token's signature verified but its expiry has passed.
    ExpiredToken,
    /// The token's signature did not verify, or it was presented under the
    /// wrong purpose.
    InvalidSignature,
    /// The token could not be parsed at all.
    MalformedToken,
    /// The submitted verification code did not match the challenge.
    InvalidCode,
    /// A resend cooldown is still in effect for the subject.
    ThrottledRequest,
    /// The outbound notification transport is missing settings or failed to
    /// deliver.
    TransportUnavailable,
    /// A configuration error occurred (bad key length, unparseable settings).
    Configuration,
    /// An encrypted field failed authentication or could not be decoded.
    DecryptionFailed,
    /// Input validation failed.
    Validation,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpiredToken => write!(f, "EXPIRED_TOKEN"),
            Self::InvalidSignature => write!(f, "INVALID_SIGNATURE"),
            Self::MalformedToken => write!(f, "MALFORMED_TOKEN"),
            Self::InvalidCode => write!(f, "INVALID_CODE"),
            Self::ThrottledRequest => write!(f, "THROTTLED_REQUEST"),
            Self::TransportUnavailable => write!(f, "TRANSPORT_UNAVAILABLE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::DecryptionFailed => write!(f, "DECRYPTION_FAILED"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout CivicWatch.
///
/// Crate-specific errors are mapped into `AppError` using `From` impls or
/// explicit `.map_err()` calls. Callers branch on [`AppError::kind`] to give
/// different user-facing responses (e.g. "code expired" vs "invalid request").
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable, non-leaking error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an expired-token error.
    pub fn expired_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpiredToken, message)
    }

    /// Create an invalid-signature error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSignature, message)
    }

    /// Create a malformed-token error.
    pub fn malformed_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedToken, message)
    }

    /// Create an invalid-code error.
    pub fn invalid_code(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCode, message)
    }

    /// Create a throttled-request error.
    pub fn throttled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ThrottledRequest, message)
    }

    /// Create a transport-unavailable error.
    pub fn transport_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportUnavailable, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a decryption-failed error.
    pub fn decryption_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecryptionFailed, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

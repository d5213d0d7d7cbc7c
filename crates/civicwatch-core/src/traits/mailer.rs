//! Mail transport trait for pluggable outbound delivery backends.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// An outbound mail message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
    /// Optional HTML body.
    pub html: Option<String>,
}

impl MailMessage {
    /// Create a plain-text message.
    pub fn text(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
            html: None,
        }
    }
}

/// Trait for outbound mail delivery backends.
///
/// The [`MailTransport`] trait is defined here in `civicwatch-core` and
/// implemented in `civicwatch-mailer`. Callers check configuration before
/// composing a message so that missing settings are reported up front
/// rather than surfacing as a delivery failure.
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Check that enough settings are present to attempt delivery.
    ///
    /// Returns a `TransportUnavailable` error when the transport cannot
    /// possibly deliver (missing endpoint or credentials). This performs
    /// no network traffic.
    fn ensure_configured(&self) -> AppResult<()>;

    /// Deliver a single message.
    ///
    /// Network and provider failures surface as `TransportUnavailable`.
    /// The transport does not retry.
    async fn send(&self, message: &MailMessage) -> AppResult<()>;
}

//! Mailer configuration.

use serde::{Deserialize, Serialize};

/// Outbound mail delivery configuration.
///
/// Delivery goes through an HTTP mail API. Both `api_url` and `api_key`
/// must be set for the transport to consider itself configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Base URL of the HTTP mail API endpoint.
    #[serde(default)]
    pub api_url: String,
    /// API key for the mail provider.
    #[serde(default)]
    pub api_key: String,
    /// Sender address for outbound mail.
    #[serde(default = "default_sender")]
    pub sender: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            sender: default_sender(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl MailerConfig {
    /// Whether enough settings are present to attempt delivery.
    pub fn is_configured(&self) -> bool {
        !self.api_url.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

fn default_sender() -> String {
    "no-reply@civicwatch.example".to_string()
}

fn default_timeout() -> u64 {
    10
}

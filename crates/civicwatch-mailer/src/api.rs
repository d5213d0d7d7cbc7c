//! HTTP mail API transport.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use civicwatch_core::config::mailer::MailerConfig;
use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_core::traits::{MailMessage, MailTransport};

/// Request body accepted by the mail provider.
#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

/// Delivers mail through an HTTP mail API.
///
/// One JSON POST per message with bearer authentication. The request
/// timeout comes from configuration and is owned by the underlying
/// client, so a hung provider cannot stall a caller indefinitely.
pub struct ApiMailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl std::fmt::Debug for ApiMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiMailer")
            .field("api_url", &self.config.api_url)
            .field("sender", &self.config.sender)
            .field("timeout_seconds", &self.config.timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl ApiMailer {
    /// Creates a transport from mailer configuration.
    pub fn new(config: MailerConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::configuration(format!("Failed to build mail HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl MailTransport for ApiMailer {
    fn ensure_configured(&self) -> AppResult<()> {
        if !self.config.is_configured() {
            return Err(AppError::transport_unavailable(
                "Mail delivery is not configured",
            ));
        }
        Ok(())
    }

    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        self.ensure_configured()?;

        let request = ApiRequest {
            from: &self.config.sender,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            html: message.html.as_deref(),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Mail API request failed");
                AppError::transport_unavailable("Mail provider is unreachable")
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "Mail API rejected the message");
            return Err(AppError::transport_unavailable(
                "Mail provider rejected the message",
            ));
        }

        debug!(to = %message.to, subject = %message.subject, "Mail dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicwatch_core::error::ErrorKind;

    #[tokio::test]
    async fn test_unconfigured_send_fails_without_network() {
        let mailer = ApiMailer::new(MailerConfig::default()).unwrap();
        assert!(mailer.ensure_configured().is_err());

        let message = MailMessage::text("a@example.com", "subject", "body");
        let err = mailer.send(&message).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TransportUnavailable);
    }

    #[test]
    fn test_configured_passes_preflight() {
        let config = MailerConfig {
            api_url: "https://mail.example/v1/send".to_string(),
            api_key: "key-123".to_string(),
            ..MailerConfig::default()
        };
        let mailer = ApiMailer::new(config).unwrap();
        assert!(mailer.ensure_configured().is_ok());
    }

    #[test]
    fn test_debug_does_not_leak_api_key() {
        let config = MailerConfig {
            api_url: "https://mail.example/v1/send".to_string(),
            api_key: "super-secret-key".to_string(),
            ..MailerConfig::default()
        };
        let mailer = ApiMailer::new(config).unwrap();
        assert!(!format!("{mailer:?}").contains("super-secret-key"));
    }
}

//! Recording transport for tests and local development.

use std::sync::Mutex;

use async_trait::async_trait;

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_core::traits::{MailMessage, MailTransport};

/// A transport that records messages instead of delivering them.
///
/// Failure behavior is scriptable: the stub can report itself as
/// unconfigured, or accept configuration but fail every send, which
/// covers both halves of the delivery error path.
#[derive(Debug)]
pub struct StubMailer {
    sent: Mutex<Vec<MailMessage>>,
    configured: bool,
    fail_with: Mutex<Option<String>>,
}

impl StubMailer {
    /// A configured stub that accepts everything.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            configured: true,
            fail_with: Mutex::new(None),
        }
    }

    /// A stub that fails the configuration pre-flight.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new()
        }
    }

    /// A configured stub whose sends fail with the given reason.
    pub fn failing(reason: impl Into<String>) -> Self {
        let stub = Self::new();
        stub.set_failure(Some(&reason.into()));
        stub
    }

    /// Script (or clear) the send failure.
    pub fn set_failure(&self, reason: Option<&str>) {
        *self.fail_with.lock().unwrap_or_else(|e| e.into_inner()) =
            reason.map(str::to_string);
    }

    /// Snapshot of every message accepted so far.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for StubMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MailTransport for StubMailer {
    fn ensure_configured(&self) -> AppResult<()> {
        if !self.configured {
            return Err(AppError::transport_unavailable(
                "Mail delivery is not configured",
            ));
        }
        Ok(())
    }

    async fn send(&self, message: &MailMessage) -> AppResult<()> {
        self.ensure_configured()?;

        if let Some(reason) = self
            .fail_with
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(AppError::transport_unavailable(reason));
        }

        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.clone());
        Ok(())
    }
}

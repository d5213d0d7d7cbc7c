//! Audit sink trait for recording security-relevant actions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A single security-relevant action to be recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Action name (e.g., `"mfa.challenge_issued"`, `"file.grant_issued"`).
    pub action: String,
    /// Acting account, when known.
    pub actor_id: Option<i64>,
    /// Kind of entity the action applies to (e.g., `"account"`, `"file"`).
    pub target_type: String,
    /// Identifier of the target entity, when applicable.
    pub target_id: Option<String>,
    /// Additional structured context.
    pub metadata: Option<serde_json::Value>,
}

impl AuditEvent {
    /// Create a new audit event.
    pub fn new(action: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            actor_id: None,
            target_type: target_type.into(),
            target_id: None,
            metadata: None,
        }
    }

    /// Set the acting account.
    pub fn actor(mut self, actor_id: i64) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Set the target identifier.
    pub fn target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    /// Attach structured metadata.
    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Trait for audit log backends.
///
/// Callers treat audit recording as fire-and-forget: a failed `record`
/// call is logged and never fails the operation being audited.
#[async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug + 'static {
    /// Record one audit event.
    async fn record(&self, event: AuditEvent) -> AppResult<()>;
}

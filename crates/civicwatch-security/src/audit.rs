//! Audit sink implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{info, warn};

use civicwatch_core::result::AppResult;
use civicwatch_core::traits::{AuditEvent, AuditSink};

/// Records audit events as structured log lines.
///
/// The in-process default: every event becomes one `info` line with the
/// action, actor, and target as fields, so the audit trail rides the
/// same pipeline as the rest of the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates a new tracing-backed sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            action = %event.action,
            actor_id = ?event.actor_id,
            target_type = %event.target_type,
            target_id = ?event.target_id,
            metadata = ?event.metadata,
            "audit"
        );
        Ok(())
    }
}

/// Buffers audit events in memory.
///
/// Useful for inspection in tests and for single-process deployments
/// that flush the buffer elsewhere.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> AppResult<()> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
        Ok(())
    }
}

/// Record an event without letting a sink failure reach the caller.
///
/// Audit recording is fire-and-forget everywhere: the primary operation
/// has already succeeded by the time this runs, so a failing sink is
/// logged and swallowed.
pub async fn record_best_effort(sink: &dyn AuditSink, event: AuditEvent) {
    let action = event.action.clone();
    if let Err(e) = sink.record(event).await {
        warn!(action = %action, error = %e, "Failed to record audit event");
    }
}

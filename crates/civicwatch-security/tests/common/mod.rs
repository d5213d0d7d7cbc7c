//! Shared test helpers for security integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use civicwatch_core::config::AppConfig;
use civicwatch_core::types::ManualClock;
use civicwatch_mailer::StubMailer;
use civicwatch_security::{MemoryAuditSink, SecurityCore};

/// A fixed starting instant so expiry arithmetic is stable.
pub const START_TS: i64 = 1_700_000_000;

/// The wired security stack over scriptable collaborators.
pub struct TestStack {
    pub core: SecurityCore,
    pub clock: Arc<ManualClock>,
    pub mailer: Arc<StubMailer>,
    pub audit: Arc<MemoryAuditSink>,
}

impl TestStack {
    /// Stack with a working mail transport.
    pub fn new() -> Self {
        Self::with_mailer(StubMailer::new())
    }

    /// Stack over a scripted mail transport.
    pub fn with_mailer(mailer: StubMailer) -> Self {
        let mut config = AppConfig::default();
        config.security.field_key = Some("11".repeat(32));
        config.security.mfa_token_secret = "mfa-secret-for-tests".to_string();
        config.security.file_token_secret = "file-secret-for-tests".to_string();

        let clock = Arc::new(ManualClock::new(START_TS));
        let mailer = Arc::new(mailer);
        let audit = Arc::new(MemoryAuditSink::new());

        let core = SecurityCore::new(
            &config,
            mailer.clone() as _,
            audit.clone() as _,
            clock.clone() as _,
        )
        .expect("security core should build from test config");

        Self {
            core,
            clock,
            mailer,
            audit,
        }
    }

    /// Extract the six-digit code from the most recently sent message.
    pub fn last_sent_code(&self) -> String {
        let sent = self.mailer.sent();
        let body = &sent.last().expect("expected at least one sent message").text;
        body.split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .expect("mail body should contain a six-digit code")
            .to_string()
    }
}

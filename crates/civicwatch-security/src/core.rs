//! The wired security facade.

use std::sync::Arc;

use civicwatch_core::config::AppConfig;
use civicwatch_core::result::AppResult;
use civicwatch_core::traits::{AuditSink, MailTransport};
use civicwatch_core::types::{AccountProfile, Clock, SystemClock};

use crate::audit::TracingAuditSink;
use crate::cipher::FieldCipher;
use crate::grant::{FileAccessIssuer, IssuedGrant, VerifiedGrant};
use crate::mfa::{
    IssuedChallenge, MfaChallengeManager, ResendThrottle, VerifiedChallenge,
};
use crate::token::{PurposeKeyring, TokenIssuer, TokenVerifier};

/// Everything the rest of the application needs from the security
/// subsystem, wired together from configuration.
///
/// All components share one keyring and one clock. State is immutable
/// after construction except the resend cooldown map, which serializes
/// itself internally; the whole type is cheap to clone and safe to share
/// across tasks.
#[derive(Debug, Clone)]
pub struct SecurityCore {
    /// Field encryption at rest.
    field_cipher: Arc<FieldCipher>,
    /// MFA challenge lifecycle.
    mfa: Arc<MfaChallengeManager>,
    /// File access grants.
    file_grants: Arc<FileAccessIssuer>,
}

impl SecurityCore {
    /// Wires the security subsystem from configuration and collaborators.
    pub fn new(
        config: &AppConfig,
        transport: Arc<dyn MailTransport>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let security = &config.security;

        let keyring = Arc::new(PurposeKeyring::from_config(security));
        let issuer = TokenIssuer::new(Arc::clone(&keyring), Arc::clone(&clock));
        let verifier = TokenVerifier::new(keyring, Arc::clone(&clock));
        let throttle = Arc::new(ResendThrottle::new(
            security.mfa_resend_cooldown_seconds,
            Arc::clone(&clock),
        ));

        let field_cipher = Arc::new(FieldCipher::from_config(security)?);
        let mfa = Arc::new(MfaChallengeManager::new(
            issuer.clone(),
            verifier.clone(),
            throttle,
            transport,
            Arc::clone(&audit),
            security.mfa_code_ttl_seconds,
        ));
        let file_grants = Arc::new(FileAccessIssuer::new(
            issuer,
            verifier,
            audit,
            security.file_grant_ttl_seconds,
        ));

        Ok(Self {
            field_cipher,
            mfa,
            file_grants,
        })
    }

    /// Wires the subsystem with the system clock and the tracing audit
    /// sink.
    pub fn with_defaults(
        config: &AppConfig,
        transport: Arc<dyn MailTransport>,
    ) -> AppResult<Self> {
        Self::new(
            config,
            transport,
            Arc::new(TracingAuditSink::new()),
            Arc::new(SystemClock),
        )
    }

    /// Whether an account must pass an MFA challenge at login.
    pub fn requires_mfa(&self, profile: &AccountProfile) -> bool {
        self.mfa.requires_mfa(profile)
    }

    /// Issues an MFA challenge and mails the code to the account.
    pub async fn issue_mfa_challenge(
        &self,
        user_id: i64,
        email: &str,
    ) -> AppResult<IssuedChallenge> {
        self.mfa.issue(user_id, email).await
    }

    /// Verifies a submitted code against a challenge token.
    pub fn verify_mfa_challenge(
        &self,
        token: &str,
        code: &str,
    ) -> AppResult<VerifiedChallenge> {
        self.mfa.verify(token, code)
    }

    /// Issues a download grant for one resource path.
    pub async fn issue_file_grant(
        &self,
        resource_path: &str,
        actor_id: Option<i64>,
        ttl_seconds: Option<u64>,
    ) -> AppResult<IssuedGrant> {
        self.file_grants
            .issue(resource_path, actor_id, ttl_seconds)
            .await
    }

    /// Verifies a grant token and returns what it grants.
    pub async fn verify_file_grant(&self, token: &str) -> AppResult<VerifiedGrant> {
        self.file_grants.verify(token).await
    }

    /// Encrypts one field value for storage.
    pub fn encrypt_field(&self, plaintext: &str) -> AppResult<String> {
        self.field_cipher.encrypt(plaintext)
    }

    /// Decrypts one stored field value.
    pub fn decrypt_field(&self, stored: &str) -> AppResult<String> {
        self.field_cipher.decrypt(stored)
    }

    /// Encrypts an optional field, passing `None` through.
    pub fn encrypt_field_opt(&self, value: Option<&str>) -> AppResult<Option<String>> {
        self.field_cipher.encrypt_opt(value)
    }

    /// Decrypts an optional field, passing `None` through.
    pub fn decrypt_field_opt(&self, value: Option<&str>) -> AppResult<Option<String>> {
        self.field_cipher.decrypt_opt(value)
    }
}

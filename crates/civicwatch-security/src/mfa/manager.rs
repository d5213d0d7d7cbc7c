//! MFA challenge lifecycle — issue, resend, verify flows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_core::traits::{AuditEvent, AuditSink, MailMessage, MailTransport};
use civicwatch_core::types::AccountProfile;

use crate::audit::record_best_effort;
use crate::token::{CapabilityClaims, TokenIssuer, TokenPurpose, TokenVerifier};

use super::code::CodeGenerator;
use super::throttle::ResendThrottle;

/// Payload carried inside an MFA challenge token.
///
/// Only the one-way hash of the code travels with the token; the
/// plaintext code goes to the account's mailbox and nowhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MfaChallengePayload {
    /// Argon2id PHC hash of the verification code.
    pub code_hash: String,
}

/// Result of a successful challenge issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedChallenge {
    /// Signed challenge token to hand back to the client.
    pub token: String,
    /// Challenge session ID (also embedded in the token).
    pub session_id: Uuid,
    /// When the challenge stops being acceptable.
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful challenge verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedChallenge {
    /// The account the challenge was issued for.
    pub user_id: i64,
    /// Challenge session ID from the token.
    pub session_id: Uuid,
}

/// Manages the MFA challenge lifecycle.
///
/// Challenges are stateless: everything needed to verify a code later
/// lives in the signed token, so no challenge store exists and a lost
/// token simply means requesting a new one.
#[derive(Clone)]
pub struct MfaChallengeManager {
    /// Token creation.
    issuer: TokenIssuer,
    /// Token validation.
    verifier: TokenVerifier,
    /// Code generation and hashing.
    codes: CodeGenerator,
    /// Per-account resend cooldown.
    throttle: Arc<ResendThrottle>,
    /// Outbound code delivery.
    transport: Arc<dyn MailTransport>,
    /// Audit recording.
    audit: Arc<dyn AuditSink>,
    /// Challenge TTL in seconds.
    code_ttl_seconds: u64,
}

impl std::fmt::Debug for MfaChallengeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MfaChallengeManager")
            .field("code_ttl_seconds", &self.code_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl MfaChallengeManager {
    /// Creates a new challenge manager with all required dependencies.
    pub fn new(
        issuer: TokenIssuer,
        verifier: TokenVerifier,
        throttle: Arc<ResendThrottle>,
        transport: Arc<dyn MailTransport>,
        audit: Arc<dyn AuditSink>,
        code_ttl_seconds: u64,
    ) -> Self {
        Self {
            issuer,
            verifier,
            codes: CodeGenerator::new(),
            throttle,
            transport,
            audit,
            code_ttl_seconds,
        }
    }

    /// Decides whether an account must pass an MFA challenge at login.
    ///
    /// True only for accounts with a non-blank email and a recognized
    /// role flag. Accounts with an unknown flag skip MFA rather than
    /// being locked out.
    pub fn requires_mfa(&self, profile: &AccountProfile) -> bool {
        profile.has_email() && profile.role().is_some()
    }

    /// Performs the complete challenge issuance flow:
    ///
    /// 1. Claim the account's resend slot (cooldown check)
    /// 2. Check the transport has enough settings to deliver
    /// 3. Generate the code and hash it
    /// 4. Mint the challenge token carrying the hash
    /// 5. Dispatch the plaintext code to the account's mailbox
    ///
    /// Rolls the resend slot back on any failure after step 1, so a
    /// failed send never consumes the account's next attempt. A resend
    /// is the same flow again: fresh code, fresh session ID, fresh
    /// expiry.
    pub async fn issue(&self, user_id: i64, email: &str) -> AppResult<IssuedChallenge> {
        // Step 1: Claim the resend slot
        let permit = self.throttle.try_acquire(user_id)?;

        let result = self.issue_inner(user_id, email).await;

        match result {
            Ok(challenge) => {
                // The slot stays claimed: the code is on the wire.
                info!(
                    user_id,
                    session_id = %challenge.session_id,
                    "MFA challenge issued"
                );
                record_best_effort(
                    self.audit.as_ref(),
                    AuditEvent::new("mfa.challenge_issued", "account")
                        .actor(user_id)
                        .target(user_id.to_string())
                        .metadata(serde_json::json!({
                            "session_id": challenge.session_id,
                        })),
                )
                .await;
                Ok(challenge)
            }
            Err(e) => {
                // Rollback: return the slot
                error!(user_id, error = %e, "MFA challenge issuance failed");
                self.throttle.rollback(permit);
                Err(e)
            }
        }
    }

    async fn issue_inner(&self, user_id: i64, email: &str) -> AppResult<IssuedChallenge> {
        // Step 2: Refuse before generating anything if delivery is impossible
        self.transport.ensure_configured()?;

        // Step 3: Generate and hash the one-time code
        let code = self.codes.generate();
        let code_hash = self.codes.hash_code(&code)?;

        // Step 4: Mint the challenge token
        let issued = self.issuer.issue(
            TokenPurpose::Mfa,
            user_id.to_string(),
            MfaChallengePayload { code_hash },
            self.code_ttl_seconds,
        )?;

        // Step 5: Dispatch the plaintext code
        let message = self.challenge_message(email, &code);
        self.transport.send(&message).await?;

        Ok(IssuedChallenge {
            token: issued.token,
            session_id: issued.session_id,
            expires_at: issued.expires_at,
        })
    }

    /// Verifies a submitted code against a challenge token.
    ///
    /// Token rejections (expired, forged, malformed) bubble up with their
    /// own error kinds; an authentic unexpired token with a wrong code
    /// fails with `InvalidCode`. Verification is stateless, so the same
    /// token verifies again until it expires.
    pub fn verify(&self, token: &str, candidate: &str) -> AppResult<VerifiedChallenge> {
        let claims: CapabilityClaims<MfaChallengePayload> =
            self.verifier.verify(token, TokenPurpose::Mfa)?;

        if !self.codes.verify_code(candidate, &claims.payload.code_hash)? {
            return Err(AppError::invalid_code("The verification code is incorrect"));
        }

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::malformed_token("Challenge subject is not an account ID"))?;

        info!(user_id, session_id = %claims.sid, "MFA challenge verified");

        Ok(VerifiedChallenge {
            user_id,
            session_id: claims.sid,
        })
    }

    fn challenge_message(&self, email: &str, code: &str) -> MailMessage {
        let minutes = self.code_ttl_seconds.div_ceil(60).max(1);
        MailMessage::text(
            email,
            "Your CivicWatch verification code",
            format!(
                "Your verification code is {code}. It expires in {minutes} minute(s). \
                 If you did not request this code, you can ignore this message."
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::token::PurposeKeyring;
    use civicwatch_core::config::security::SecurityConfig;
    use civicwatch_core::error::ErrorKind;
    use civicwatch_core::types::ManualClock;
    use civicwatch_mailer::StubMailer;

    struct Harness {
        manager: MfaChallengeManager,
        clock: Arc<ManualClock>,
        mailer: Arc<StubMailer>,
        audit: Arc<MemoryAuditSink>,
    }

    fn harness() -> Harness {
        harness_with(StubMailer::new())
    }

    fn harness_with(mailer: StubMailer) -> Harness {
        let config = SecurityConfig {
            mfa_token_secret: "mfa-secret-for-tests".to_string(),
            file_token_secret: "file-secret-for-tests".to_string(),
            ..SecurityConfig::default()
        };
        let keyring = Arc::new(PurposeKeyring::from_config(&config));
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let mailer = Arc::new(mailer);
        let audit = Arc::new(MemoryAuditSink::new());

        let manager = MfaChallengeManager::new(
            TokenIssuer::new(Arc::clone(&keyring), clock.clone() as _),
            TokenVerifier::new(keyring, clock.clone() as _),
            Arc::new(ResendThrottle::new(
                config.mfa_resend_cooldown_seconds,
                clock.clone() as _,
            )),
            mailer.clone() as _,
            audit.clone() as _,
            config.mfa_code_ttl_seconds,
        );

        Harness {
            manager,
            clock,
            mailer,
            audit,
        }
    }

    fn sent_code(mailer: &StubMailer) -> String {
        let sent = mailer.sent();
        let body = &sent.last().unwrap().text;
        body.split(|c: char| !c.is_ascii_digit())
            .find(|run| run.len() == 6)
            .expect("mail body should contain a six-digit code")
            .to_string()
    }

    #[tokio::test]
    async fn test_issue_and_verify_round_trip() {
        let h = harness();
        let challenge = h.manager.issue(42, "citizen@example.com").await.unwrap();

        let sent = h.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "citizen@example.com");

        let code = sent_code(&h.mailer);
        let verified = h.manager.verify(&challenge.token, &code).unwrap();
        assert_eq!(verified.user_id, 42);
        assert_eq!(verified.session_id, challenge.session_id);
    }

    #[tokio::test]
    async fn test_wrong_code_is_invalid_code() {
        let h = harness();
        let challenge = h.manager.issue(42, "citizen@example.com").await.unwrap();
        let code = sent_code(&h.mailer);
        let wrong = if code == "111111" { "222222" } else { "111111" };

        let err = h.manager.verify(&challenge.token, wrong).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCode);

        // The right code still works afterwards.
        assert!(h.manager.verify(&challenge.token, &code).is_ok());
    }

    #[tokio::test]
    async fn test_expired_challenge_reports_expiry_not_bad_code() {
        let h = harness();
        let challenge = h.manager.issue(42, "citizen@example.com").await.unwrap();
        let code = sent_code(&h.mailer);

        h.clock.advance_secs(301);
        let err = h.manager.verify(&challenge.token, &code).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ExpiredToken);
    }

    #[tokio::test]
    async fn test_resend_within_cooldown_is_throttled() {
        let h = harness();
        h.manager.issue(42, "citizen@example.com").await.unwrap();

        let err = h.manager.issue(42, "citizen@example.com").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::ThrottledRequest);
        assert_eq!(h.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_resend_after_cooldown_issues_fresh_challenge() {
        let h = harness();
        let first = h.manager.issue(42, "citizen@example.com").await.unwrap();

        h.clock.advance_secs(60);
        let second = h.manager.issue(42, "citizen@example.com").await.unwrap();

        assert_ne!(first.session_id, second.session_id);
        assert_ne!(first.token, second.token);
        assert_eq!(h.mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_send_rolls_back_cooldown() {
        let h = harness_with(StubMailer::failing("provider down"));

        let err = h.manager.issue(42, "citizen@example.com").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TransportUnavailable);

        // The failed attempt did not consume the slot: once delivery
        // works again the very next request goes through with no wait.
        h.mailer.set_failure(None);
        assert!(h.manager.issue(42, "citizen@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_unconfigured_transport_fails_before_sending() {
        let h = harness_with(StubMailer::unconfigured());

        let err = h.manager.issue(42, "citizen@example.com").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::TransportUnavailable);
        assert_eq!(h.mailer.sent().len(), 0);
    }

    #[tokio::test]
    async fn test_issue_records_audit_event() {
        let h = harness();
        h.manager.issue(42, "citizen@example.com").await.unwrap();

        let events = h.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "mfa.challenge_issued");
        assert_eq!(events[0].actor_id, Some(42));
    }

    #[tokio::test]
    async fn test_codes_are_salted_per_challenge() {
        let h = harness();
        let first = h.manager.issue(1, "a@example.com").await.unwrap();
        let second = h.manager.issue(2, "b@example.com").await.unwrap();
        // Even if both accounts drew the same code, the embedded hashes
        // must differ because each carries its own salt.
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_requires_mfa_matrix() {
        let h = harness();
        let m = &h.manager;

        assert!(m.requires_mfa(&AccountProfile::new(1, "c@example.com", 0)));
        assert!(m.requires_mfa(&AccountProfile::new(2, "o@example.com", 1)));
        // Blank email: no way to deliver a code.
        assert!(!m.requires_mfa(&AccountProfile::new(3, "", 0)));
        assert!(!m.requires_mfa(&AccountProfile::new(4, "   ", 1)));
        // Unknown role flags skip the challenge rather than locking out.
        assert!(!m.requires_mfa(&AccountProfile::new(5, "x@example.com", 2)));
        assert!(!m.requires_mfa(&AccountProfile::new(6, "x@example.com", -1)));
    }
}

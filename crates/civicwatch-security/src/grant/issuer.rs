//! Short-lived file access grants.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use civicwatch_core::error::AppError;
use civicwatch_core::result::AppResult;
use civicwatch_core::traits::{AuditEvent, AuditSink};

use crate::audit::record_best_effort;
use crate::token::{CapabilityClaims, TokenIssuer, TokenPurpose, TokenVerifier};

/// Payload carried inside a file access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGrantPayload {
    /// Opaque path of the granted resource.
    pub resource_path: String,
    /// Account the grant was issued to, when the download is not
    /// anonymous.
    pub actor_id: Option<i64>,
}

/// Result of a successful grant issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedGrant {
    /// Signed grant token.
    pub token: String,
    /// Grant session ID (also embedded in the token).
    pub session_id: Uuid,
    /// When the grant stops being acceptable.
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful grant verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedGrant {
    /// The granted resource path.
    pub resource_path: String,
    /// Account the grant was issued to, if any.
    pub actor_id: Option<i64>,
    /// Grant session ID from the token.
    pub session_id: Uuid,
    /// When the grant stops being acceptable.
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies single-resource download grants.
///
/// A grant names exactly one resource path and proves nothing beyond
/// "someone who held issuance rights minted this for that path". Mapping
/// the path to an actual file and deciding whether it may be served
/// stays with the caller.
#[derive(Clone)]
pub struct FileAccessIssuer {
    /// Token creation.
    issuer: TokenIssuer,
    /// Token validation.
    verifier: TokenVerifier,
    /// Audit recording.
    audit: Arc<dyn AuditSink>,
    /// Grant TTL in seconds when the caller does not pick one.
    default_ttl_seconds: u64,
}

impl std::fmt::Debug for FileAccessIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileAccessIssuer")
            .field("default_ttl_seconds", &self.default_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl FileAccessIssuer {
    /// Creates a new grant issuer.
    pub fn new(
        issuer: TokenIssuer,
        verifier: TokenVerifier,
        audit: Arc<dyn AuditSink>,
        default_ttl_seconds: u64,
    ) -> Self {
        Self {
            issuer,
            verifier,
            audit,
            default_ttl_seconds,
        }
    }

    /// Issues a grant for one resource path.
    ///
    /// `ttl_seconds` falls back to the configured default when `None`.
    pub async fn issue(
        &self,
        resource_path: &str,
        actor_id: Option<i64>,
        ttl_seconds: Option<u64>,
    ) -> AppResult<IssuedGrant> {
        if resource_path.trim().is_empty() {
            return Err(AppError::validation("Resource path must not be empty"));
        }

        let ttl = ttl_seconds.unwrap_or(self.default_ttl_seconds);
        let issued = self.issuer.issue(
            TokenPurpose::FileAccess,
            resource_path,
            FileGrantPayload {
                resource_path: resource_path.to_string(),
                actor_id,
            },
            ttl,
        )?;

        info!(
            resource_path,
            actor_id = ?actor_id,
            session_id = %issued.session_id,
            ttl_seconds = ttl,
            "File access grant issued"
        );
        record_best_effort(
            self.audit.as_ref(),
            AuditEvent::new("file.grant_issued", "file")
                .target(resource_path)
                .metadata(serde_json::json!({
                    "session_id": issued.session_id,
                    "actor_id": actor_id,
                    "ttl_seconds": ttl,
                })),
        )
        .await;

        Ok(IssuedGrant {
            token: issued.token,
            session_id: issued.session_id,
            expires_at: issued.expires_at,
        })
    }

    /// Verifies a grant token and returns what it grants.
    ///
    /// Delegates entirely to token verification under the file-access
    /// purpose; rejections keep their token error kinds. A successful
    /// verification records a download audit event.
    pub async fn verify(&self, token: &str) -> AppResult<VerifiedGrant> {
        let claims: CapabilityClaims<FileGrantPayload> =
            self.verifier.verify(token, TokenPurpose::FileAccess)?;

        let expires_at = claims.expires_at();
        let grant = VerifiedGrant {
            resource_path: claims.payload.resource_path,
            actor_id: claims.payload.actor_id,
            session_id: claims.sid,
            expires_at,
        };

        let mut event = AuditEvent::new("file.download", "file")
            .target(grant.resource_path.clone())
            .metadata(serde_json::json!({ "session_id": grant.session_id }));
        if let Some(actor_id) = grant.actor_id {
            event = event.actor(actor_id);
        }
        record_best_effort(self.audit.as_ref(), event).await;

        Ok(grant)
    }
}

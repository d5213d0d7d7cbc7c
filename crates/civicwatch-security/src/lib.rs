//! # civicwatch-security
//!
//! The security subsystem for the CivicWatch incident reporting platform:
//! purpose-bound capability tokens, MFA challenge management, short-lived
//! file access grants, and field-level encryption at rest.
//!
//! ## Modules
//!
//! - `token` — purpose-bound HS256 capability tokens (issue and verify)
//! - `cipher` — AES-256-GCM field encryption with tolerant decryption
//! - `mfa` — verification code challenges with per-account resend cooldown
//! - `grant` — single-resource download grants
//! - `audit` — audit sink implementations
//! - `core` — the wired [`SecurityCore`] facade

pub mod audit;
pub mod cipher;
pub mod core;
pub mod grant;
pub mod mfa;
pub mod token;

pub use audit::{MemoryAuditSink, TracingAuditSink};
pub use cipher::{FieldCipher, FieldKey};
pub use core::SecurityCore;
pub use grant::{FileAccessIssuer, FileGrantPayload, IssuedGrant, VerifiedGrant};
pub use mfa::{
    IssuedChallenge, MfaChallengeManager, MfaChallengePayload, ResendThrottle, VerifiedChallenge,
};
pub use token::{CapabilityClaims, IssuedToken, PurposeKeyring, TokenIssuer, TokenPurpose, TokenVerifier};

//! MFA challenge issuance, resend throttling, and verification.

pub mod code;
pub mod manager;
pub mod throttle;

pub use code::CodeGenerator;
pub use manager::{IssuedChallenge, MfaChallengeManager, MfaChallengePayload, VerifiedChallenge};
pub use throttle::{ResendThrottle, ThrottlePermit};

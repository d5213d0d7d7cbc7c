//! File access grant issuance and verification.

pub mod issuer;

pub use issuer::{FileAccessIssuer, FileGrantPayload, IssuedGrant, VerifiedGrant};

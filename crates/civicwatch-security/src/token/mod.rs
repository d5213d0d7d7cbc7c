//! Purpose-bound capability token encoding, decoding, and claims management.

pub mod claims;
pub mod issuer;
pub mod keys;
pub mod verifier;

pub use claims::{CapabilityClaims, TokenPurpose};
pub use issuer::{IssuedToken, TokenIssuer};
pub use keys::PurposeKeyring;
pub use verifier::TokenVerifier;

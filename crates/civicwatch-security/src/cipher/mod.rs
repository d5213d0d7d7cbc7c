//! Field encryption at rest for sensitive report data.

mod envelope;
pub mod field;
pub mod key;

pub use field::FieldCipher;
pub use key::FieldKey;

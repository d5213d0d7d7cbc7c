//! Core traits defined in `civicwatch-core` and implemented by other crates.

pub mod audit;
pub mod mailer;

pub use audit::{AuditEvent, AuditSink};
pub use mailer::{MailMessage, MailTransport};

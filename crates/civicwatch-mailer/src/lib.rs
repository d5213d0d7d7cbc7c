//! # civicwatch-mailer
//!
//! Outbound mail delivery for CivicWatch. Implements the
//! [`MailTransport`](civicwatch_core::traits::MailTransport) trait over an
//! HTTP mail API, plus a recording stub for tests and local development.

pub mod api;
pub mod stub;

pub use api::ApiMailer;
pub use stub::StubMailer;

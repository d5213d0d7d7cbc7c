//! Core type definitions used across the CivicWatch workspace.

pub mod account;
pub mod clock;

pub use account::{AccountProfile, AccountRole};
pub use clock::{Clock, ManualClock, SystemClock};

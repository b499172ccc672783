//! Email verification: rate-limited code issuance, single-use checks, and
//! expiry housekeeping.

pub mod handlers;
pub mod sender;
pub mod service;

pub use sender::{CodeSender, HttpMailSender, NoopSender};
pub use service::VerificationService;

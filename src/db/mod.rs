//! Persistence layer: user directory and verification-code store behind
//! traits, with Postgres and in-memory implementations.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use models::{EmailVerification, Role, User};
pub use postgres::PgStore;
pub use store::{CredentialStore, VerificationStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::models::{EmailVerification, User};
use crate::error::AppError;

/// User directory: lookup and creation of stored credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
    async fn nickname_exists(&self, nickname: &str) -> Result<bool, AppError>;
    async fn count_users(&self) -> Result<u64, AppError>;
}

/// Backing store for verification codes. Implementations must provide
/// per-row atomicity: `replace_unverified` is one unit of work and
/// `mark_verified` is a compare-and-set on `verified: false -> true`.
#[async_trait]
pub trait VerificationStore: Send + Sync {
    /// Most recent unverified request for the address, if any.
    async fn latest_unverified(&self, email: &str) -> Result<Option<EmailVerification>, AppError>;

    /// Atomically delete every unverified row for the record's email and
    /// insert the new row in its place.
    async fn replace_unverified(&self, record: &EmailVerification) -> Result<(), AppError>;

    async fn find_unverified(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<EmailVerification>, AppError>;

    /// Flip `verified` from false to true. Returns false when another caller
    /// already won the flip (or the row is gone), so exactly one concurrent
    /// verification succeeds.
    async fn mark_verified(&self, id: Uuid) -> Result<bool, AppError>;

    /// Delete every row past its expiry, verified or not. Returns the count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{EmailVerification, User};
use crate::db::store::{CredentialStore, VerificationStore};
use crate::error::{AppError, DatabaseError};

/// In-memory store used by the test suite and for running the server
/// without a database. Atomicity comes from holding the write lock across
/// each multi-step mutation.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    verifications: RwLock<Vec<EmailVerification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::DatabaseError(DatabaseError::Duplicate));
        }
        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }

    async fn nickname_exists(&self, nickname: &str) -> Result<bool, AppError> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.nickname == nickname))
    }

    async fn count_users(&self) -> Result<u64, AppError> {
        let users = self.users.read().await;
        Ok(users.len() as u64)
    }
}

#[async_trait]
impl VerificationStore for MemoryStore {
    async fn latest_unverified(&self, email: &str) -> Result<Option<EmailVerification>, AppError> {
        let rows = self.verifications.read().await;
        Ok(rows
            .iter()
            .filter(|v| v.email == email && !v.verified)
            .max_by_key(|v| v.created_at)
            .cloned())
    }

    async fn replace_unverified(&self, record: &EmailVerification) -> Result<(), AppError> {
        let mut rows = self.verifications.write().await;
        rows.retain(|v| !(v.email == record.email && !v.verified));
        rows.push(record.clone());
        Ok(())
    }

    async fn find_unverified(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<EmailVerification>, AppError> {
        let rows = self.verifications.read().await;
        Ok(rows
            .iter()
            .find(|v| v.email == email && v.code == code && !v.verified)
            .cloned())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.verifications.write().await;
        match rows.iter_mut().find(|v| v.id == id && !v.verified) {
            Some(row) => {
                row.verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut rows = self.verifications.write().await;
        let before = rows.len();
        rows.retain(|v| v.expires_at >= now);
        Ok((before - rows.len()) as u64)
    }
}

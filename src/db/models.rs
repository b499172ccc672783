use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub nickname: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: String, name: &str, nickname: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash,
            name: name.to_string(),
            nickname: nickname.to_string(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }
}

/// A pending (or consumed) email verification code. Linked to a signup only
/// by the email address, never by a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmailVerification {
    pub id: Uuid,
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl EmailVerification {
    pub fn new(email: &str, code: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            code: code.to_string(),
            expires_at: now + ttl,
            verified: false,
            created_at: now,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("a@b.com", "hash".into(), "Alice", "ally");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.email, "a@b.com");
        assert_ne!(user.password_hash, "");
    }

    #[test]
    fn test_verification_expiry_window() {
        let v = EmailVerification::new("a@b.com", "123456", Duration::minutes(10));
        assert!(!v.verified);
        assert_eq!(v.expires_at, v.created_at + Duration::minutes(10));
        assert!(!v.is_expired(v.created_at + Duration::minutes(9)));
        assert!(v.is_expired(v.created_at + Duration::minutes(11)));
    }
}

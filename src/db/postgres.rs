use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{EmailVerification, User};
use crate::db::store::{CredentialStore, VerificationStore};
use crate::error::{AppError, DatabaseError};

/// Postgres-backed store. Queries use the runtime API so the crate builds
/// without a reachable database.
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string())))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::QueryError(e.to_string())))?;

        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, user: &User) -> Result<User, AppError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, name, nickname, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, password_hash, name, nickname, role, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.nickname)
        .bind(user.role)
        .bind(user.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, nickname, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, name, nickname, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn nickname_exists(&self, nickname: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1)",
        )
        .bind(nickname)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn count_users(&self) -> Result<u64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count as u64)
    }
}

#[async_trait]
impl VerificationStore for PgStore {
    async fn latest_unverified(&self, email: &str) -> Result<Option<EmailVerification>, AppError> {
        let row = sqlx::query_as::<_, EmailVerification>(
            r#"
            SELECT id, email, code, expires_at, verified, created_at
            FROM email_verifications
            WHERE email = $1 AND verified = FALSE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn replace_unverified(&self, record: &EmailVerification) -> Result<(), AppError> {
        let mut transaction = self.pool.begin().await?;

        let result = async {
            sqlx::query("DELETE FROM email_verifications WHERE email = $1 AND verified = FALSE")
                .bind(&record.email)
                .execute(&mut *transaction)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO email_verifications (id, email, code, expires_at, verified, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(record.id)
            .bind(&record.email)
            .bind(&record.code)
            .bind(record.expires_at)
            .bind(record.verified)
            .bind(record.created_at)
            .execute(&mut *transaction)
            .await?;

            Ok::<(), sqlx::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                transaction.commit().await?;
                Ok(())
            }
            Err(e) => {
                transaction.rollback().await?;
                Err(e.into())
            }
        }
    }

    async fn find_unverified(
        &self,
        email: &str,
        code: &str,
    ) -> Result<Option<EmailVerification>, AppError> {
        let row = sqlx::query_as::<_, EmailVerification>(
            r#"
            SELECT id, email, code, expires_at, verified, created_at
            FROM email_verifications
            WHERE email = $1 AND code = $2 AND verified = FALSE
            "#,
        )
        .bind(email)
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn mark_verified(&self, id: Uuid) -> Result<bool, AppError> {
        // Conditional update is the compare-and-set: of two racing callers
        // only one sees verified = FALSE.
        let result =
            sqlx::query("UPDATE email_verifications SET verified = TRUE WHERE id = $1 AND verified = FALSE")
                .bind(id)
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM email_verifications WHERE expires_at < $1")
            .bind(now)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}

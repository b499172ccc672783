use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{error, info};

use crate::db::models::EmailVerification;
use crate::db::store::{CredentialStore, VerificationStore};
use crate::error::{AppError, VerificationError};
use crate::verification::sender::CodeSender;

/// Issues, rate-limits, and checks single-use verification codes.
pub struct VerificationService {
    store: Arc<dyn VerificationStore>,
    users: Arc<dyn CredentialStore>,
    sender: Arc<dyn CodeSender>,
    code_ttl: Duration,
    resend_cooldown: Duration,
}

impl VerificationService {
    pub fn new(
        store: Arc<dyn VerificationStore>,
        users: Arc<dyn CredentialStore>,
        sender: Arc<dyn CodeSender>,
        code_ttl_secs: i64,
        resend_cooldown_secs: i64,
    ) -> Self {
        Self {
            store,
            users,
            sender,
            code_ttl: Duration::seconds(code_ttl_secs),
            resend_cooldown: Duration::seconds(resend_cooldown_secs),
        }
    }

    /// Store a fresh code for the address and hand it to the delivery
    /// channel. The code is durable before dispatch is attempted, so a
    /// delivery failure is logged but never unwinds the request: the user
    /// can ask for a fresh code if the message silently went missing.
    pub async fn request_code(&self, email: &str) -> Result<(), AppError> {
        if self.users.email_exists(email).await? {
            return Err(VerificationError::AlreadyRegistered.into());
        }

        let now = Utc::now();
        if let Some(recent) = self.store.latest_unverified(email).await? {
            let resend_at = recent.created_at + self.resend_cooldown;
            if now < resend_at {
                let retry_after_secs = (resend_at - now).num_seconds().max(1);
                return Err(VerificationError::RateLimited { retry_after_secs }.into());
            }
        }

        let code = generate_code();
        let record = EmailVerification::new(email, &code, self.code_ttl);
        // Supersede: prior unverified codes for this address die with the
        // insert, as one unit of work in the store.
        self.store.replace_unverified(&record).await?;
        info!("issued verification code for {}", email);

        let sender = Arc::clone(&self.sender);
        let to = email.to_owned();
        tokio::spawn(async move {
            if let Err(e) = sender.send_code(&to, &code).await {
                error!("failed to deliver verification code to {}: {}", to, e);
            }
        });

        Ok(())
    }

    /// Single-use check: a consumed or superseded code no longer matches,
    /// and of two racing calls with a valid code exactly one wins the
    /// store-level flip to verified.
    pub async fn verify_code(&self, email: &str, code: &str) -> Result<(), AppError> {
        let record = self
            .store
            .find_unverified(email, code)
            .await?
            .ok_or(VerificationError::InvalidCode)?;

        if record.is_expired(Utc::now()) {
            return Err(VerificationError::CodeExpired.into());
        }

        if !self.store.mark_verified(record.id).await? {
            return Err(VerificationError::InvalidCode.into());
        }

        info!("verified email {}", email);
        Ok(())
    }

    /// Housekeeping only: `verify_code` checks expiry itself, so
    /// correctness never depends on this running.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let deleted = self.store.delete_expired(now).await?;
        if deleted > 0 {
            info!("removed {} expired verification codes", deleted);
        }
        Ok(deleted)
    }
}

fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

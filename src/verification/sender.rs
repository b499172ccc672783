use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::error::AppError;

/// Outbound delivery channel for verification codes. The service treats
/// delivery as fire-and-forget; implementations only need to report
/// failure so it can be logged.
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), AppError>;
}

/// Delivers codes through an HTTP mail gateway.
pub struct HttpMailSender {
    client: reqwest::Client,
    gateway_url: String,
    from_address: String,
}

impl HttpMailSender {
    pub fn new(gateway_url: String, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway_url,
            from_address,
        }
    }
}

#[async_trait]
impl CodeSender for HttpMailSender {
    async fn send_code(&self, to: &str, code: &str) -> Result<(), AppError> {
        self.client
            .post(&self.gateway_url)
            .json(&json!({
                "from": self.from_address,
                "to": to,
                "subject": "Email verification code",
                "body": format!("Your verification code is {code}."),
            }))
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("mail gateway request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::InternalError(format!("mail gateway rejected message: {e}")))?;

        Ok(())
    }
}

/// Logs instead of delivering. Used when no gateway is configured; codes
/// are still stored and checkable.
pub struct NoopSender;

#[async_trait]
impl CodeSender for NoopSender {
    async fn send_code(&self, to: &str, _code: &str) -> Result<(), AppError> {
        info!("mail delivery disabled, dropping verification code for {}", to);
        Ok(())
    }
}

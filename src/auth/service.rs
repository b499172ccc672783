use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::password;
use crate::auth::token::TokenIssuer;
use crate::db::models::User;
use crate::db::store::CredentialStore;
use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

impl TokenPair {
    fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer",
        }
    }
}

/// Orchestrates signup, login, and refresh against the credential store
/// and token issuer.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenIssuer>) -> Self {
        Self { store, tokens }
    }

    /// Create credentials with role USER. No tokens are issued; login is a
    /// separate step.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
        nickname: &str,
    ) -> Result<User, AppError> {
        if self.store.email_exists(email).await? {
            return Err(AuthError::DuplicateCredential("email already in use".into()).into());
        }
        if self.store.nickname_exists(nickname).await? {
            return Err(AuthError::DuplicateCredential("nickname already in use".into()).into());
        }

        let raw = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || password::hash(&raw))
            .await
            .map_err(|e| AppError::InternalError(format!("hashing task failed: {e}")))??;

        let user = User::new(email, password_hash, name, nickname);
        let created = self.store.create_user(&user).await?;
        info!("created account for {}", created.email);
        Ok(created)
    }

    /// Both an unknown email and a wrong password surface the same
    /// `InvalidCredentials`, so the response never discloses whether an
    /// address is registered.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = match self.store.find_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("login rejected: no account for {}", email);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let raw = password.to_owned();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || password::verify(&raw, &hash))
            .await
            .map_err(|e| AppError::InternalError(format!("verify task failed: {e}")))?;

        if !matches {
            warn!("login rejected: wrong password for {}", email);
            return Err(AuthError::InvalidCredentials.into());
        }

        info!("login successful for {}", user.email);
        Ok(TokenPair::bearer(
            self.tokens.issue_access_token(&user.email)?,
            self.tokens.issue_refresh_token(&user.email)?,
        ))
    }

    /// Mint a fresh access token from a valid refresh token. The refresh
    /// token itself is returned unchanged; rotation is deliberately not
    /// done here.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        self.tokens.validate(refresh_token)?;
        let subject = self.tokens.subject_of(refresh_token)?;

        Ok(TokenPair::bearer(
            self.tokens.issue_access_token(&subject)?,
            refresh_token.to_owned(),
        ))
    }
}

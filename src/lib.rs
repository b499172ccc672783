pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod verification;

use std::sync::Arc;

use actix_web::{web, HttpResponse};

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

pub use auth::{AuthService, PublicPaths, RequestAuthorizer, TokenIssuer};
pub use db::{CredentialStore, MemoryStore, PgStore, VerificationStore};
pub use verification::{CodeSender, HttpMailSender, NoopSender, VerificationService};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub credential_store: Arc<dyn CredentialStore>,
    pub token_issuer: Arc<TokenIssuer>,
    pub auth_service: Arc<AuthService>,
    pub verification_service: Arc<VerificationService>,
}

impl AppState {
    /// Production composition: Postgres-backed stores, mail gateway when
    /// one is configured.
    pub async fn new(config: Settings) -> Result<Self> {
        let store = Arc::new(
            PgStore::connect(&config.database.url, config.database.max_connections).await?,
        );

        let sender: Arc<dyn CodeSender> = if config.mail.gateway_url.is_empty() {
            Arc::new(NoopSender)
        } else {
            Arc::new(HttpMailSender::new(
                config.mail.gateway_url.clone(),
                config.mail.from_address.clone(),
            ))
        };

        Ok(Self::with_stores(config, store.clone(), store, sender))
    }

    /// Explicit composition root: every collaborator is passed in, nothing
    /// is ambient. Also the entry point for tests and database-less runs.
    pub fn with_stores(
        config: Settings,
        credential_store: Arc<dyn CredentialStore>,
        verification_store: Arc<dyn VerificationStore>,
        sender: Arc<dyn CodeSender>,
    ) -> Self {
        let token_issuer = Arc::new(TokenIssuer::new(
            &config.auth.jwt_secret,
            config.auth.access_token_ttl_secs,
            config.auth.refresh_token_ttl_secs,
        ));

        let auth_service = Arc::new(AuthService::new(
            credential_store.clone(),
            token_issuer.clone(),
        ));

        let verification_service = Arc::new(VerificationService::new(
            verification_store,
            credential_store.clone(),
            sender,
            config.verification.code_ttl_secs,
            config.verification.resend_cooldown_secs,
        ));

        Self {
            config: Arc::new(config),
            credential_store,
            token_issuer,
            auth_service,
            verification_service,
        }
    }
}

/// Route table shared by the server binary and the integration tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/auth/signup", web::post().to(auth::handlers::signup))
        .route("/auth/login", web::post().to(auth::handlers::login))
        .route("/auth/refresh", web::post().to(auth::handlers::refresh))
        .route(
            "/auth/email/send-verification",
            web::post().to(verification::handlers::send_verification),
        )
        .route(
            "/auth/email/verify",
            web::post().to(verification::handlers::verify_email),
        )
        .route("/users/me", web::get().to(auth::handlers::me))
        .route("/admin/stats", web::get().to(auth::handlers::admin_stats));
}

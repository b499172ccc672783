#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use board_auth_server::config::{
    AuthConfig, CorsConfig, DatabaseConfig, MailConfig, ServerConfig, VerificationConfig,
};
use board_auth_server::verification::CodeSender;
use board_auth_server::{AppState, MemoryStore, NoopSender, Settings};

pub fn settings() -> Settings {
    Settings {
        environment: "test".into(),
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            workers: 1,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/unused".into(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test_secret".into(),
            access_token_ttl_secs: 1800,
            refresh_token_ttl_secs: 1_209_600,
        },
        verification: VerificationConfig {
            code_ttl_secs: 600,
            resend_cooldown_secs: 300,
            sweep_interval_secs: 86_400,
        },
        mail: MailConfig {
            gateway_url: String::new(),
            from_address: "no-reply@board.local".into(),
        },
        cors: CorsConfig {
            enabled: false,
            allow_any_origin: false,
            max_age: 3600,
        },
    }
}

/// In-memory application state. The returned store handle lets tests
/// inspect and back-date rows directly.
pub fn test_state(config: Settings) -> (web::Data<AppState>, Arc<MemoryStore>) {
    test_state_with_sender(config, Arc::new(NoopSender))
}

pub fn test_state_with_sender(
    config: Settings,
    sender: Arc<dyn CodeSender>,
) -> (web::Data<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_stores(config, store.clone(), store.clone(), sender);
    (web::Data::new(state), store)
}

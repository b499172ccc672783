use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use board_auth_server::{AppState, PublicPaths, RequestAuthorizer, Settings};
use dotenv::dotenv;
use std::net::TcpListener;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> board_auth_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // Load configuration
    let config = Settings::new()?;
    info!("Configuration loaded successfully");

    info!("Starting server at {}:{}", config.server.host, config.server.port);

    // Initialize application state
    let state = AppState::new(config.clone()).await?;
    let state = web::Data::new(state);

    // Periodic cleanup of expired verification codes. Housekeeping only:
    // verification checks expiry on its own.
    let sweep_state = state.clone();
    let sweep_interval = config.verification.sweep_interval_secs;
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(sweep_interval)).await;
            if let Err(e) = sweep_state
                .verification_service
                .sweep_expired(chrono::Utc::now())
                .await
            {
                error!("verification sweep failed: {}", e);
            }
        }
    });

    // Create and bind TCP listener
    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;

    // Start HTTP server
    HttpServer::new(move || {
        let cors = if config.cors.enabled {
            let cors_config = Cors::default();

            let cors_config = if config.cors.allow_any_origin {
                cors_config
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
            } else {
                cors_config
                    .allowed_origin("http://localhost:3000")
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
                    .allowed_headers(vec!["Authorization", "Content-Type"])
                    .supports_credentials()
            };

            cors_config.max_age(config.cors.max_age as usize)
        } else {
            Cors::default()
        };

        let authorizer = RequestAuthorizer::new(
            state.token_issuer.clone(),
            state.credential_store.clone(),
            PublicPaths::default(),
        );

        // CORS registered last so it runs outermost (preflights carry no
        // bearer token).
        App::new()
            .wrap(authorizer)
            .wrap(cors)
            .app_data(state.clone())
            .configure(board_auth_server::routes)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await
    .map_err(|e| board_auth_server::AppError::InternalError(e.to_string()))?;

    Ok(())
}

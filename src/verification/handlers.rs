use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendVerificationQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub email: String,
    pub code: String,
}

pub async fn send_verification(
    query: web::Query<SendVerificationQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received verification-code request for email: {}", query.email);
    state.verification_service.request_code(&query.email).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "verification code sent"
    })))
}

pub async fn verify_email(
    query: web::Query<VerifyQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received verification attempt for email: {}", query.email);
    state
        .verification_service
        .verify_code(&query.email, &query.code)
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "email verified"
    })))
}

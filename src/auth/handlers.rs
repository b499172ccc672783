use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::auth::authorizer::AuthenticatedUser;
use crate::db::models::Role;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub nickname: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub name: String,
    pub nickname: String,
    pub role: Role,
}

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received signup request for email: {}", req.email);
    validate_signup(&req)?;

    let user = state
        .auth_service
        .signup(&req.email, &req.password, &req.name, &req.nickname)
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        nickname: user.nickname,
        role: user.role,
    }))
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for email: {}", req.email);
    let pair = state.auth_service.login(&req.email, &req.password).await?;
    Ok(HttpResponse::Ok().json(pair))
}

pub async fn refresh(
    req: web::Json<RefreshRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let pair = state.auth_service.refresh(&req.refresh_token).await?;
    Ok(HttpResponse::Ok().json(pair))
}

/// The authenticated caller's own principal.
pub async fn me(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(json!({
        "id": user.id,
        "email": user.email,
        "role": user.role,
    })))
}

/// Admin-only counters.
pub async fn admin_stats(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    user.require_role(Role::Admin)?;
    let users = state.credential_store.count_users().await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

fn validate_signup(req: &SignupRequest) -> Result<(), AppError> {
    if req.email.is_empty() || req.email.len() > 50 || !is_plausible_email(&req.email) {
        return Err(AppError::ValidationError("invalid email address".into()));
    }
    if req.name.is_empty() || req.name.chars().count() > 10 {
        return Err(AppError::ValidationError("name must be 1-10 characters".into()));
    }
    if req.nickname.is_empty() || req.nickname.chars().count() > 20 {
        return Err(AppError::ValidationError("nickname must be 1-20 characters".into()));
    }
    if !is_valid_password(&req.password) {
        return Err(AppError::ValidationError(
            "password must be at least 8 characters and contain a letter, a digit, and a special character (@$!%*#?&)".into(),
        ));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

const PASSWORD_SPECIALS: &str = "@$!%*#?&";

fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy() {
        assert!(is_valid_password("Pw12345!"));
        assert!(is_valid_password("abcd123@xy"));
        assert!(!is_valid_password("short1!"));
        assert!(!is_valid_password("nodigits!!"));
        assert!(!is_valid_password("nospecial123"));
        assert!(!is_valid_password("has spaces 1!"));
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("alice@x.com"));
        assert!(!is_plausible_email("alice"));
        assert!(!is_plausible_email("@x.com"));
        assert!(!is_plausible_email("alice@nodot"));
    }
}

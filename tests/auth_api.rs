mod common;

use actix_web::{test, App};
use board_auth_server::routes;
use serde_json::json;

#[actix_web::test]
async fn test_signup_and_login() {
    let (state, _store) = common::test_state(common::settings());
    let app = test::init_service(
        App::new().app_data(state.clone()).configure(routes),
    )
    .await;

    let signup_response = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "alice@x.com",
            "password": "Pw12345!",
            "name": "Alice",
            "nickname": "ally"
        }))
        .send_request(&app)
        .await;

    assert_eq!(signup_response.status(), 200);
    let signup_body: serde_json::Value = test::read_body_json(signup_response).await;
    assert_eq!(signup_body["email"], "alice@x.com");
    assert_eq!(signup_body["role"], "USER");
    assert!(signup_body.get("password_hash").is_none());

    let login_response = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "email": "alice@x.com",
            "password": "Pw12345!"
        }))
        .send_request(&app)
        .await;

    assert_eq!(login_response.status(), 200);
    let login_body: serde_json::Value = test::read_body_json(login_response).await;
    assert_eq!(login_body["tokenType"], "Bearer");

    // Both tokens decode back to the email they were minted for.
    let access = login_body["accessToken"].as_str().unwrap();
    let refresh = login_body["refreshToken"].as_str().unwrap();
    assert_eq!(state.token_issuer.validate(access).unwrap(), "alice@x.com");
    assert_eq!(state.token_issuer.validate(refresh).unwrap(), "alice@x.com");
}

#[actix_web::test]
async fn test_duplicate_signup_conflicts() {
    let (state, _store) = common::test_state(common::settings());
    let app = test::init_service(
        App::new().app_data(state.clone()).configure(routes),
    )
    .await;

    let payload = json!({
        "email": "alice@x.com",
        "password": "Pw12345!",
        "name": "Alice",
        "nickname": "ally"
    });

    let first = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(&payload)
        .send_request(&app)
        .await;
    assert_eq!(first.status(), 200);

    let second = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(&payload)
        .send_request(&app)
        .await;
    assert_eq!(second.status(), 409);
}

#[actix_web::test]
async fn test_invalid_credentials_are_indistinguishable() {
    let (state, _store) = common::test_state(common::settings());
    let app = test::init_service(
        App::new().app_data(state.clone()).configure(routes),
    )
    .await;

    test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "alice@x.com",
            "password": "Pw12345!",
            "name": "Alice",
            "nickname": "ally"
        }))
        .send_request(&app)
        .await;

    let wrong_password = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "alice@x.com", "password": "Wrong12345!" }))
        .send_request(&app)
        .await;
    assert_eq!(wrong_password.status(), 401);
    let wrong_password_body = test::read_body(wrong_password).await;

    let unknown_email = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "nobody@x.com", "password": "Wrong12345!" }))
        .send_request(&app)
        .await;
    assert_eq!(unknown_email.status(), 401);
    let unknown_email_body = test::read_body(unknown_email).await;

    // Byte-identical responses, so the API never discloses whether an
    // email is registered.
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[actix_web::test]
async fn test_signup_validation() {
    let (state, _store) = common::test_state(common::settings());
    let app = test::init_service(
        App::new().app_data(state.clone()).configure(routes),
    )
    .await;

    let weak_password = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "alice@x.com",
            "password": "short",
            "name": "Alice",
            "nickname": "ally"
        }))
        .send_request(&app)
        .await;
    assert_eq!(weak_password.status(), 400);

    let bad_email = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "not-an-email",
            "password": "Pw12345!",
            "name": "Alice",
            "nickname": "ally"
        }))
        .send_request(&app)
        .await;
    assert_eq!(bad_email.status(), 400);
}

#[actix_web::test]
async fn test_refresh_returns_new_access_and_same_refresh() {
    let (state, _store) = common::test_state(common::settings());
    let app = test::init_service(
        App::new().app_data(state.clone()).configure(routes),
    )
    .await;

    test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "alice@x.com",
            "password": "Pw12345!",
            "name": "Alice",
            "nickname": "ally"
        }))
        .send_request(&app)
        .await;

    let login = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": "alice@x.com", "password": "Pw12345!" }))
        .send_request(&app)
        .await;
    let login_body: serde_json::Value = test::read_body_json(login).await;
    let refresh_token = login_body["refreshToken"].as_str().unwrap().to_string();

    let refresh = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({ "refreshToken": refresh_token }))
        .send_request(&app)
        .await;
    assert_eq!(refresh.status(), 200);
    let refresh_body: serde_json::Value = test::read_body_json(refresh).await;

    // Same refresh token comes back; the access token is freshly minted.
    assert_eq!(refresh_body["refreshToken"].as_str().unwrap(), refresh_token);
    let access = refresh_body["accessToken"].as_str().unwrap();
    assert_eq!(state.token_issuer.validate(access).unwrap(), "alice@x.com");
}

#[actix_web::test]
async fn test_refresh_with_invalid_token_is_unauthorized() {
    let (state, _store) = common::test_state(common::settings());
    let app = test::init_service(
        App::new().app_data(state.clone()).configure(routes),
    )
    .await;

    let response = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({ "refreshToken": "not-a-token" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);

    // Expired refresh token gets the same 401.
    let now = chrono::Utc::now();
    let expired = state
        .token_issuer
        .issue_at("alice@x.com", now - chrono::Duration::days(15), now - chrono::Duration::seconds(1))
        .unwrap();
    let response = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({ "refreshToken": expired }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
}

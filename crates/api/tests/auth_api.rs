//! HTTP-level integration tests for the `/api/auth` endpoints.
//!
//! Tests cover signup (brand and staff), login, the current-user endpoint,
//! token rejection and the password reset flow.

mod common;

use axum::http::StatusCode;
use briefdesk_api::auth::jwt::{generate_session_token, Claims, TokenPurpose};
use briefdesk_core::event_types::{PASSWORD_RESET_REQUESTED, USER_SIGNED_UP};
use briefdesk_core::roles::Role;
use briefdesk_db::repositories::{BrandRepo, UserRepo};
use common::{
    build_test_app, expect_json, get, get_auth, post_json, signup_brand, signup_staff,
    STRONG_PASSWORD, TEST_SECRET,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

fn signup_body(email: &str, password: &str) -> serde_json::Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "password": password,
        "businessName": "Analytical Engines",
    })
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_creates_brand_owner_with_trial() {
    let app = build_test_app();
    let mut events = app.state.event_bus.subscribe();

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/signup",
            signup_body("  Ada@Example.COM ", STRONG_PASSWORD),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(json["success"], true);
    assert!(json["token"].is_string());
    assert_eq!(json["user"]["email"], "ada@example.com");
    assert_eq!(json["user"]["role"], "brand");
    assert!(json["user"].get("passwordHash").is_none());

    let user = UserRepo::find_by_email(app.pool(), "ada@example.com")
        .await
        .unwrap()
        .expect("user stored");
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert!(user.trial_ends_at.is_some());

    let brand = BrandRepo::find_for_user(app.pool(), user.id)
        .await
        .unwrap()
        .expect("brand created");
    assert_eq!(brand.business_name.as_deref(), Some("Analytical Engines"));
    assert_eq!(brand.members.len(), 1);
    assert_eq!(brand.members[0].email, "ada@example.com");

    let event = events.try_recv().expect("signup event published");
    assert_eq!(event.event_type, USER_SIGNED_UP);
    assert_eq!(event.payload_str("email"), Some("ada@example.com"));
}

#[tokio::test]
async fn signup_rejects_duplicate_email_case_insensitively() {
    let app = build_test_app();
    signup_brand(&app, "dup@example.com").await;

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/signup",
            signup_body("DUP@example.com", STRONG_PASSWORD),
        )
        .await,
        StatusCode::CONFLICT,
    )
    .await;
    assert_eq!(json["error"], "User already exists");
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn signup_rejects_weak_password() {
    let app = build_test_app();

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/signup",
            signup_body("weak@example.com", "password"),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(
        json["error"],
        "Password too weak. Use at least 8 characters, with numbers & symbols."
    );
}

#[tokio::test]
async fn signup_rejects_missing_fields() {
    let app = build_test_app();

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/signup",
            json!({ "email": "x@example.com", "password": STRONG_PASSWORD }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "Missing required fields");
}

#[tokio::test]
async fn staff_signup_creates_staff_without_brand() {
    let app = build_test_app();
    let token = signup_staff(&app, "sam@studio.test").await;

    let json = expect_json(
        get_auth(app.app(), "/api/auth/me", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["user"]["role"], "staff");
    assert!(json["user"]["brandId"].is_null());
    assert!(json["user"]["trialEndsAt"].is_null());
    assert!(BrandRepo::list(app.pool()).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_token_for_valid_credentials() {
    let app = build_test_app();
    signup_brand(&app, "login@example.com").await;

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/login",
            json!({ "email": "Login@Example.com", "password": STRONG_PASSWORD, "role": "brand" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    let token = json["token"].as_str().unwrap();
    let me = expect_json(get_auth(app.app(), "/api/auth/me", token).await, StatusCode::OK).await;
    assert_eq!(me["user"]["email"], "login@example.com");
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email() {
    let app = build_test_app();
    signup_brand(&app, "owner@example.com").await;

    for body in [
        json!({ "email": "owner@example.com", "password": "Wrong-pass-1" }),
        json!({ "email": "nobody@example.com", "password": STRONG_PASSWORD }),
    ] {
        let json = expect_json(
            post_json(app.app(), "/api/auth/login", body).await,
            StatusCode::UNAUTHORIZED,
        )
        .await;
        assert_eq!(json["error"], "Invalid credentials");
    }
}

#[tokio::test]
async fn login_rejects_role_mismatch() {
    let app = build_test_app();
    signup_brand(&app, "brand@example.com").await;

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/login",
            json!({ "email": "brand@example.com", "password": STRONG_PASSWORD, "role": "staff" }),
        )
        .await,
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(json["error"], "Role mismatch: account is 'brand', not 'staff'");
}

// ---------------------------------------------------------------------------
// Token handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn me_requires_a_token() {
    let app = build_test_app();

    let json = expect_json(get(app.app(), "/api/auth/me").await, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["error"], "No token provided. Please log in.");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = build_test_app();

    let json = expect_json(
        get_auth(app.app(), "/api/auth/me", "not.a.jwt").await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(json["error"], "Invalid token. Please log in again.");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = build_test_app();
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: uuid::Uuid::new_v4(),
        email: "old@example.com".into(),
        role: Role::Brand,
        purpose: TokenPurpose::Session,
        pwd: None,
        exp: now - 60,
        iat: now - 3600,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let json = expect_json(
        get_auth(app.app(), "/api/auth/me", &token).await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(json["error"], "Session expired. Please log in again.");
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let app = build_test_app();
    let token = generate_session_token(
        uuid::Uuid::new_v4(),
        "ghost@example.com",
        Role::Brand,
        &app.state.config.jwt,
    )
    .unwrap();

    let json = expect_json(
        get_auth(app.app(), "/api/auth/me", &token).await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(json["error"], "User not found. Please log in.");
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reset_request_does_not_reveal_unknown_accounts() {
    let app = build_test_app();
    let mut events = app.state.event_bus.subscribe();

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/request-password-reset",
            json!({ "email": "nobody@example.com" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "If the email exists, a reset link has been sent.");
    assert!(events.try_recv().is_err(), "no email for unknown accounts");
}

#[tokio::test]
async fn reset_token_changes_password_once() {
    let app = build_test_app();
    signup_brand(&app, "forgetful@example.com").await;
    let mut events = app.state.event_bus.subscribe();

    expect_json(
        post_json(
            app.app(),
            "/api/auth/request-password-reset",
            json!({ "email": "forgetful@example.com" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    let event = events.try_recv().expect("reset event published");
    assert_eq!(event.event_type, PASSWORD_RESET_REQUESTED);
    let reset_token = event.payload_str("token").expect("token in payload").to_string();

    let body = json!({ "token": reset_token, "newPassword": "Brand-new-pass-7" });
    let json = expect_json(
        post_json(app.app(), "/api/auth/reset-password", body.clone()).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["success"], true);

    // Second use fails because the password it was bound to is gone.
    let json = expect_json(
        post_json(app.app(), "/api/auth/reset-password", body).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "Invalid or expired token");

    expect_json(
        post_json(
            app.app(),
            "/api/auth/login",
            json!({ "email": "forgetful@example.com", "password": "Brand-new-pass-7" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
}

#[tokio::test]
async fn session_token_cannot_reset_password() {
    let app = build_test_app();
    let session = signup_brand(&app, "sneaky@example.com").await;

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/reset-password",
            json!({ "token": session, "newPassword": "Another-pass-9" }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "Invalid or expired token");
}

#[tokio::test]
async fn reset_rejects_weak_new_password() {
    let app = build_test_app();

    let json = expect_json(
        post_json(
            app.app(),
            "/api/auth/reset-password",
            json!({ "token": "whatever", "newPassword": "short" }),
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(
        json["error"],
        "Password too weak. Use at least 8 characters, with numbers & symbols."
    );
}

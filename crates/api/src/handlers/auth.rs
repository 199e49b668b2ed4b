//! Handlers for the `/auth` resource (signup, login, profile, password reset).

use axum::extract::State;
use axum::Json;
use briefdesk_core::email::{normalize_email, validate_email};
use briefdesk_core::error::CoreError;
use briefdesk_core::event_types::{PASSWORD_RESET_REQUESTED, USER_SIGNED_UP};
use briefdesk_core::roles::Role;
use briefdesk_core::subscription::trial_end;
use briefdesk_core::types::Timestamp;
use briefdesk_db::models::brand::CreateBrand;
use briefdesk_db::models::user::{CreateUser, User, UserInfo, UserResponse};
use briefdesk_db::repositories::UserRepo;
use briefdesk_events::PlatformEvent;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{
    generate_reset_token, generate_session_token, password_fingerprint, validate_token,
    TokenPurpose,
};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_against_dummy, verify_password,
    MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::extract::ValidJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const RESET_REQUESTED_MESSAGE: &str = "If the email exists, a reset link has been sent.";
const RESET_DONE_MESSAGE: &str = "Password reset successfully. You can now log in.";
const INVALID_RESET_TOKEN: &str = "Invalid or expired token";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup` and `POST /auth/staff-signup`.
///
/// Brand profile fields are ignored by staff signup.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing required fields"))]
    pub password: String,
    pub business_name: Option<String>,
    pub industry: Option<String>,
    pub brand_color: Option<String>,
    pub typography: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing email or password"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing email or password"))]
    pub password: String,
    /// When present, the account must have exactly this role.
    pub role: Option<Role>,
}

/// Request body for `POST /auth/request-password-reset`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing token or new password"))]
    pub token: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Missing token or new password"))]
    pub new_password: String,
}

/// Successful authentication response returned by signup and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Create a brand owner and their brand, stamp the free trial, and return a
/// session token.
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<SignupRequest>,
) -> AppResult<Json<AuthResponse>> {
    let trial_ends_at = Some(trial_end(Utc::now(), state.config.trial_days));
    let new_user = prepare_user(&input, Role::Brand, trial_ends_at)?;

    let brand = CreateBrand {
        business_name: input.business_name,
        industry: input.industry,
        brand_color: input.brand_color,
        typography: input.typography,
    };
    let (user, brand) = UserRepo::create_with_brand(&state.pool, &new_user, &brand).await?;

    tracing::info!(user_id = %user.id, brand_id = %brand.id, "Brand account created");
    publish_signup(&state, &user);

    auth_response(&state, &user).map(Json)
}

/// POST /api/auth/staff-signup
///
/// Create a staff account. Staff users never own a brand.
pub async fn staff_signup(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<SignupRequest>,
) -> AppResult<Json<AuthResponse>> {
    let new_user = prepare_user(&input, Role::Staff, None)?;
    let user = UserRepo::create(&state.pool, &new_user).await?;

    tracing::info!(user_id = %user.id, "Staff account created");
    publish_signup(&state, &user);

    auth_response(&state, &user).map(Json)
}

/// POST /api/auth/login
///
/// Authenticate with email + password. An optional `role` must match the
/// account's role.
pub async fn login(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(&input.email);
    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        verify_against_dummy(&input.password);
        return Err(invalid_credentials());
    };

    let matches = verify_password(&input.password, &user.password_hash).unwrap_or_else(|e| {
        tracing::warn!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
        false
    });
    if !matches {
        return Err(invalid_credentials());
    }

    if let Some(requested) = input.role {
        if requested != user.role {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Role mismatch: account is '{}', not '{}'",
                user.role, requested
            ))));
        }
    }

    auth_response(&state, &user).map(Json)
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MeResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;

    Ok(Json(MeResponse {
        user: UserResponse::from(&user),
    }))
}

/// POST /api/auth/request-password-reset
///
/// Always answers the same way so callers cannot learn which emails exist.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<ResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    let email = normalize_email(&input.email);

    if let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? {
        let token = generate_reset_token(
            user.id,
            &user.email,
            user.role,
            &user.password_hash,
            &state.config.jwt,
        )
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

        state.event_bus.publish(
            PlatformEvent::new(PASSWORD_RESET_REQUESTED)
                .about("user", user.id)
                .with_payload(serde_json::json!({
                    "email": user.email,
                    "token": token,
                })),
        );
        tracing::info!(user_id = %user.id, "Password reset requested");
    }

    Ok(Json(MessageResponse {
        success: true,
        message: RESET_REQUESTED_MESSAGE,
    }))
}

/// POST /api/auth/reset-password
///
/// Set a new password using a reset token. The token is bound to the
/// password it was issued against, so it works at most once.
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    validate_password_strength(&input.new_password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;

    let claims = validate_token(&input.token, TokenPurpose::Reset, &state.config.jwt)
        .map_err(|_| AppError::BadRequest(INVALID_RESET_TOKEN.into()))?;

    let user = UserRepo::find_by_id(&state.pool, claims.sub)
        .await?
        .filter(|u| u.email == claims.email)
        .ok_or_else(|| AppError::BadRequest("Invalid token or user not found".into()))?;

    if claims.pwd.as_deref() != Some(password_fingerprint(&user.password_hash).as_str()) {
        return Err(AppError::BadRequest(INVALID_RESET_TOKEN.into()));
    }

    let hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &hash).await?;

    tracing::info!(user_id = %user.id, "Password reset");

    Ok(Json(MessageResponse {
        success: true,
        message: RESET_DONE_MESSAGE,
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Check password strength and email syntax, then hash the password.
fn prepare_user(
    input: &SignupRequest,
    role: Role,
    trial_ends_at: Option<Timestamp>,
) -> AppResult<CreateUser> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(CoreError::Validation)?;

    let email = normalize_email(&input.email);
    validate_email(&email).map_err(CoreError::Validation)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    Ok(CreateUser {
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email,
        password_hash,
        role,
        trial_ends_at,
    })
}

fn publish_signup(state: &AppState, user: &User) {
    state.event_bus.publish(
        PlatformEvent::new(USER_SIGNED_UP)
            .about("user", user.id)
            .by(user.id)
            .with_payload(serde_json::json!({
                "email": user.email,
                "firstName": user.first_name,
            })),
    );
}

fn auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let token = generate_session_token(user.id, &user.email, user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        success: true,
        token,
        user: UserInfo::from(user),
    })
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid credentials".into()))
}

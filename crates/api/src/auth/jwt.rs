//! JWT session and password-reset tokens.
//!
//! Both kinds are HS256-signed JWTs carrying [`Claims`]; the `purpose` claim
//! keeps one from being used as the other. Reset tokens also carry a short
//! SHA-256 fingerprint of the password hash they were issued against, so a
//! reset token stops working as soon as the password changes.

use briefdesk_core::roles::Role;
use briefdesk_core::types::DbId;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::{env_or, ConfigError};

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Session,
    Reset,
}

/// JWT claims embedded in every token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: DbId,
    pub email: String,
    pub role: Role,
    pub purpose: TokenPurpose,
    /// Password-hash fingerprint (reset tokens only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Why a token was rejected.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token is invalid: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Session token lifetime in days (default: 7).
    pub session_expiry_days: i64,
    /// Password-reset token lifetime in minutes (default: 15).
    pub reset_expiry_mins: i64,
}

const DEFAULT_SESSION_EXPIRY_DAYS: i64 = 7;
const DEFAULT_RESET_EXPIRY_MINS: i64 = 15;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                   | Required | Default |
    /// |---------------------------|----------|---------|
    /// | `JWT_SECRET`              | **yes**  | --      |
    /// | `JWT_SESSION_EXPIRY_DAYS` | no       | `7`     |
    /// | `JWT_RESET_EXPIRY_MINS`   | no       | `15`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            secret,
            session_expiry_days: env_or("JWT_SESSION_EXPIRY_DAYS", DEFAULT_SESSION_EXPIRY_DAYS)?,
            reset_expiry_mins: env_or("JWT_RESET_EXPIRY_MINS", DEFAULT_RESET_EXPIRY_MINS)?,
        })
    }
}

/// Generate a session token for the given user.
pub fn generate_session_token(
    user_id: DbId,
    email: &str,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let lifetime = config.session_expiry_days * 24 * 60 * 60;
    sign(user_id, email, role, TokenPurpose::Session, None, lifetime, config)
}

/// Generate a password-reset token bound to the user's current password hash.
pub fn generate_reset_token(
    user_id: DbId,
    email: &str,
    role: Role,
    password_hash: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let lifetime = config.reset_expiry_mins * 60;
    sign(
        user_id,
        email,
        role,
        TokenPurpose::Reset,
        Some(password_fingerprint(password_hash)),
        lifetime,
        config,
    )
}

/// Validate and decode a token of the expected `purpose`.
///
/// Validates the signature and expiry (with no leeway).
pub fn validate_token(
    token: &str,
    purpose: TokenPurpose,
    config: &JwtConfig,
) -> Result<Claims, TokenError> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?
    .claims;

    if claims.purpose != purpose {
        return Err(TokenError::Invalid("wrong token purpose".into()));
    }
    Ok(claims)
}

/// First 16 hex chars of the SHA-256 of a password hash.
pub fn password_fingerprint(password_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password_hash.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..16].to_string()
}

fn sign(
    user_id: DbId,
    email: &str,
    role: Role,
    purpose: TokenPurpose,
    pwd: Option<String>,
    lifetime_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        purpose,
        pwd,
        exp: now + lifetime_secs,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

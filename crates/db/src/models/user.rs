//! User document and DTOs.

use briefdesk_core::roles::Role;
use briefdesk_core::types::{DbId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Full user document as stored.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] or [`UserInfo`] for external-facing output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    /// Argon2id PHC string. Older data files stored this as `password`.
    #[serde(alias = "password", default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub brand_id: Option<DbId>,
    #[serde(default)]
    pub trial_ends_at: Option<Timestamp>,
    #[serde(default = "Utc::now")]
    pub created_at: Timestamp,
    #[serde(default = "Utc::now")]
    pub updated_at: Timestamp,
}

/// Minimal identity returned alongside auth tokens.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub brand_id: Option<DbId>,
    pub trial_ends_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
            brand_id: user.brand_id,
            trial_ends_at: user.trial_ends_at,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. The email must already be normalized.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub trial_ends_at: Option<Timestamp>,
}

impl User {
    pub(crate) fn new(input: &CreateUser, now: Timestamp) -> Self {
        Self {
            id: briefdesk_core::types::new_id(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            role: input.role,
            brand_id: None,
            trial_ends_at: input.trial_ends_at,
            created_at: now,
            updated_at: now,
        }
    }
}

//! Handler for `/subscription`: the caller's plan and trial state.

use axum::extract::State;
use axum::Json;
use briefdesk_core::error::CoreError;
use briefdesk_core::roles::Role;
use briefdesk_core::subscription::{can_create_projects, Subscription};
use briefdesk_core::types::Timestamp;
use briefdesk_db::repositories::{BrandRepo, UserRepo};
use chrono::Utc;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatusResponse {
    pub subscription: Option<Subscription>,
    pub trial_ends_at: Option<Timestamp>,
    pub can_create_projects: bool,
}

/// GET /api/subscription
///
/// Staff accounts have no brand, so they report no subscription and cannot
/// create projects.
pub async fn get_status(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
) -> AppResult<Json<SubscriptionStatusResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", auth.user_id))?;

    let subscription = match user.role {
        Role::Brand => BrandRepo::find_for_user(&state.pool, user.id)
            .await?
            .map(|b| b.subscription),
        Role::Staff => None,
    };
    let trial_ends_at = user.trial_ends_at.filter(|_| user.role == Role::Brand);
    let can_create = user.role == Role::Brand
        && can_create_projects(subscription.as_ref(), trial_ends_at, Utc::now());

    Ok(Json(SubscriptionStatusResponse {
        subscription,
        trial_ends_at,
        can_create_projects: can_create,
    }))
}

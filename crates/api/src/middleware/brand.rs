//! Extractors that resolve the caller's brand.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use briefdesk_core::subscription::ensure_can_create_projects;
use briefdesk_db::models::brand::Brand;
use briefdesk_db::repositories::{BrandRepo, UserRepo};

use super::auth::AuthUser;
use super::rbac::RequireBrand;
use crate::error::AppError;
use crate::state::AppState;

/// A brand user together with their brand. 404 when the user has none yet.
pub struct CurrentBrand(pub AuthUser, pub Brand);

impl FromRequestParts<AppState> for CurrentBrand {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireBrand(user) = RequireBrand::from_request_parts(parts, state).await?;
        let brand = BrandRepo::find_for_user(&state.pool, user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No brand found".into()))?;
        Ok(CurrentBrand(user, brand))
    }
}

/// [`CurrentBrand`] that also passes the subscription gate: an active
/// subscription or a running trial. Rejects with 402 otherwise.
pub struct RequirePlan(pub AuthUser, pub Brand);

impl FromRequestParts<AppState> for RequirePlan {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentBrand(user, brand) = CurrentBrand::from_request_parts(parts, state).await?;
        let trial_ends_at = UserRepo::find_by_id(&state.pool, user.user_id)
            .await?
            .and_then(|u| u.trial_ends_at);

        ensure_can_create_projects(Some(&brand.subscription), trial_ends_at, chrono::Utc::now())?;
        Ok(RequirePlan(user, brand))
    }
}

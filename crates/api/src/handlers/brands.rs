//! Handlers for the `/brands` resource: the caller's own brand, its
//! subscription and team, plus the staff overview.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use briefdesk_core::email::{normalize_email, validate_email};
use briefdesk_core::error::CoreError;
use briefdesk_core::roles::MemberRole;
use briefdesk_core::subscription::Subscription;
use briefdesk_core::types::DbId;
use briefdesk_db::models::brand::{Brand, BrandSummary, Member, UpdateBrand};
use briefdesk_db::repositories::BrandRepo;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{ValidJson, ValidPath};
use crate::middleware::brand::CurrentBrand;
use crate::middleware::rbac::{RequireBrand, RequireStaff};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct ActivateSubscriptionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Plan is required"))]
    pub plan: String,
    pub gateway: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default = "default_member_role")]
    pub role: MemberRole,
}

fn default_member_role() -> MemberRole {
    MemberRole::Viewer
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    pub role: MemberRole,
}

#[derive(Debug, Serialize)]
pub struct BrandResponse {
    pub brand: Brand,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub subscription: Subscription,
}

#[derive(Debug, Serialize)]
pub struct BrandListResponse {
    pub brands: Vec<BrandSummary>,
}

// ---------------------------------------------------------------------------
// Brand owner handlers
// ---------------------------------------------------------------------------

/// GET /api/brands/me
pub async fn get_mine(CurrentBrand(_, brand): CurrentBrand) -> Json<BrandResponse> {
    Json(BrandResponse { brand })
}

/// POST /api/brands/onboard
///
/// Merge profile fields into the caller's brand, creating it if needed.
pub async fn onboard(
    State(state): State<AppState>,
    RequireBrand(user): RequireBrand,
    ValidJson(input): ValidJson<UpdateBrand>,
) -> AppResult<Json<BrandResponse>> {
    let brand = BrandRepo::onboard(&state.pool, user.user_id, &input).await?;
    tracing::info!(brand_id = %brand.id, user_id = %user.user_id, "Brand onboarded");
    Ok(Json(BrandResponse { brand }))
}

/// POST /api/brands/subscriptions
pub async fn activate_subscription(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
    ValidJson(input): ValidJson<ActivateSubscriptionRequest>,
) -> AppResult<Json<SubscriptionResponse>> {
    let subscription = Subscription::activate(input.plan, input.gateway, Utc::now());
    let subscription = BrandRepo::set_subscription(&state.pool, brand.id, subscription).await?;

    tracing::info!(brand_id = %brand.id, plan = ?subscription.plan, "Subscription activated");
    Ok(Json(SubscriptionResponse { subscription }))
}

/// POST /api/brands/subscriptions/skip
pub async fn skip_subscription(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
) -> AppResult<Json<SubscriptionResponse>> {
    let subscription =
        BrandRepo::set_subscription(&state.pool, brand.id, Subscription::skipped()).await?;
    Ok(Json(SubscriptionResponse { subscription }))
}

/// POST /api/brands/me/members
pub async fn invite_member(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
    ValidJson(input): ValidJson<InviteMemberRequest>,
) -> AppResult<(StatusCode, Json<BrandResponse>)> {
    let email = normalize_email(&input.email);
    validate_email(&email).map_err(CoreError::Validation)?;

    let member = Member {
        email,
        role: input.role,
    };
    let brand = BrandRepo::add_member(&state.pool, brand.id, member).await?;
    Ok((StatusCode::CREATED, Json(BrandResponse { brand })))
}

/// PUT /api/brands/me/members/{email}
pub async fn update_member(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
    ValidPath(email): ValidPath<String>,
    ValidJson(input): ValidJson<UpdateMemberRequest>,
) -> AppResult<Json<BrandResponse>> {
    let email = normalize_email(&email);
    let brand = BrandRepo::update_member_role(&state.pool, brand.id, &email, input.role).await?;
    Ok(Json(BrandResponse { brand }))
}

/// DELETE /api/brands/me/members/{email}
pub async fn remove_member(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
    ValidPath(email): ValidPath<String>,
) -> AppResult<StatusCode> {
    let email = normalize_email(&email);
    BrandRepo::remove_member(&state.pool, brand.id, &email).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Staff handlers
// ---------------------------------------------------------------------------

/// GET /api/brands/admin (also /admin/all)
pub async fn list_all(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
) -> AppResult<Json<BrandListResponse>> {
    let brands = BrandRepo::list_summaries(&state.pool).await?;
    Ok(Json(BrandListResponse { brands }))
}

/// GET /api/brands/admin/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<Brand>> {
    let brand = BrandRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Brand", id))?;
    Ok(Json(brand))
}

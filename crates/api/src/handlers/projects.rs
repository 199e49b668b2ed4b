//! Handlers for the `/projects` resource.
//!
//! Brand users work on their own brand's projects; staff see every project and
//! drive assignment and delivery. Status changes go through the repository,
//! which applies the lifecycle rules atomically.

use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Json;
use briefdesk_core::analytics::{summarize, AnalyticsSummary, BrandSnapshot, ProjectSnapshot};
use briefdesk_core::email::normalize_email;
use briefdesk_core::error::CoreError;
use briefdesk_core::event_types::{PROJECT_CREATED, PROJECT_STATUS_CHANGED};
use briefdesk_core::project_status::{transition, ProjectAction};
use briefdesk_core::roles::Role;
use briefdesk_core::types::DbId;
use briefdesk_db::models::project::{CreateProject, Project, ProjectFile};
use briefdesk_db::repositories::{BrandRepo, ProjectRepo};
use briefdesk_events::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{FormFiles, OptionalJson, ValidJson, ValidPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::brand::{CurrentBrand, RequirePlan};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct AssignRequest {
    /// Assignee email; defaults to the calling staff member.
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChangesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<ProjectFile>,
}

// ---------------------------------------------------------------------------
// Brand handlers
// ---------------------------------------------------------------------------

/// POST /api/projects
///
/// Requires an active subscription or a running trial.
pub async fn create(
    State(state): State<AppState>,
    RequirePlan(user, brand): RequirePlan,
    ValidJson(input): ValidJson<CreateProject>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    let project = ProjectRepo::create(&state.pool, brand.id, &input).await?;

    tracing::info!(project_id = %project.id, brand_id = %brand.id, "Project created");
    state.event_bus.publish(
        PlatformEvent::new(PROJECT_CREATED)
            .about("project", project.id)
            .by(user.user_id)
            .with_payload(serde_json::json!({ "name": project.name })),
    );

    Ok((StatusCode::CREATED, Json(ProjectResponse { project })))
}

/// GET /api/projects
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
) -> AppResult<Json<ProjectListResponse>> {
    let projects = ProjectRepo::list_by_brand(&state.pool, brand.id).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// GET /api/projects/{id}
pub async fn get_mine(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<ProjectResponse>> {
    let project = ProjectRepo::find_for_brand(&state.pool, id, brand.id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    Ok(Json(ProjectResponse { project }))
}

/// POST /api/projects/{id}/upload
///
/// Multipart `files` (at least one). Returns the project's full file list.
pub async fn upload(
    State(state): State<AppState>,
    CurrentBrand(_, brand): CurrentBrand,
    ValidPath(id): ValidPath<DbId>,
    FormFiles(multipart): FormFiles,
) -> AppResult<Json<FilesResponse>> {
    ProjectRepo::find_for_brand(&state.pool, id, brand.id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;

    let saved = state.uploads.save_multipart(multipart, Role::Brand).await?;
    if saved.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".into()));
    }

    let count = saved.len();
    let files = match ProjectRepo::add_files(&state.pool, id, Some(brand.id), saved.clone()).await
    {
        Ok(files) => files,
        Err(e) => {
            state.uploads.discard(&saved).await;
            return Err(e.into());
        }
    };
    tracing::info!(project_id = %id, count, "Brand uploaded files");

    Ok(Json(FilesResponse { files }))
}

/// POST /api/projects/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    CurrentBrand(user, brand): CurrentBrand,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<ProjectResponse>> {
    let project = ProjectRepo::approve(&state.pool, id, brand.id).await?;
    publish_status_change(&state, &user, &project, ProjectAction::Approve);
    Ok(Json(ProjectResponse { project }))
}

/// POST /api/projects/{id}/changes
pub async fn request_changes(
    State(state): State<AppState>,
    CurrentBrand(user, brand): CurrentBrand,
    ValidPath(id): ValidPath<DbId>,
    OptionalJson(input): OptionalJson<ChangesRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let notes = input.notes.filter(|n| !n.trim().is_empty());
    let project = ProjectRepo::request_changes(&state.pool, id, brand.id, notes).await?;
    publish_status_change(&state, &user, &project, ProjectAction::RequestChanges);
    Ok(Json(ProjectResponse { project }))
}

// ---------------------------------------------------------------------------
// Staff handlers
// ---------------------------------------------------------------------------

/// GET /api/projects/admin/all
pub async fn list_all(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
) -> AppResult<Json<ProjectListResponse>> {
    let projects = ProjectRepo::list_all(&state.pool).await?;
    Ok(Json(ProjectListResponse { projects }))
}

/// GET /api/projects/admin/{id}
pub async fn get_any(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
    ValidPath(id): ValidPath<DbId>,
) -> AppResult<Json<ProjectResponse>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    Ok(Json(ProjectResponse { project }))
}

/// POST /api/projects/admin/{id}/assign
pub async fn assign(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    ValidPath(id): ValidPath<DbId>,
    OptionalJson(input): OptionalJson<AssignRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let assignee = input
        .email
        .map(|e| normalize_email(&e))
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| user.email.clone());

    let project = ProjectRepo::assign(&state.pool, id, &assignee).await?;
    publish_status_change(&state, &user, &project, ProjectAction::Assign);
    Ok(Json(ProjectResponse { project }))
}

/// POST /api/projects/admin/{id}/deliver
///
/// Accepts an optional multipart `files` upload; a request without a
/// multipart body delivers with no new files.
pub async fn deliver(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    ValidPath(id): ValidPath<DbId>,
    req: Request,
) -> AppResult<Json<ProjectResponse>> {
    let current = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", id))?;
    transition(current.status, ProjectAction::Deliver)?;

    let files = if is_multipart(&req) {
        let FormFiles(multipart) = FormFiles::from_request(req, &state).await?;
        state.uploads.save_multipart(multipart, Role::Staff).await?
    } else {
        Vec::new()
    };

    // The status may have moved while the files were streaming in.
    let project = match ProjectRepo::deliver(&state.pool, id, files.clone()).await {
        Ok(project) => project,
        Err(e) => {
            state.uploads.discard(&files).await;
            return Err(e.into());
        }
    };
    publish_status_change(&state, &user, &project, ProjectAction::Deliver);
    Ok(Json(ProjectResponse { project }))
}

/// GET /api/projects/admin-analytics/summary
pub async fn analytics_summary(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
) -> AppResult<Json<AnalyticsSummary>> {
    let brands = BrandRepo::list(&state.pool).await?;
    let projects = ProjectRepo::list_all(&state.pool).await?;

    let brand_rows: Vec<BrandSnapshot> = brands
        .iter()
        .map(|b| BrandSnapshot {
            name: b.business_name.clone().unwrap_or_default(),
            billable: b.subscription.is_billable(),
            project_count: projects.iter().filter(|p| p.brand_id == b.id).count(),
        })
        .collect();
    let project_rows: Vec<ProjectSnapshot> = projects
        .iter()
        .map(|p| ProjectSnapshot {
            status: p.status,
            created_at: p.created_at,
        })
        .collect();

    Ok(Json(summarize(
        &brand_rows,
        &project_rows,
        state.config.plan_monthly_price_usd,
    )))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

fn publish_status_change(
    state: &AppState,
    actor: &AuthUser,
    project: &Project,
    action: ProjectAction,
) {
    state.event_bus.publish(
        PlatformEvent::new(PROJECT_STATUS_CHANGED)
            .about("project", project.id)
            .by(actor.user_id)
            .with_payload(serde_json::json!({
                "action": action.as_str(),
                "status": project.status.to_string(),
            })),
    );
}

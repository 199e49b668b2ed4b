//! Repository for the `projects` collection.
//!
//! Status changes go through [`briefdesk_core::project_status::transition`]
//! inside the store write, so the check and the update are atomic.

use briefdesk_core::error::CoreError;
use briefdesk_core::project_status::{transition, ProjectAction};
use briefdesk_core::types::{DbId, Timestamp};
use chrono::Utc;

use crate::models::project::{ChangeRequest, CreateProject, Project, ProjectFile};
use crate::repositories::{brand_mut, owner_email, project_mut};
use crate::store::{Collections, StoreError};
use crate::DbPool;

/// Restricts a lookup or mutation to one brand's projects.
///
/// `None` means staff access across all brands.
pub type BrandScope = Option<DbId>;

/// Provides CRUD and lifecycle operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new `Pending` project for `brand_id`.
    pub async fn create(
        pool: &DbPool,
        brand_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, StoreError> {
        pool.write(|c| {
            let now = Utc::now();
            let owner_id = brand_mut(c, brand_id)?.owner_id;
            let brand_email = owner_email(c, owner_id).unwrap_or_default();

            let brand = brand_mut(c, brand_id)?;
            let project = Project::new(
                brand_id,
                brand.business_name.clone(),
                brand_email,
                input,
                now,
            );
            brand.record("project.created", Some(project.name.clone()), now);

            c.projects.push(project.clone());
            Ok(project)
        })
        .await
    }

    /// Find a project by id, regardless of brand.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(pool
            .read(|c| c.projects.iter().find(|p| p.id == id).cloned())
            .await)
    }

    /// Find a project by id only if it belongs to `brand_id`.
    pub async fn find_for_brand(
        pool: &DbPool,
        id: DbId,
        brand_id: DbId,
    ) -> Result<Option<Project>, StoreError> {
        Ok(pool
            .read(|c| {
                c.projects
                    .iter()
                    .find(|p| p.id == id && p.brand_id == brand_id)
                    .cloned()
            })
            .await)
    }

    /// List one brand's projects, newest first.
    pub async fn list_by_brand(pool: &DbPool, brand_id: DbId) -> Result<Vec<Project>, StoreError> {
        let mut projects = pool
            .read(|c| {
                c.projects
                    .iter()
                    .filter(|p| p.brand_id == brand_id)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// List every project across all brands, newest first.
    pub async fn list_all(pool: &DbPool) -> Result<Vec<Project>, StoreError> {
        let mut projects = pool.read(|c| c.projects.clone()).await;
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Append uploaded files, returning the project's full file list.
    pub async fn add_files(
        pool: &DbPool,
        id: DbId,
        scope: BrandScope,
        files: Vec<ProjectFile>,
    ) -> Result<Vec<ProjectFile>, StoreError> {
        pool.write(|c| {
            let project = scoped_project_mut(c, id, scope)?;
            project.files.extend(files);
            project.updated_at = Utc::now();
            Ok(project.files.clone())
        })
        .await
    }

    /// Staff takes the project: sets the assignee and moves it to In Progress.
    pub async fn assign(pool: &DbPool, id: DbId, assignee: &str) -> Result<Project, StoreError> {
        apply(pool, id, None, ProjectAction::Assign, |p, _| {
            p.assignee = Some(assignee.to_string());
        })
        .await
    }

    /// Staff hands over the work, attaching any final files.
    pub async fn deliver(
        pool: &DbPool,
        id: DbId,
        files: Vec<ProjectFile>,
    ) -> Result<Project, StoreError> {
        apply(pool, id, None, ProjectAction::Deliver, |p, now| {
            p.files.extend(files);
            p.delivered_at = Some(now);
        })
        .await
    }

    /// Brand accepts a delivery.
    pub async fn approve(pool: &DbPool, id: DbId, brand_id: DbId) -> Result<Project, StoreError> {
        apply(pool, id, Some(brand_id), ProjectAction::Approve, |_, _| {}).await
    }

    /// Brand sends a delivery back with optional notes.
    pub async fn request_changes(
        pool: &DbPool,
        id: DbId,
        brand_id: DbId,
        notes: Option<String>,
    ) -> Result<Project, StoreError> {
        apply(
            pool,
            id,
            Some(brand_id),
            ProjectAction::RequestChanges,
            |p, now| {
                p.change_requests.push(ChangeRequest {
                    notes,
                    requested_at: now,
                });
            },
        )
        .await
    }
}

/// Run `action` against a project: validate the transition, apply `update`,
/// set the new status and log it on the brand.
async fn apply(
    pool: &DbPool,
    id: DbId,
    scope: BrandScope,
    action: ProjectAction,
    update: impl FnOnce(&mut Project, Timestamp),
) -> Result<Project, StoreError> {
    let project = pool
        .write(|c| {
            let now = Utc::now();
            let project = scoped_project_mut(c, id, scope)?;
            let from = project.status;
            let to = transition(from, action)?;

            update(project, now);
            project.status = to;
            project.updated_at = now;
            let project = project.clone();

            if let Ok(brand) = brand_mut(c, project.brand_id) {
                brand.record(
                    "project.status_changed",
                    Some(format!("{}: {from} -> {to}", project.name)),
                    now,
                );
            }
            Ok(project)
        })
        .await?;

    tracing::debug!(
        project_id = %project.id,
        action = action.as_str(),
        status = %project.status,
        "Project transitioned"
    );
    Ok(project)
}

fn scoped_project_mut(
    c: &mut Collections,
    id: DbId,
    scope: BrandScope,
) -> Result<&mut Project, StoreError> {
    let project = project_mut(c, id)?;
    match scope {
        // Other brands' projects are reported as missing, not forbidden.
        Some(brand_id) if project.brand_id != brand_id => {
            Err(CoreError::not_found("Project", id).into())
        }
        _ => Ok(project),
    }
}


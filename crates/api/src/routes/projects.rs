//! Route definitions for the `/projects` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET  /                          -> list_mine (brand)
/// POST /                          -> create (brand, plan gate)
/// GET  /{id}                      -> get_mine (brand)
/// POST /{id}/upload               -> upload (brand, multipart)
/// POST /{id}/approve              -> approve (brand)
/// POST /{id}/changes              -> request_changes (brand)
///
/// GET  /admin/all                 -> list_all (staff)
/// GET  /admin/{id}                -> get_any (staff)
/// POST /admin/{id}/assign         -> assign (staff)
/// POST /admin/{id}/deliver        -> deliver (staff, optional multipart)
/// GET  /admin-analytics/summary   -> analytics_summary (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_mine).post(projects::create))
        .route("/admin/all", get(projects::list_all))
        .route("/admin/{id}", get(projects::get_any))
        .route("/admin/{id}/assign", post(projects::assign))
        .route("/admin/{id}/deliver", post(projects::deliver))
        .route("/admin-analytics/summary", get(projects::analytics_summary))
        .route("/{id}", get(projects::get_mine))
        .route("/{id}/upload", post(projects::upload))
        .route("/{id}/approve", post(projects::approve))
        .route("/{id}/changes", post(projects::request_changes))
}

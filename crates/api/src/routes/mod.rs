pub mod auth;
pub mod brands;
pub mod health;
pub mod projects;
pub mod subscription;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                    store health (public)
///
/// /auth/signup                               brand signup (public)
/// /auth/staff-signup                         staff signup (public)
/// /auth/login                                login (public)
/// /auth/me                                   current user
/// /auth/request-password-reset               email a reset token (public)
/// /auth/reset-password                       set a new password (public)
///
/// /brands/me                                 own brand
/// /brands/onboard                            create / update own brand
/// /brands/subscriptions                      activate plan
/// /brands/subscriptions/skip                 skip plan
/// /brands/me/members                         invite member
/// /brands/me/members/{email}                 change role, remove
/// /brands/admin, /brands/admin/all           staff overview
/// /brands/admin/{id}                         staff brand detail
///
/// /projects                                  list, create (plan gate)
/// /projects/{id}                             get
/// /projects/{id}/upload                      brand files (multipart)
/// /projects/{id}/approve                     Delivered -> Completed
/// /projects/{id}/changes                     Delivered -> In Progress
/// /projects/admin/all                        staff: every project
/// /projects/admin/{id}                       staff: project detail
/// /projects/admin/{id}/assign                staff: -> In Progress
/// /projects/admin/{id}/deliver               staff: -> Delivered
/// /projects/admin-analytics/summary          staff: analytics
///
/// /subscription                              plan and trial state
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/auth", auth::router())
        .nest("/brands", brands::router())
        .nest("/projects", projects::router())
        .nest("/subscription", subscription::router())
}

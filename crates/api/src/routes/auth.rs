//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup                  -> signup (brand)
/// POST /staff-signup            -> staff_signup
/// POST /login                   -> login
/// GET  /me                      -> me (requires auth)
/// POST /request-password-reset  -> request_password_reset
/// POST /reset-password          -> reset_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/staff-signup", post(auth::staff_signup))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/request-password-reset", post(auth::request_password_reset))
        .route("/reset-password", post(auth::reset_password))
}

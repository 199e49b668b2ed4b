//! Route definitions for the `/brands` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::brands;
use crate::state::AppState;

/// Routes mounted at `/brands`.
///
/// ```text
/// GET    /me                     -> get_mine (brand)
/// POST   /onboard                -> onboard (brand)
/// POST   /subscriptions          -> activate_subscription (brand)
/// POST   /subscriptions/skip     -> skip_subscription (brand)
/// POST   /me/members             -> invite_member (brand)
/// PUT    /me/members/{email}     -> update_member (brand)
/// DELETE /me/members/{email}     -> remove_member (brand)
/// GET    /admin                  -> list_all (staff)
/// GET    /admin/all              -> list_all (staff)
/// GET    /admin/{id}             -> get_by_id (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(brands::get_mine))
        .route("/onboard", post(brands::onboard))
        .route("/subscriptions", post(brands::activate_subscription))
        .route("/subscriptions/skip", post(brands::skip_subscription))
        .route("/me/members", post(brands::invite_member))
        .route(
            "/me/members/{email}",
            put(brands::update_member).delete(brands::remove_member),
        )
        .route("/admin", get(brands::list_all))
        .route("/admin/all", get(brands::list_all))
        .route("/admin/{id}", get(brands::get_by_id))
}

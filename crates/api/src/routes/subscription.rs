use axum::routing::get;
use axum::Router;

use crate::handlers::subscription;
use crate::state::AppState;

/// Routes mounted at `/subscription`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(subscription::get_status))
}

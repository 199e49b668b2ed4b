use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use briefdesk_core::types::Timestamp;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Whether the document store is reachable.
    pub ok: bool,
    /// Server time, so clients can spot clock skew.
    pub time: Timestamp,
}

/// GET /api/health -- 200 when the store answers, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ok = match briefdesk_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            false
        }
    };
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(HealthResponse { ok, time: Utc::now() }))
}

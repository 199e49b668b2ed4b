use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use briefdesk_core::error::CoreError;
use briefdesk_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent `{"error", "code"}` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `briefdesk_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the document store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A missing resource described in words rather than by id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

type Classified = (StatusCode, &'static str, String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Store(err) => classify_store_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> Classified {
    match core {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::PaymentRequired(msg) => {
            (StatusCode::PAYMENT_REQUIRED, "PAYMENT_REQUIRED", msg.clone())
        }
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Classify a store error into an HTTP status, error code, and message.
///
/// - Domain rejections map like any other [`CoreError`].
/// - Unique violations map to 409.
/// - I/O and serialization failures map to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> Classified {
    match err {
        StoreError::Domain(core) => classify_core_error(core),
        StoreError::UniqueViolation {
            collection: "users",
            field: "email",
            ..
        } => (
            StatusCode::CONFLICT,
            "CONFLICT",
            "User already exists".to_string(),
        ),
        StoreError::UniqueViolation {
            collection, field, ..
        } => (
            StatusCode::CONFLICT,
            "CONFLICT",
            format!("Duplicate value for {collection}.{field}"),
        ),
        other => {
            tracing::error!(error = %other, "Store error");
            internal()
        }
    }
}

fn internal() -> Classified {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_required_maps_to_402() {
        let resp = AppError::Core(CoreError::PaymentRequired("pay".into())).into_response();
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    }

    #[test]
    fn duplicate_email_maps_to_409() {
        let err = StoreError::UniqueViolation {
            collection: "users",
            field: "email",
            value: "a@b.co".into(),
        };
        let (status, code, msg) = classify_store_error(&err);
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "CONFLICT");
        assert_eq!(msg, "User already exists");
    }

    #[test]
    fn io_failures_are_sanitized() {
        let err = StoreError::Io {
            path: "/secret/db.json".into(),
            source: std::io::Error::other("disk on fire"),
        };
        let (status, _, msg) = classify_store_error(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!msg.contains("secret"));
    }

    #[test]
    fn domain_errors_inside_store_errors_keep_their_status() {
        let err = StoreError::Domain(CoreError::Conflict("nope".into()));
        assert_eq!(classify_store_error(&err).0, StatusCode::CONFLICT);
    }
}

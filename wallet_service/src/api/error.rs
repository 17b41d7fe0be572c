use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use common::error::{DomainError, ErrorKind};
use serde_json::json;

/// One envelope for every handler's error path. Each domain error already
/// knows its `ErrorKind` (§7); this only maps that kind to a status code.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Auth => StatusCode::UNAUTHORIZED,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::ProviderUnavailable => StatusCode::BAD_GATEWAY,
        ErrorKind::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E: DomainError> From<E> for ApiError {
    fn from(err: E) -> Self {
        let status = status_for(err.kind());
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            err.to_string()
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

/// `IdempotentCallError<E>` isn't itself a `DomainError` (its `Handler`
/// variant wraps any `E`), so it gets its own conversion that dispatches on
/// which side failed.
impl<E> From<crate::domain::error::IdempotentCallError<E>> for ApiError
where
    E: std::fmt::Debug + DomainError,
{
    fn from(err: crate::domain::error::IdempotentCallError<E>) -> Self {
        match err {
            crate::domain::error::IdempotentCallError::Idempotency(e) => e.into(),
            crate::domain::error::IdempotentCallError::Handler(e) => e.into(),
        }
    }
}

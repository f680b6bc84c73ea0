//! HTTP mapping for application errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use jobledger_shared::AppError;

/// Handler error: any domain error that converts into [`AppError`].
///
/// Renders `{ "error": CODE, "message": text }` with the matching status.
/// Server-side failures are logged and their detail is not sent to the client.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = if err.is_client_error() {
            warn!(code = err.error_code(), error = %err, "Request rejected");
            err.to_string()
        } else if matches!(err, AppError::Unavailable(_)) {
            err.to_string()
        } else {
            error!(code = err.error_code(), error = %err, "Request failed");
            "An internal error occurred".to_string()
        };

        (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

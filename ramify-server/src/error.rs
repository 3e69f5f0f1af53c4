//! Conversion of relay errors into the JSON error envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ramify_core::{ErrorBody, RelayError};
use tracing::{error, warn};

/// Handler-boundary wrapper turning a [`RelayError`] into the uniform
/// `{"success":false,"error":...,"message":...}` envelope.
///
/// Validation failures answer 400, everything else 500. Callers never see a
/// bare string or a stack trace.
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, message) = match self.0 {
            RelayError::Validation(message) => {
                warn!("rejected request: {message}");
                (
                    StatusCode::BAD_REQUEST,
                    "missing required parameter",
                    message,
                )
            }
            other => {
                error!("request failed: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error",
                    other.to_string(),
                )
            }
        };

        (status, Json(ErrorBody::new(label, message))).into_response()
    }
}

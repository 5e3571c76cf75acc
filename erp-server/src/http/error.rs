//! Domain error to HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use erp_common::CoreError;
use serde_json::json;
use tracing::error;

/// Wrapper giving [`CoreError`] an HTTP representation.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            CoreError::AlreadyExists { .. }
            | CoreError::Validation(_)
            | CoreError::InsufficientStock { .. }
            | CoreError::InvalidTransition(_)
            | CoreError::InvalidStatus => StatusCode::BAD_REQUEST,
            CoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
        }

        // storage details stay out of responses
        let message = if matches!(self.0, CoreError::Storage(_)) {
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn status_classes() {
        assert_eq!(
            status_of(CoreError::not_found("Order", "x")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoreError::already_exists("Client", "x")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::validation("bad")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::InsufficientStock {
                product: "p".into(),
                requested: 2,
                available: 1,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoreError::InvalidTransition("no".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(CoreError::InvalidStatus), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CoreError::unauthorized("no")),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_of(CoreError::forbidden("no")), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(CoreError::storage("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

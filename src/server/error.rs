use crate::utils::error::GramsError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

impl IntoResponse for GramsError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GramsError::InvalidInput { .. } | GramsError::InvalidPolygon { .. } => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT")
            }
            GramsError::NoUsableInput { .. } => (StatusCode::BAD_GATEWAY, "NO_USABLE_INPUT"),
            GramsError::UpstreamUnavailable { .. } | GramsError::Api(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Internal error");
            "An internal error occurred".to_string()
        } else {
            self.user_friendly_message()
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

//! API error types with flat JSON bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Request-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("No JSON provided")]
    NoJson,
    #[error("Missing fields")]
    MissingFields(Vec<&'static str>),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NoJson => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
            ApiError::MissingFields(missing) => {
                tracing::info!(?missing, "Rejected request with missing fields");
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": self.to_string(), "missing": missing }),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": detail }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

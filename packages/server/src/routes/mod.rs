pub mod agents;
pub mod health;
pub mod tasks;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Error payload shape shared by every route.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn not_found(detail: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: detail.to_string(),
        }),
    )
}

pub fn internal_error(error: impl std::fmt::Display) -> ApiError {
    tracing::error!(error = %error, "Request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            detail: "Internal server error".to_string(),
        }),
    )
}

//! Mapping of application errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use switchboard_core::AppError;

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Handler error. Caller mistakes become 400, everything else 500.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn detail(&self) -> String {
        match &self.0 {
            AppError::InvalidInput(message) => message.clone(),
            other => internal_detail(other),
        }
    }
}

/// Detail text for an unexpected failure.
pub fn internal_detail(err: impl std::fmt::Display) -> String {
    format!("An internal server error occurred: {}", err)
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Rejected request: {}", self.0);
        }

        (status, Json(ErrorBody { detail: self.detail() })).into_response()
    }
}

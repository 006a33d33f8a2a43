//! HTTP mapping for service errors.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pmo_core::PmoError;
use serde_json::json;

/// Error returned by every handler. Renders as `{"error": "..."}`.
#[derive(Debug)]
pub enum AppError {
    Core(PmoError),
    /// Request body or query string could not be decoded.
    Rejected { status: StatusCode, message: String },
}

impl From<PmoError> for AppError {
    fn from(e: PmoError) -> Self {
        Self::Core(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(e) => {
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Rejected { status, .. } => *status,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Core(e) => {
                if status.is_server_error() {
                    tracing::error!(error = %e, "request failed");
                }
                e.to_string()
            }
            Self::Rejected { message, .. } => message,
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

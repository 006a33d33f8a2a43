//! GET /api/ and GET /api/health

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Extension, Json};
use pmo_core::RecordService;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Projekt-Reporting-App API" }))
}

/// Ping the store. 503 when it does not answer.
pub async fn health(
    Extension(service): Extension<Arc<RecordService>>,
) -> (StatusCode, Json<Value>) {
    let store = service.store();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "store": store.backend() })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "store": store.backend(),
                    "error": e.to_string(),
                })),
            )
        }
    }
}

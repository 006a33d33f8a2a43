//! GET, PUT and DELETE on /api/projects/:id

use std::sync::Arc;

use axum::extract::Path;
use axum::{Extension, Json};
use pmo_core::types::{NewProject, Project};
use pmo_core::RecordService;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::extract::AppJson;

pub async fn get(
    Extension(service): Extension<Arc<RecordService>>,
    Path(id): Path<String>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(service.get::<Project>(&id).await?))
}

/// Full replacement. The stored date is reset to now.
pub async fn replace(
    Extension(service): Extension<Arc<RecordService>>,
    Path(id): Path<String>,
    AppJson(input): AppJson<NewProject>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(service.replace(&id, input).await?))
}

pub async fn delete(
    Extension(service): Extension<Arc<RecordService>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    service.delete::<Project>(&id).await?;
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

//! POST and GET on the collection routes, shared by every record kind.

use std::sync::Arc;

use axum::{Extension, Json};
use pmo_core::{NewRecord, Record, RecordService};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::{AppJson, AppQuery};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectScope {
    pub project_id: Option<String>,
}

pub async fn create<N>(
    Extension(service): Extension<Arc<RecordService>>,
    AppJson(input): AppJson<N>,
) -> Result<Json<N::Record>, AppError>
where
    N: NewRecord + DeserializeOwned + 'static,
{
    Ok(Json(service.create(input).await?))
}

/// Records in storage order. `?project_id=` narrows child kinds to one project.
pub async fn list<R: Record>(
    Extension(service): Extension<Arc<RecordService>>,
    AppQuery(scope): AppQuery<ProjectScope>,
) -> Result<Json<Vec<R>>, AppError> {
    Ok(Json(service.list(scope.project_id.as_deref()).await?))
}

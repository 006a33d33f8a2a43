//! Router construction for the reporting API.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::{Extension, Router};
use pmo_core::types::{
    BudgetLine, ChangeRequest, Milestone, NewBudgetLine, NewChangeRequest, NewMilestone,
    NewProject, NewRisk, NewTask, Project, Risk, Task,
};
use pmo_core::RecordService;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsOrigins;
use crate::handlers::{health, projects, records};

/// Build the full axum router with all routes and middleware.
pub fn build_router(service: Arc<RecordService>, cors: &CorsOrigins) -> Router {
    Router::new()
        .route("/api", get(health::root))
        .route("/api/", get(health::root))
        .route("/api/health", get(health::health))
        .route(
            "/api/projects",
            get(records::list::<Project>).post(records::create::<NewProject>),
        )
        .route(
            "/api/projects/:id",
            get(projects::get)
                .put(projects::replace)
                .delete(projects::delete),
        )
        .route(
            "/api/milestones",
            get(records::list::<Milestone>).post(records::create::<NewMilestone>),
        )
        .route(
            "/api/budget",
            get(records::list::<BudgetLine>).post(records::create::<NewBudgetLine>),
        )
        .route(
            "/api/risks",
            get(records::list::<Risk>).post(records::create::<NewRisk>),
        )
        .route(
            "/api/tasks",
            get(records::list::<Task>).post(records::create::<NewTask>),
        )
        .route(
            "/api/changes",
            get(records::list::<ChangeRequest>).post(records::create::<NewChangeRequest>),
        )
        .layer(Extension(service))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
}

/// Credentialed CORS. Wildcards are not allowed together with credentials,
/// so "any" mirrors the request instead.
pub fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let allow_origin = match origins {
        CorsOrigins::Any => AllowOrigin::mirror_request(),
        CorsOrigins::List(list) => AllowOrigin::list(
            list.iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect::<Vec<_>>(),
        ),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

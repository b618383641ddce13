use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::AppState;
use crate::handlers::analysis_history::MessageResponse;
use crate::middleware::CurrentUser;
use crate::services::ledger::{NewProject, Project, ProjectUpdate};
use crate::utils::{ApiError, ApiResult};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    /// Editor nodes/edges as a JSON string
    pub diagram_data: Option<String>,
}

/// Fields left out keep their stored value
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub diagram_data: Option<String>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectListQuery {
    #[validate(range(min = 0))]
    pub skip: Option<i64>,
    /// Page size, 1..=100 (default 100)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid project name")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    req.validate()?;

    let project = state
        .ledger
        .create_project(
            user.user_id,
            NewProject {
                name: req.name.trim().to_string(),
                description: req.description,
                diagram_data: req.diagram_data,
            },
        )
        .await?;

    tracing::info!("User {} created project {} ({})", user.user_id, project.id, project.name);
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "Caller's projects with analysis counters", body = Vec<Project>),
        (status = 400, description = "Invalid paging parameters")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ProjectListQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    query.validate()?;

    let projects = state
        .ledger
        .list_projects(user.user_id, query.skip.unwrap_or(0), query.limit.unwrap_or(100))
        .await?;
    Ok(Json(projects))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project with analysis counters", body = Project),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Project>> {
    let project = state.ledger.get_project(user.user_id, id).await?;
    Ok(Json(project))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 400, description = "Invalid project name"),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate()?;

    let project = state
        .ledger
        .update_project(
            user.user_id,
            id,
            ProjectUpdate {
                name: req.name.map(|name| name.trim().to_string()),
                description: req.description,
                diagram_data: req.diagram_data,
            },
        )
        .await?;

    tracing::info!("User {} updated project {}", user.user_id, id);
    Ok(Json(project))
}

/// Deletes the project together with its analysis history
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(
        ("id" = i64, Path, description = "Project ID")
    ),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 404, description = "Project not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Projects"
)]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.ledger.delete_project(user.user_id, id).await? {
        return Err(ApiError::not_found("Project not found"));
    }

    tracing::info!("User {} deleted project {}", user.user_id, id);
    Ok(Json(MessageResponse { message: "Project deleted".to_string() }))
}

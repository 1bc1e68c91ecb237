//! Project API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateProjectRequest, Project, UpdateProjectRequest};
use crate::AppState;

/// GET /api/projects - List all projects.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    match state.repo.list_projects().await {
        Ok(projects) => success(projects),
        Err(e) => error(e),
    }
}

/// GET /api/projects/:id - Get a single project.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    match state.repo.get_project(&id).await {
        Ok(Some(project)) => success(project),
        Ok(None) => error(AppError::NotFound(format!("Project {} not found", id))),
        Err(e) => error(e),
    }
}

/// POST /api/projects - Create a new project.
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<Project> {
    // Validate required fields
    if request.name.trim().is_empty() {
        return error(AppError::Validation("Name is required".to_string()));
    }

    match state.repo.create_project(&request).await {
        Ok(project) => success(project),
        Err(e) => error(e),
    }
}

/// PUT /api/projects/:id - Update a project.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> ApiResult<Project> {
    match state.repo.update_project(&id, &request).await {
        Ok(project) => success(project),
        Err(e) => error(e),
    }
}

/// DELETE /api/projects/:id - Delete a project.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    match state.repo.delete_project(&id).await {
        Ok(()) => success(()),
        Err(e) => error(e),
    }
}

//! Team API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateTeamRequest, Team, UpdateTeamRequest};
use crate::AppState;

/// GET /api/teams - List all teams.
pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Vec<Team>> {
    match state.repo.list_teams().await {
        Ok(teams) => success(teams),
        Err(e) => error(e),
    }
}

/// GET /api/teams/:id - Get a single team.
pub async fn get_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Team> {
    match state.repo.get_team(&id).await {
        Ok(Some(team)) => success(team),
        Ok(None) => error(AppError::NotFound(format!("Team {} not found", id))),
        Err(e) => error(e),
    }
}

/// POST /api/teams - Create a new team.
pub async fn create_team(
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> ApiResult<Team> {
    // Validate required fields
    if request.name.trim().is_empty() {
        return error(AppError::Validation("Name is required".to_string()));
    }

    match state.repo.create_team(&request).await {
        Ok(team) => success(team),
        Err(e) => error(e),
    }
}

/// PUT /api/teams/:id - Update a team.
pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateTeamRequest>,
) -> ApiResult<Team> {
    match state.repo.update_team(&id, &request).await {
        Ok(team) => success(team),
        Err(e) => error(e),
    }
}

/// DELETE /api/teams/:id - Delete a team.
pub async fn delete_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    match state.repo.delete_team(&id).await {
        Ok(()) => success(()),
        Err(e) => error(e),
    }
}

//! Client API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Client, CreateClientRequest, UpdateClientRequest};
use crate::AppState;

/// GET /api/clients - List all clients.
pub async fn list_clients(State(state): State<AppState>) -> ApiResult<Vec<Client>> {
    match state.repo.list_clients().await {
        Ok(clients) => success(clients),
        Err(e) => error(e),
    }
}

/// GET /api/clients/:id - Get a single client.
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Client> {
    match state.repo.get_client(&id).await {
        Ok(Some(client)) => success(client),
        Ok(None) => error(AppError::NotFound(format!("Client {} not found", id))),
        Err(e) => error(e),
    }
}

/// POST /api/clients - Create a new client.
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> ApiResult<Client> {
    // Validate required fields
    if request.name.trim().is_empty() {
        return error(AppError::Validation("Name is required".to_string()));
    }

    match state.repo.create_client(&request).await {
        Ok(client) => success(client),
        Err(e) => error(e),
    }
}

/// PUT /api/clients/:id - Update a client.
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateClientRequest>,
) -> ApiResult<Client> {
    match state.repo.update_client(&id, &request).await {
        Ok(client) => success(client),
        Err(e) => error(e),
    }
}

/// DELETE /api/clients/:id - Delete a client.
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    match state.repo.delete_client(&id).await {
        Ok(()) => success(()),
        Err(e) => error(e),
    }
}

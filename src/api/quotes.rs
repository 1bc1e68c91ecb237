//! Quote API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateQuoteRequest, Quote, UpdateQuoteRequest};
use crate::AppState;

/// GET /api/quotes - List all quotes.
pub async fn list_quotes(State(state): State<AppState>) -> ApiResult<Vec<Quote>> {
    match state.repo.list_quotes().await {
        Ok(quotes) => success(quotes),
        Err(e) => error(e),
    }
}

/// GET /api/quotes/:id - Get a single quote.
pub async fn get_quote(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Quote> {
    match state.repo.get_quote(&id).await {
        Ok(Some(quote)) => success(quote),
        Ok(None) => error(AppError::NotFound(format!("Quote {} not found", id))),
        Err(e) => error(e),
    }
}

/// POST /api/quotes - Create a new quote.
pub async fn create_quote(
    State(state): State<AppState>,
    Json(request): Json<CreateQuoteRequest>,
) -> ApiResult<Quote> {
    // Validate required fields
    if request.project_name.trim().is_empty() {
        return error(AppError::Validation("Project name is required".to_string()));
    }

    match state.repo.create_quote(&request).await {
        Ok(quote) => success(quote),
        Err(e) => error(e),
    }
}

/// PUT /api/quotes/:id - Update a quote.
pub async fn update_quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuoteRequest>,
) -> ApiResult<Quote> {
    match state.repo.update_quote(&id, &request).await {
        Ok(quote) => success(quote),
        Err(e) => error(e),
    }
}

/// DELETE /api/quotes/:id - Delete a quote.
pub async fn delete_quote(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    match state.repo.delete_quote(&id).await {
        Ok(()) => success(()),
        Err(e) => error(e),
    }
}

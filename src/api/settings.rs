//! Company settings API endpoints.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{CompanySettings, SaveSettingsRequest};
use crate::AppState;

/// GET /api/settings - Get the company settings.
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<CompanySettings> {
    match state.repo.get_settings().await {
        Ok(Some(settings)) => success(settings),
        Ok(None) => error(AppError::NotFound("Company settings not saved yet".to_string())),
        Err(e) => error(e),
    }
}

/// PUT /api/settings - Save the company settings (upsert).
pub async fn save_settings(
    State(state): State<AppState>,
    Json(request): Json<SaveSettingsRequest>,
) -> ApiResult<CompanySettings> {
    match state.repo.save_settings(&request).await {
        Ok(settings) => success(settings),
        Err(e) => error(e),
    }
}

//! Backup and restore API endpoints.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::backup::RestoreReport;
use crate::errors::AppError;
use crate::models::{
    BackupEntry, CreateBackupRequest, RestoreBackupRequest, RestoreUploadRequest,
};
use crate::AppState;

/// Backup list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListBackupsQuery {
    /// Maximum number of entries; clamped to the configured cap.
    pub limit: Option<i64>,
}

/// POST /api/backups - Export collections into a new backup.
///
/// Without a body (or without `includedTables`) everything is backed up.
pub async fn create_backup(
    State(state): State<AppState>,
    request: Option<Json<CreateBackupRequest>>,
) -> ApiResult<BackupEntry> {
    let included_tables = request.and_then(|Json(r)| r.included_tables);

    if let Some(tables) = &included_tables {
        if tables.is_empty() {
            return error(AppError::Validation(
                "includedTables must name at least one collection".to_string(),
            ));
        }
    }

    match state.backups.create_backup(included_tables).await {
        Ok(entry) => success(entry),
        Err(e) => error(e),
    }
}

/// GET /api/backups - List backup history, most recent first.
pub async fn list_backups(
    State(state): State<AppState>,
    Query(params): Query<ListBackupsQuery>,
) -> ApiResult<Vec<BackupEntry>> {
    match state.backups.list_backups(params.limit).await {
        Ok(entries) => success(entries),
        Err(e) => error(e),
    }
}

/// GET /api/backups/:id/download - Serve a snapshot as a JSON file.
pub async fn download_backup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let download = state.backups.download_backup(&id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.filename),
        )
        .body(Body::from(download.body))
        .map_err(|e| AppError::Internal(format!("Failed to build download response: {}", e)))
}

/// DELETE /api/backups/:id - Delete a backup history entry.
pub async fn delete_backup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    match state.backups.delete_backup(&id).await {
        Ok(()) => success(()),
        // A retried delete finds nothing; that is still a success for the caller
        Err(AppError::NotFound(_)) => success(()),
        Err(e) => error(e),
    }
}

/// POST /api/backups/:id/restore - Restore from a stored backup.
pub async fn restore_backup(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Option<Json<RestoreBackupRequest>>,
) -> ApiResult<RestoreReport> {
    let confirm = request.map(|Json(r)| r.confirm).unwrap_or(false);

    match state.backups.restore_from_history(&id, confirm).await {
        Ok(report) => success(report),
        Err(e) => error(e),
    }
}

/// POST /api/backups/restore - Restore from an uploaded backup file.
pub async fn restore_upload(
    State(state): State<AppState>,
    Json(request): Json<RestoreUploadRequest>,
) -> ApiResult<RestoreReport> {
    let Some(snapshot) = request.snapshot else {
        return error(AppError::Validation(
            "A snapshot document is required".to_string(),
        ));
    };

    match state
        .backups
        .restore_from_upload(&snapshot, request.confirm)
        .await
    {
        Ok(report) => success(report),
        Err(e) => error(e),
    }
}

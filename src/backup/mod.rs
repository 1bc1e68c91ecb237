//! Backup and restore subsystem.
//!
//! Exports walk the live collections into a versioned snapshot document and
//! record it in history; restores replace live collections from a snapshot,
//! normalizing rows on the way back in. One service instance coordinates
//! both and refuses to run them concurrently.

mod history;
mod normalize;
mod restore;
mod snapshot;
mod store;

pub use history::{BackupDownload, HistoryStore};
pub use normalize::{generate_quote_id, normalize_record, normalize_rows};
pub use restore::{run_restore, RestoreOptions, RestoreReport, RestoreStatus, TableOutcome};
pub use snapshot::{
    build_snapshot, default_included_tables, Snapshot, COLLECTION_TABLES, SETTINGS_DATA_KEY,
    SETTINGS_TABLE, SNAPSHOT_VERSION,
};
pub use store::RecordStore;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::BackupEntry;

/// Entry point for everything under `/api/backups`.
#[derive(Clone)]
pub struct BackupService {
    store: Arc<dyn RecordStore>,
    history: HistoryStore,
    run_lock: Arc<Mutex<()>>,
}

impl BackupService {
    pub fn new(repo: Repository, history_limit: i64) -> Self {
        Self {
            store: Arc::new(repo.clone()),
            history: HistoryStore::new(repo, history_limit),
            run_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Export the requested collections and record the result in history.
    pub async fn create_backup(
        &self,
        included_tables: Option<Vec<String>>,
    ) -> Result<BackupEntry, AppError> {
        let _guard = self.acquire_run()?;
        let tables = included_tables.unwrap_or_else(default_included_tables);

        tracing::info!(tables = ?tables, "creating backup");
        let snapshot = build_snapshot(self.store.as_ref(), &tables).await?;
        let entry = self.history.save(&snapshot, &tables).await?;
        tracing::info!(backup_id = %entry.id, file_size = entry.file_size, "backup created");

        Ok(entry)
    }

    /// Backup history, most recent first.
    pub async fn list_backups(&self, limit: Option<i64>) -> Result<Vec<BackupEntry>, AppError> {
        self.history.list(limit).await
    }

    /// Snapshot payload prepared for download.
    pub async fn download_backup(&self, id: &str) -> Result<BackupDownload, AppError> {
        self.history.download(id).await
    }

    /// Remove a history entry.
    pub async fn delete_backup(&self, id: &str) -> Result<(), AppError> {
        self.history.delete(id).await
    }

    /// Restore from a stored history entry. The collection list recorded at
    /// export time decides what gets replaced.
    pub async fn restore_from_history(
        &self,
        id: &str,
        confirm: bool,
    ) -> Result<RestoreReport, AppError> {
        let _guard = self.acquire_run()?;
        let (entry, snapshot) = self.history.load_snapshot(id).await?;

        tracing::info!(backup_id = %entry.id, name = %entry.name, "restoring from history");
        let options = RestoreOptions {
            confirm,
            included_tables: Some(entry.included_tables),
        };
        run_restore(self.store.as_ref(), &snapshot, &options).await
    }

    /// Restore from an uploaded snapshot document.
    pub async fn restore_from_upload(
        &self,
        snapshot: &Value,
        confirm: bool,
    ) -> Result<RestoreReport, AppError> {
        let _guard = self.acquire_run()?;

        tracing::info!("restoring from uploaded file");
        let options = RestoreOptions {
            confirm,
            included_tables: None,
        };
        run_restore(self.store.as_ref(), snapshot, &options).await
    }

    /// Exports and restores are destructive enough to never overlap; a
    /// second caller gets a busy error instead of waiting.
    fn acquire_run(&self) -> Result<tokio::sync::OwnedMutexGuard<()>, AppError> {
        self.run_lock.clone().try_lock_owned().map_err(|_| {
            AppError::Conflict("A backup or restore operation is already in progress".to_string())
        })
    }
}

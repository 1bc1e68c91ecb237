//! Persistence of completed backups.
//!
//! Every successful export becomes one immutable history row holding the
//! serialized snapshot; entries are only ever listed, downloaded, loaded
//! for restore, or deleted.

use chrono::Utc;
use serde_json::Value;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::BackupEntry;

use super::snapshot::Snapshot;

/// A snapshot prepared for file download.
#[derive(Debug, Clone)]
pub struct BackupDownload {
    pub filename: String,
    pub body: String,
}

/// History operations over the backup_history table.
#[derive(Clone)]
pub struct HistoryStore {
    repo: Repository,
    limit: i64,
}

impl HistoryStore {
    pub fn new(repo: Repository, limit: i64) -> Self {
        Self { repo, limit }
    }

    /// Persist a completed snapshot as a new history entry.
    ///
    /// The recorded size is the compact serialization; the name is derived
    /// from the current date. Nothing is written if serialization or the
    /// insert fails.
    pub async fn save(
        &self,
        snapshot: &Snapshot,
        included_tables: &[String],
    ) -> Result<BackupEntry, AppError> {
        let payload = serde_json::to_string(snapshot)?;

        let entry = BackupEntry {
            id: uuid::Uuid::new_v4().to_string(),
            name: format!("backup-{}", Utc::now().format("%Y-%m-%d")),
            created_at: snapshot.timestamp.clone(),
            file_size: payload.len() as i64,
            included_tables: included_tables.to_vec(),
            version: snapshot.version.clone(),
        };

        self.repo.insert_backup_entry(&entry, &payload).await?;
        Ok(entry)
    }

    /// Most recent entries first. Callers may ask for fewer than the
    /// configured cap, never for more.
    pub async fn list(&self, requested: Option<i64>) -> Result<Vec<BackupEntry>, AppError> {
        let limit = requested
            .filter(|n| *n > 0)
            .map_or(self.limit, |n| n.min(self.limit));
        self.repo.list_backup_entries(limit).await
    }

    /// Pretty-printed snapshot plus the filename to serve it under.
    pub async fn download(&self, id: &str) -> Result<BackupDownload, AppError> {
        let entry = self
            .repo
            .get_backup_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", id)))?;
        let payload = self
            .repo
            .get_backup_payload(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", id)))?;

        let snapshot: Value = serde_json::from_str(&payload)
            .map_err(|e| AppError::Internal(format!("Stored backup {} is unreadable: {}", id, e)))?;

        Ok(BackupDownload {
            filename: format!("{}.json", entry.name),
            body: serde_json::to_string_pretty(&snapshot)?,
        })
    }

    /// Load an entry and its parsed snapshot for a restore run.
    pub async fn load_snapshot(&self, id: &str) -> Result<(BackupEntry, Value), AppError> {
        let entry = self
            .repo
            .get_backup_entry(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", id)))?;
        let payload = self
            .repo
            .get_backup_payload(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Backup {} not found", id)))?;

        let snapshot: Value = serde_json::from_str(&payload)
            .map_err(|e| AppError::Internal(format!("Stored backup {} is unreadable: {}", id, e)))?;

        Ok((entry, snapshot))
    }

    /// Delete an entry. Missing ids surface as NotFound; callers decide
    /// whether that matters.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.repo.delete_backup_entry(id).await
    }
}

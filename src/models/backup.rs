//! Backup history models and request bodies for the backup endpoints.

use serde::{Deserialize, Serialize};

/// A backup history entry as returned by the API.
///
/// The snapshot payload itself is only reachable through the download
/// endpoint; list responses stay small.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupEntry {
    pub id: String,
    pub name: String,
    pub created_at: String,
    /// Byte length of the compact-serialized snapshot
    pub file_size: i64,
    pub included_tables: Vec<String>,
    pub version: String,
}

/// Request body for creating a backup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupRequest {
    /// Collections to include; defaults to all of them
    #[serde(default)]
    pub included_tables: Option<Vec<String>>,
}

/// Request body for restoring a backup from history.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreBackupRequest {
    /// Destructive restores require explicit confirmation
    #[serde(default)]
    pub confirm: bool,
}

/// Request body for restoring from an uploaded snapshot file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreUploadRequest {
    #[serde(default)]
    pub confirm: bool,
    /// The parsed contents of the backup file
    #[serde(default)]
    pub snapshot: Option<serde_json::Value>,
}

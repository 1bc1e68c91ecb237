//! Storage seam used by the snapshot builder and the restore engine.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AppError;

/// Row-level access to the persisted collections.
///
/// Rows travel as JSON objects keyed by the snake_case column names, the
/// same shape they take inside a snapshot document. The company settings
/// singleton has its own accessors because it is a single record, not a
/// row collection.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every row of a collection.
    async fn select_all(&self, table: &str) -> Result<Vec<Value>, AppError>;

    /// Remove every row of a collection.
    async fn delete_all(&self, table: &str) -> Result<(), AppError>;

    /// Bulk-insert normalized rows into a collection.
    async fn insert_rows(&self, table: &str, rows: &[Value]) -> Result<(), AppError>;

    /// Count the rows currently in a collection.
    async fn count_rows(&self, table: &str) -> Result<i64, AppError>;

    /// Fetch the company settings singleton, if saved.
    async fn fetch_settings(&self) -> Result<Option<Value>, AppError>;

    /// Replace the company settings singleton.
    async fn replace_settings(&self, settings: &Value) -> Result<(), AppError>;
}

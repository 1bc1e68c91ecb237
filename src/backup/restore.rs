//! Restore engine: replaces live collections with snapshot contents.
//!
//! A run walks `Validate -> Confirm -> per-collection replace -> Settings ->
//! Done`. Validation failures abort before anything is touched. Once past
//! confirmation the run is best-effort: each collection is deleted,
//! normalized and reinserted independently, and a failure in one is logged
//! and reported without stopping the others. There is no rollback.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

use super::normalize::{normalize_record, normalize_rows};
use super::snapshot::{COLLECTION_TABLES, SETTINGS_DATA_KEY, SETTINGS_TABLE};
use super::store::RecordStore;

/// How a restore run should behave.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    /// Explicit operator confirmation; without it the run aborts untouched.
    pub confirm: bool,
    /// Authoritative collection list recorded at export time. `None` for
    /// uploaded files, where the list is derived from the data keys.
    pub included_tables: Option<Vec<String>>,
}

/// Terminal state of one collection within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreStatus {
    Restored,
    Failed,
    Skipped,
}

/// Per-collection result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOutcome {
    pub table: String,
    pub status: RestoreStatus,
    pub rows_in_snapshot: i64,
    /// Row count observed after the insert, for operator review
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows_verified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableOutcome {
    fn restored(table: &str, rows_in_snapshot: i64, rows_verified: Option<i64>) -> Self {
        Self {
            table: table.to_string(),
            status: RestoreStatus::Restored,
            rows_in_snapshot,
            rows_verified,
            error: None,
        }
    }

    fn failed(table: &str, rows_in_snapshot: i64, error: String) -> Self {
        Self {
            table: table.to_string(),
            status: RestoreStatus::Failed,
            rows_in_snapshot,
            rows_verified: None,
            error: Some(error),
        }
    }

    fn skipped(table: &str, reason: &str) -> Self {
        Self {
            table: table.to_string(),
            status: RestoreStatus::Skipped,
            rows_in_snapshot: 0,
            rows_verified: None,
            error: Some(reason.to_string()),
        }
    }
}

/// Machine-readable result of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub version: String,
    pub timestamp: String,
    pub tables: Vec<TableOutcome>,
    pub settings_restored: bool,
}

/// Run a restore against an untrusted snapshot document.
///
/// Returns an error only when the run never started: the snapshot failed
/// validation or confirmation was withheld. Everything after that is
/// captured in the report.
pub async fn run_restore(
    store: &dyn RecordStore,
    snapshot: &Value,
    options: &RestoreOptions,
) -> Result<RestoreReport, AppError> {
    let version = snapshot
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("Backup file has no version field".to_string()))?
        .to_string();
    let data = snapshot
        .get("data")
        .and_then(Value::as_object)
        .ok_or_else(|| AppError::Validation("Backup file has no data object".to_string()))?;
    let timestamp = snapshot
        .get("timestamp")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();

    if !options.confirm {
        return Err(AppError::ConfirmationRequired {
            timestamp,
            version,
        });
    }

    let tables = match &options.included_tables {
        Some(list) => list.clone(),
        None => derive_included_tables(data),
    };

    tracing::info!(version = %version, tables = ?tables, "starting restore");

    let mut outcomes = Vec::with_capacity(tables.len());
    let mut settings_restored = false;

    for table in &tables {
        if table == SETTINGS_TABLE {
            let (outcome, restored) = restore_settings(store, data).await;
            settings_restored = restored;
            outcomes.push(outcome);
        } else {
            outcomes.push(restore_table(store, table, data).await);
        }
    }

    let failed = outcomes
        .iter()
        .filter(|o| o.status == RestoreStatus::Failed)
        .count();
    tracing::info!(
        restored = outcomes.len() - failed,
        failed,
        settings_restored,
        "restore finished"
    );

    Ok(RestoreReport {
        version,
        timestamp,
        tables: outcomes,
        settings_restored,
    })
}

/// Collections an uploaded file restores: its data keys, in canonical order.
fn derive_included_tables(data: &Map<String, Value>) -> Vec<String> {
    let mut tables: Vec<String> = COLLECTION_TABLES
        .iter()
        .filter(|t| data.contains_key(**t))
        .map(|t| t.to_string())
        .collect();
    if data.contains_key(SETTINGS_DATA_KEY) {
        tables.push(SETTINGS_TABLE.to_string());
    }
    tables
}

/// Replace one row collection. Never propagates; failures become the
/// outcome and the run moves on.
async fn restore_table(store: &dyn RecordStore, table: &str, data: &Map<String, Value>) -> TableOutcome {
    let Some(value) = data.get(table) else {
        // Listed at export time but absent from data: live rows stay put.
        tracing::warn!(table, "listed in backup but missing from data, skipping");
        return TableOutcome::skipped(table, "not present in backup data");
    };
    let Some(rows) = value.as_array() else {
        tracing::error!(table, "backup data for table is not an array");
        return TableOutcome::failed(table, 0, "backup data is not an array".to_string());
    };
    let rows_in_snapshot = rows.len() as i64;

    if let Err(err) = store.delete_all(table).await {
        tracing::error!(table, error = %err, "failed to clear table, leaving it untouched");
        return TableOutcome::failed(table, rows_in_snapshot, err.message());
    }

    let prepared = prepare_rows(rows, table);
    if let Err(err) = store.insert_rows(table, &prepared).await {
        tracing::error!(table, error = %err, "failed to insert rows");
        return TableOutcome::failed(table, rows_in_snapshot, err.message());
    }

    let rows_verified = match store.count_rows(table).await {
        Ok(n) => {
            if n != rows_in_snapshot {
                tracing::warn!(table, expected = rows_in_snapshot, actual = n, "row count mismatch after restore");
            }
            Some(n)
        }
        Err(err) => {
            tracing::warn!(table, error = %err, "could not verify row count");
            None
        }
    };

    TableOutcome::restored(table, rows_in_snapshot, rows_verified)
}

/// Normalize snapshot rows and make them insertable: server-managed
/// timestamps are regenerated at insert, and every row needs a primary key.
fn prepare_rows(rows: &[Value], table: &str) -> Vec<Value> {
    normalize_rows(rows, table)
        .into_iter()
        .map(|mut row| {
            if let Some(obj) = row.as_object_mut() {
                obj.remove("created_at");
                obj.remove("updated_at");
                let has_id = obj
                    .get("id")
                    .and_then(Value::as_str)
                    .map_or(false, |s| !s.is_empty());
                if !has_id {
                    obj.insert(
                        "id".to_string(),
                        Value::String(uuid::Uuid::new_v4().to_string()),
                    );
                }
            }
            row
        })
        .collect()
}

async fn restore_settings(store: &dyn RecordStore, data: &Map<String, Value>) -> (TableOutcome, bool) {
    let Some(value) = data.get(SETTINGS_DATA_KEY) else {
        return (
            TableOutcome::skipped(SETTINGS_TABLE, "not present in backup data"),
            false,
        );
    };
    if !value.is_object() {
        tracing::error!("backup settings record is not an object");
        return (
            TableOutcome::failed(SETTINGS_TABLE, 0, "settings record is not an object".to_string()),
            false,
        );
    }

    let mut settings = normalize_record(value, SETTINGS_TABLE);
    if let Some(obj) = settings.as_object_mut() {
        obj.remove("created_at");
        obj.remove("updated_at");
    }

    match store.replace_settings(&settings).await {
        Ok(()) => (TableOutcome::restored(SETTINGS_TABLE, 1, Some(1)), true),
        Err(err) => {
            tracing::error!(error = %err, "failed to restore company settings");
            (TableOutcome::failed(SETTINGS_TABLE, 1, err.message()), false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::store::testing::MemoryStore;
    use super::*;
    use serde_json::json;

    fn confirmed() -> RestoreOptions {
        RestoreOptions {
            confirm: true,
            included_tables: None,
        }
    }

    fn snapshot_with(data: Value) -> Value {
        json!({
            "version": "1.0.0",
            "timestamp": "2026-02-01T09:00:00+00:00",
            "data": data,
        })
    }

    #[tokio::test]
    async fn test_restored_counts_match_snapshot() {
        let store = MemoryStore::new();
        let snapshot = snapshot_with(json!({
            "clients": [
                { "name": "Acme", "totalProjectsValue": "1500.50" },
                { "name": "Jensen" },
            ],
            "teams": [{ "name": "Crew A" }],
        }));

        let report = run_restore(&store, &snapshot, &confirmed()).await.unwrap();

        assert_eq!(report.tables.len(), 2);
        for outcome in &report.tables {
            assert_eq!(outcome.status, RestoreStatus::Restored);
            assert_eq!(outcome.rows_verified, Some(outcome.rows_in_snapshot));
        }
        assert_eq!(store.rows("clients").len(), 2);
        assert_eq!(store.rows("teams").len(), 1);

        // Rows landed normalized, with generated ids and no stale timestamps
        let acme = &store.rows("clients")[0];
        assert_eq!(acme["total_projects_value"], 1500.5);
        assert!(!acme["id"].as_str().unwrap().is_empty());
        assert!(acme.get("created_at").is_none());
    }

    #[tokio::test]
    async fn test_absent_data_key_leaves_collection_alone() {
        let store = MemoryStore::new().with_rows("quotes", vec![json!({ "id": "QT-1" })]);
        let snapshot = snapshot_with(json!({ "clients": [] }));

        let report = run_restore(&store, &snapshot, &confirmed()).await.unwrap();

        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].table, "clients");
        assert_eq!(store.rows("quotes").len(), 1);
    }

    #[tokio::test]
    async fn test_failure_in_one_collection_does_not_stop_the_next() {
        let store = MemoryStore::new()
            .failing_insert("clients")
            .with_rows("projects", vec![json!({ "id": "old" })]);
        let snapshot = snapshot_with(json!({
            "clients": [{ "name": "Acme" }],
            "projects": [{ "name": "North Ridge" }, { "name": "South Lot" }],
        }));

        let report = run_restore(&store, &snapshot, &confirmed()).await.unwrap();

        let clients = report.tables.iter().find(|o| o.table == "clients").unwrap();
        assert_eq!(clients.status, RestoreStatus::Failed);
        assert!(clients.error.is_some());

        let projects = report.tables.iter().find(|o| o.table == "projects").unwrap();
        assert_eq!(projects.status, RestoreStatus::Restored);
        assert_eq!(store.rows("projects").len(), 2);
    }

    #[tokio::test]
    async fn test_delete_failure_abandons_collection_before_insert() {
        let store = MemoryStore::new()
            .failing_delete("teams")
            .with_rows("teams", vec![json!({ "id": "t-1" })]);
        let snapshot = snapshot_with(json!({ "teams": [{ "name": "Crew B" }] }));

        let report = run_restore(&store, &snapshot, &confirmed()).await.unwrap();

        assert_eq!(report.tables[0].status, RestoreStatus::Failed);
        // The old row survives because the clear itself failed
        assert_eq!(store.rows("teams"), vec![json!({ "id": "t-1" })]);
    }

    #[tokio::test]
    async fn test_missing_version_aborts_without_mutation() {
        let store = MemoryStore::new().with_rows("clients", vec![json!({ "id": "keep" })]);
        let snapshot = json!({ "data": { "clients": [] } });

        let result = run_restore(&store, &snapshot, &confirmed()).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.rows("clients").len(), 1);
    }

    #[tokio::test]
    async fn test_missing_data_aborts_without_mutation() {
        let store = MemoryStore::new().with_rows("clients", vec![json!({ "id": "keep" })]);

        for bad in [json!({ "version": "1.0.0" }), json!({ "foo": "bar" })] {
            let result = run_restore(&store, &bad, &confirmed()).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert_eq!(store.rows("clients").len(), 1);
    }

    #[tokio::test]
    async fn test_unconfirmed_run_reports_snapshot_identity() {
        let store = MemoryStore::new().with_rows("clients", vec![json!({ "id": "keep" })]);
        let snapshot = snapshot_with(json!({ "clients": [] }));
        let options = RestoreOptions {
            confirm: false,
            included_tables: None,
        };

        let result = run_restore(&store, &snapshot, &options).await;

        match result {
            Err(AppError::ConfirmationRequired { timestamp, version }) => {
                assert_eq!(timestamp, "2026-02-01T09:00:00+00:00");
                assert_eq!(version, "1.0.0");
            }
            other => panic!("expected confirmation error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(store.rows("clients").len(), 1);
    }

    #[tokio::test]
    async fn test_included_tables_list_is_authoritative() {
        let store = MemoryStore::new()
            .with_rows("clients", vec![json!({ "id": "keep" })])
            .with_rows("projects", vec![json!({ "id": "replace-me" })]);
        // Data carries clients too, but the recorded list says projects only
        let snapshot = snapshot_with(json!({
            "clients": [{ "name": "New" }],
            "projects": [{ "name": "P1" }],
        }));
        let options = RestoreOptions {
            confirm: true,
            included_tables: Some(vec!["projects".to_string()]),
        };

        let report = run_restore(&store, &snapshot, &options).await.unwrap();

        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].table, "projects");
        assert_eq!(store.rows("clients")[0]["id"], "keep");
    }

    #[tokio::test]
    async fn test_listed_but_absent_table_is_skipped_untouched() {
        let store = MemoryStore::new().with_rows("quotes", vec![json!({ "id": "QT-1" })]);
        let snapshot = snapshot_with(json!({}));
        let options = RestoreOptions {
            confirm: true,
            included_tables: Some(vec!["quotes".to_string()]),
        };

        let report = run_restore(&store, &snapshot, &options).await.unwrap();

        assert_eq!(report.tables[0].status, RestoreStatus::Skipped);
        assert_eq!(store.rows("quotes").len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_listed_table_fails_and_continues() {
        let store = MemoryStore::new();
        let snapshot = snapshot_with(json!({
            "invoices": [{ "id": 1 }],
            "clients": [{ "name": "Acme" }],
        }));
        let options = RestoreOptions {
            confirm: true,
            included_tables: Some(vec!["invoices".to_string(), "clients".to_string()]),
        };

        let report = run_restore(&store, &snapshot, &options).await.unwrap();

        let invoices = report.tables.iter().find(|o| o.table == "invoices").unwrap();
        assert_eq!(invoices.status, RestoreStatus::Failed);
        let clients = report.tables.iter().find(|o| o.table == "clients").unwrap();
        assert_eq!(clients.status, RestoreStatus::Restored);
    }

    #[tokio::test]
    async fn test_settings_restored_and_normalized() {
        let store = MemoryStore::new();
        let snapshot = snapshot_with(json!({
            "companySettings": { "companyName": "SidingOps LLC", "taxRate": "7.5" },
        }));

        let report = run_restore(&store, &snapshot, &confirmed()).await.unwrap();

        assert!(report.settings_restored);
        let saved = store.settings.lock().unwrap().clone().unwrap();
        assert_eq!(saved["company_name"], "SidingOps LLC");
        assert_eq!(saved["tax_rate"], 7.5);
    }

    #[tokio::test]
    async fn test_settings_failure_does_not_block_completion() {
        let mut store = MemoryStore::new();
        store.fail_settings = true;
        let snapshot = snapshot_with(json!({
            "clients": [{ "name": "Acme" }],
            "companySettings": { "companyName": "SidingOps" },
        }));

        let report = run_restore(&store, &snapshot, &confirmed()).await.unwrap();

        assert!(!report.settings_restored);
        let clients = report.tables.iter().find(|o| o.table == "clients").unwrap();
        assert_eq!(clients.status, RestoreStatus::Restored);
    }

    #[tokio::test]
    async fn test_quote_rows_get_generated_ids() {
        let store = MemoryStore::new();
        let snapshot = snapshot_with(json!({
            "quotes": [{ "projectName": "Re-side", "totalAmount": "8200.00" }],
        }));

        let report = run_restore(&store, &snapshot, &confirmed()).await.unwrap();

        assert_eq!(report.tables[0].status, RestoreStatus::Restored);
        let quote = &store.rows("quotes")[0];
        assert!(quote["id"].as_str().unwrap().starts_with("QT-"));
        assert_eq!(quote["total_amount"], 8200.0);
    }
}

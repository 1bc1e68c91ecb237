//! Snapshot document format and the export builder.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

use super::store::RecordStore;

/// Schema version written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Row collections, in canonical processing order.
pub const COLLECTION_TABLES: [&str; 4] = ["clients", "projects", "teams", "quotes"];

/// Table name of the company settings singleton.
pub const SETTINGS_TABLE: &str = "company_settings";

/// Key the settings record travels under inside `data`. Kept camelCase for
/// compatibility with every backup file written so far.
pub const SETTINGS_DATA_KEY: &str = "companySettings";

/// Everything included in a full backup.
pub fn default_included_tables() -> Vec<String> {
    COLLECTION_TABLES
        .iter()
        .map(|t| t.to_string())
        .chain(std::iter::once(SETTINGS_TABLE.to_string()))
        .collect()
}

/// A complete backup document.
///
/// `data` holds one key per included collection: row collections under
/// their table names, the settings record under `companySettings`. A
/// collection that was not part of the backup has no key at all, which
/// restore treats as "leave the live data alone".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub timestamp: String,
    pub data: Map<String, Value>,
}

/// Export the requested collections into a snapshot.
///
/// Strict by design: any fetch failure fails the whole export so a partial
/// document is never written. An empty collection still gets its key, with
/// an empty array, so restore knows it was included.
pub async fn build_snapshot(
    store: &dyn RecordStore,
    tables: &[String],
) -> Result<Snapshot, AppError> {
    let mut data = Map::new();

    for table in tables {
        if table == SETTINGS_TABLE {
            if let Some(settings) = store.fetch_settings().await? {
                data.insert(SETTINGS_DATA_KEY.to_string(), settings);
            }
            continue;
        }

        let rows = store.select_all(table).await?;
        data.insert(table.clone(), Value::Array(rows));
    }

    Ok(Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        timestamp: Utc::now().to_rfc3339(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::super::store::testing::MemoryStore;
    use super::*;
    use serde_json::json;

    fn tables(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_only_requested_collections_get_keys() {
        let store = MemoryStore::new()
            .with_rows("clients", vec![json!({ "id": "c-1" }), json!({ "id": "c-2" })])
            .with_rows("teams", vec![json!({ "id": "t-1" })]);

        let snapshot = build_snapshot(&store, &tables(&["clients", "projects"]))
            .await
            .unwrap();

        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.data["clients"].as_array().unwrap().len(), 2);
        // Included but empty: key present with an empty array
        assert_eq!(snapshot.data["projects"].as_array().unwrap().len(), 0);
        // Not requested: no key at all
        assert!(!snapshot.data.contains_key("teams"));
        assert!(!snapshot.data.contains_key("quotes"));
    }

    #[tokio::test]
    async fn test_settings_key_omitted_until_saved() {
        let store = MemoryStore::new();
        let snapshot = build_snapshot(&store, &tables(&["company_settings"]))
            .await
            .unwrap();
        assert!(!snapshot.data.contains_key(SETTINGS_DATA_KEY));

        let store = MemoryStore::new();
        *store.settings.lock().unwrap() = Some(json!({ "company_name": "SidingOps" }));
        let snapshot = build_snapshot(&store, &tables(&["company_settings"]))
            .await
            .unwrap();
        assert_eq!(
            snapshot.data[SETTINGS_DATA_KEY]["company_name"],
            "SidingOps"
        );
    }

    #[tokio::test]
    async fn test_unknown_table_fails_whole_export() {
        let store = MemoryStore::new().with_rows("clients", vec![json!({ "id": "c-1" })]);
        let result = build_snapshot(&store, &tables(&["clients", "invoices"])).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_serializes_with_stable_keys() {
        let mut data = Map::new();
        data.insert("clients".to_string(), json!([]));
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: "2026-01-15T08:00:00+00:00".to_string(),
            data,
        };

        let text = serde_json::to_string(&snapshot).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["version"], "1.0.0");
        assert_eq!(parsed["timestamp"], "2026-01-15T08:00:00+00:00");
        assert!(parsed["data"]["clients"].is_array());
    }
}

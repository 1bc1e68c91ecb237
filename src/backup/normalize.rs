//! Field normalization for snapshot rows.
//!
//! Backup files written over the life of the product carry several
//! generations of field names (camelCase exports, legacy shorthands) and
//! loosely typed values (string-encoded numbers, datetime strings in date
//! fields). Before rows are reinserted, each one is rewritten to the
//! canonical snake_case field set of its collection with typed defaults for
//! anything missing or uncoercible. Normalization is pure and idempotent;
//! running it twice yields the same record.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// Value shape of a canonical field.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Required text, defaults to ""
    Text,
    /// Optional text, defaults to null
    OptText,
    /// Monetary or fractional amount, defaults to 0.0
    Currency,
    /// Whole number, defaults to 0
    Count,
    /// Calendar date as YYYY-MM-DD, defaults to null
    DateOnly,
    /// JSON array, defaults to []
    List,
}

/// One canonical field with the legacy names it may arrive under.
struct FieldSpec {
    canonical: &'static str,
    aliases: &'static [&'static str],
    kind: FieldKind,
}

const CLIENT_FIELDS: &[FieldSpec] = &[
    FieldSpec { canonical: "id", aliases: &[], kind: FieldKind::OptText },
    FieldSpec { canonical: "name", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "email", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "phone", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "address", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "status", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "preferred_contact", aliases: &["preferredContact"], kind: FieldKind::Text },
    FieldSpec { canonical: "total_projects_value", aliases: &["totalProjectsValue"], kind: FieldKind::Currency },
    FieldSpec { canonical: "last_contact", aliases: &["lastContact"], kind: FieldKind::DateOnly },
];

const PROJECT_FIELDS: &[FieldSpec] = &[
    FieldSpec { canonical: "id", aliases: &[], kind: FieldKind::OptText },
    FieldSpec { canonical: "name", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "client_id", aliases: &["clientId"], kind: FieldKind::OptText },
    FieldSpec { canonical: "client_name", aliases: &["clientName", "client"], kind: FieldKind::Text },
    FieldSpec { canonical: "address", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "status", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "progress", aliases: &[], kind: FieldKind::Count },
    FieldSpec { canonical: "budget", aliases: &[], kind: FieldKind::Currency },
    FieldSpec { canonical: "spent", aliases: &[], kind: FieldKind::Currency },
    FieldSpec { canonical: "due_date", aliases: &["dueDate"], kind: FieldKind::DateOnly },
    FieldSpec { canonical: "start_date", aliases: &["startDate"], kind: FieldKind::DateOnly },
    FieldSpec { canonical: "team", aliases: &[], kind: FieldKind::List },
];

const TEAM_FIELDS: &[FieldSpec] = &[
    FieldSpec { canonical: "id", aliases: &[], kind: FieldKind::OptText },
    FieldSpec { canonical: "name", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "availability", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "specialties", aliases: &[], kind: FieldKind::List },
    FieldSpec { canonical: "members", aliases: &[], kind: FieldKind::List },
    FieldSpec { canonical: "safety", aliases: &[], kind: FieldKind::Count },
    FieldSpec { canonical: "quality", aliases: &[], kind: FieldKind::Count },
    FieldSpec { canonical: "efficiency", aliases: &[], kind: FieldKind::Count },
    FieldSpec { canonical: "current_project", aliases: &["currentProject"], kind: FieldKind::OptText },
];

const QUOTE_FIELDS: &[FieldSpec] = &[
    FieldSpec { canonical: "id", aliases: &[], kind: FieldKind::OptText },
    FieldSpec { canonical: "client_id", aliases: &["clientId"], kind: FieldKind::OptText },
    FieldSpec { canonical: "project_name", aliases: &["projectName"], kind: FieldKind::Text },
    FieldSpec { canonical: "status", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "total_amount", aliases: &["totalAmount"], kind: FieldKind::Currency },
    FieldSpec { canonical: "valid_until", aliases: &["validUntil"], kind: FieldKind::DateOnly },
    FieldSpec { canonical: "items", aliases: &[], kind: FieldKind::List },
];

const SETTINGS_FIELDS: &[FieldSpec] = &[
    FieldSpec { canonical: "id", aliases: &[], kind: FieldKind::OptText },
    FieldSpec { canonical: "company_name", aliases: &["companyName"], kind: FieldKind::Text },
    FieldSpec { canonical: "email", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "phone", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "address", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "currency", aliases: &[], kind: FieldKind::Text },
    FieldSpec { canonical: "tax_rate", aliases: &["taxRate"], kind: FieldKind::Currency },
];

fn field_specs(table: &str) -> Option<&'static [FieldSpec]> {
    match table {
        "clients" => Some(CLIENT_FIELDS),
        "projects" => Some(PROJECT_FIELDS),
        "teams" => Some(TEAM_FIELDS),
        "quotes" => Some(QUOTE_FIELDS),
        "company_settings" => Some(SETTINGS_FIELDS),
        _ => None,
    }
}

/// Normalize every row of a collection. Rows of an unrecognized collection
/// are returned unchanged.
pub fn normalize_rows(rows: &[Value], table: &str) -> Vec<Value> {
    if field_specs(table).is_none() {
        return rows.to_vec();
    }
    rows.iter().map(|row| normalize_record(row, table)).collect()
}

/// Normalize a single record to the canonical field set of its collection.
pub fn normalize_record(record: &Value, table: &str) -> Value {
    let Some(specs) = field_specs(table) else {
        return record.clone();
    };

    let empty = Map::new();
    let source = record.as_object().unwrap_or(&empty);

    let mut out = Map::with_capacity(specs.len());
    for spec in specs {
        out.insert(spec.canonical.to_string(), coerce(lookup(source, spec), spec.kind));
    }

    // Quotes must always leave with a usable primary key.
    if table == "quotes" {
        let missing = out
            .get("id")
            .and_then(Value::as_str)
            .map_or(true, str::is_empty);
        if missing {
            out.insert("id".to_string(), Value::String(generate_quote_id()));
        }
    }

    Value::Object(out)
}

/// Generate a quote identifier: time-ordered with a random suffix.
pub fn generate_quote_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("QT-{}-{}", Utc::now().timestamp_millis(), &suffix[..6])
}

/// Pick the value for a field: the canonical key first, then each alias in
/// order. Null values count as absent.
fn lookup<'a>(source: &'a Map<String, Value>, spec: &FieldSpec) -> Option<&'a Value> {
    std::iter::once(spec.canonical)
        .chain(spec.aliases.iter().copied())
        .filter_map(|key| source.get(key))
        .find(|value| !value.is_null())
}

fn coerce(raw: Option<&Value>, kind: FieldKind) -> Value {
    match kind {
        FieldKind::Text => Value::String(coerce_text(raw)),
        FieldKind::OptText => raw
            .and_then(Value::as_str)
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null),
        FieldKind::Currency => Value::from(coerce_f64(raw)),
        FieldKind::Count => Value::from(coerce_i64(raw)),
        FieldKind::DateOnly => coerce_date(raw),
        FieldKind::List => match raw {
            Some(v) if v.is_array() => v.clone(),
            _ => Value::Array(Vec::new()),
        },
    }
}

fn coerce_text(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn coerce_f64(raw: Option<&Value>) -> f64 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn coerce_i64(raw: Option<&Value>) -> i64 {
    match raw {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let t = s.trim();
            t.parse::<i64>()
                .ok()
                .or_else(|| t.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn coerce_date(raw: Option<&Value>) -> Value {
    let parsed = match raw {
        Some(Value::String(s)) => parse_date_str(s),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|v| v as i64))
            .and_then(date_from_epoch_millis),
        _ => None,
    };
    parsed.map(Value::String).unwrap_or(Value::Null)
}

fn parse_date_str(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(t, "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date().format("%Y-%m-%d").to_string());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date().format("%Y-%m-%d").to_string());
    }
    None
}

fn date_from_epoch_millis(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_input_empty_output() {
        for table in ["clients", "projects", "teams", "quotes"] {
            assert!(normalize_rows(&[], table).is_empty());
        }
    }

    #[test]
    fn test_partial_client_gets_typed_defaults() {
        let normalized = normalize_record(&json!({ "name": "Acme Exteriors" }), "clients");

        assert_eq!(normalized["name"], "Acme Exteriors");
        assert_eq!(normalized["email"], "");
        assert_eq!(normalized["status"], "");
        assert_eq!(normalized["total_projects_value"], 0.0);
        assert_eq!(normalized["last_contact"], Value::Null);
        assert_eq!(normalized["id"], Value::Null);
    }

    #[test]
    fn test_canonical_name_beats_alias() {
        let normalized = normalize_record(
            &json!({ "preferred_contact": "phone", "preferredContact": "email" }),
            "clients",
        );

        assert_eq!(normalized["preferred_contact"], "phone");
    }

    #[test]
    fn test_alias_is_picked_up() {
        let normalized = normalize_record(
            &json!({ "clientId": "c-1", "projectName": "North Ridge Residing", "totalAmount": 8200 }),
            "quotes",
        );

        assert_eq!(normalized["client_id"], "c-1");
        assert_eq!(normalized["project_name"], "North Ridge Residing");
        assert_eq!(normalized["total_amount"], 8200.0);
    }

    #[test]
    fn test_project_legacy_client_alias() {
        let normalized = normalize_record(&json!({ "client": "Jensen" }), "projects");
        assert_eq!(normalized["client_name"], "Jensen");

        // clientName takes precedence over the older shorthand
        let normalized = normalize_record(
            &json!({ "client": "Jensen", "clientName": "Jensen Family" }),
            "projects",
        );
        assert_eq!(normalized["client_name"], "Jensen Family");
    }

    #[test]
    fn test_string_encoded_number_is_parsed() {
        let normalized = normalize_record(
            &json!({ "name": "Acme", "totalProjectsValue": "1500.50" }),
            "clients",
        );

        assert_eq!(normalized["total_projects_value"], 1500.5);
    }

    #[test]
    fn test_unparseable_number_defaults_without_nan() {
        for bad in [json!("not a number"), json!("NaN"), json!({}), json!([1])] {
            let normalized =
                normalize_record(&json!({ "totalProjectsValue": bad }), "clients");
            assert_eq!(normalized["total_projects_value"], 0.0);
        }
    }

    #[test]
    fn test_count_coercion_truncates() {
        let normalized = normalize_record(&json!({ "progress": "75" }), "projects");
        assert_eq!(normalized["progress"], 75);

        let normalized = normalize_record(&json!({ "progress": 82.9 }), "projects");
        assert_eq!(normalized["progress"], 82);
    }

    #[test]
    fn test_date_forms() {
        let normalized = normalize_record(&json!({ "dueDate": "2024-06-01" }), "projects");
        assert_eq!(normalized["due_date"], "2024-06-01");

        let normalized =
            normalize_record(&json!({ "dueDate": "2024-06-01T10:30:00Z" }), "projects");
        assert_eq!(normalized["due_date"], "2024-06-01");

        let normalized = normalize_record(&json!({ "dueDate": 1717200000000i64 }), "projects");
        assert_eq!(normalized["due_date"], "2024-06-01");

        let normalized = normalize_record(&json!({ "dueDate": "sometime soon" }), "projects");
        assert_eq!(normalized["due_date"], Value::Null);
    }

    #[test]
    fn test_list_defaults_to_empty_array() {
        let normalized = normalize_record(&json!({ "name": "Crew A" }), "teams");
        assert_eq!(normalized["members"], json!([]));
        assert_eq!(normalized["specialties"], json!([]));

        let normalized = normalize_record(&json!({ "team": "not a list" }), "projects");
        assert_eq!(normalized["team"], json!([]));
    }

    #[test]
    fn test_quote_id_generated_when_missing() {
        let normalized = normalize_record(&json!({ "projectName": "Re-side" }), "quotes");
        let id = normalized["id"].as_str().unwrap();
        assert!(id.starts_with("QT-"));
        assert!(id.len() > 10);

        let normalized = normalize_record(&json!({ "id": "QT-keep-me" }), "quotes");
        assert_eq!(normalized["id"], "QT-keep-me");
    }

    #[test]
    fn test_quote_ids_are_distinct() {
        let a = generate_quote_id();
        let b = generate_quote_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_collection_passes_through() {
        let rows = vec![json!({ "anything": ["goes", 1, null] })];
        assert_eq!(normalize_rows(&rows, "invoices"), rows);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let rows = vec![
            json!({
                "name": "Jensen Residence",
                "clientId": "c-9",
                "budget": "24000",
                "dueDate": "2024-09-15T00:00:00Z",
                "team": ["Miguel", "Dana"],
            }),
            json!({}),
        ];

        let once = normalize_rows(&rows, "projects");
        let twice = normalize_rows(&once, "projects");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_settings_aliases() {
        let normalized = normalize_record(
            &json!({ "companyName": "SidingOps LLC", "taxRate": "7.5" }),
            "company_settings",
        );

        assert_eq!(normalized["company_name"], "SidingOps LLC");
        assert_eq!(normalized["tax_rate"], 7.5);
    }

    #[test]
    fn test_non_object_row_becomes_defaults() {
        let normalized = normalize_record(&json!("just a string"), "clients");
        assert!(normalized.is_object());
        assert_eq!(normalized["name"], "");
    }
}

//! Purpose: JSON serializers for CLI command output.
//! Exports: `table_json`, `load_report_json`, `registry_row_json`.
//! Role: Keep output envelope shapes consistent across commands.
//! Invariants: Stable key names; `rows` is emitted only when requested.

use serde_json::{Map, Value, json};
use tableset::api::{Error, LoadReport, RegistryRow, Table};

pub(crate) fn registry_row_json(row: &RegistryRow) -> Value {
    serde_json::to_value(row).unwrap_or_else(|_| json!({ "name": row.name }))
}

pub(crate) fn load_report_json(report: &LoadReport) -> Value {
    json!({
        "table": report.table,
        "rows": report.rows,
        "columns": report.columns,
    })
}

pub(crate) fn table_json(table: &Table<'_>, limit: Option<usize>) -> Result<Value, Error> {
    let mut map = Map::new();
    map.insert("table".to_string(), json!(table.name()));
    map.insert("count".to_string(), json!(table.count()?));
    map.insert("columns".to_string(), json!(table.columns()?));
    let rows = match limit {
        Some(limit) => table.head(limit)?,
        None => table.rows()?,
    };
    map.insert("rows".to_string(), json!(rows));
    Ok(Value::Object(map))
}

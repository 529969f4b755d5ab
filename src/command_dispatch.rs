//! Purpose: Hold top-level CLI command dispatch for `tableset`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command emits one JSON document on success.

use super::*;
use crate::table_json::{load_report_json, registry_row_json, table_json};

pub(super) fn dispatch_command(command: Command, tableset: &Tableset) -> Result<RunOutcome, Error> {
    match command {
        Command::Load {
            name,
            path,
            no_header,
        } => {
            let report = tableset.load_with_report(&name, &path, !no_header)?;
            emit_json(load_report_json(&report));
            Ok(RunOutcome::ok())
        }
        Command::Import { name } => {
            let table = tableset.import(&name)?;
            let registry = tableset
                .registry_row(table.name())?
                .map(|row| registry_row_json(&row))
                .unwrap_or(Value::Null);
            emit_json(json!({ "table": table.name(), "registry": registry }));
            Ok(RunOutcome::ok())
        }
        Command::Select {
            sql,
            no_reuse,
            show,
            limit,
        } => {
            let materialized = tableset.materialize(&sql, !no_reuse)?;
            let mut value = json!({
                "table": materialized.name,
                "signature": materialized.signature,
                "reused": materialized.reused,
            });
            if show {
                let table = tableset.table(&materialized.name);
                value["result"] = table_json(&table, limit)?;
            }
            emit_json(value);
            Ok(RunOutcome::ok())
        }
        Command::CloneTable { name, show } => {
            let table = tableset.clone(&name)?;
            let mut value = json!({ "table": table.name(), "original": name });
            if show {
                value["result"] = table_json(&table, None)?;
            }
            emit_json(value);
            Ok(RunOutcome::ok())
        }
        Command::Rename { name, new_name } => {
            let table = tableset.rename(&name, &new_name)?;
            emit_json(json!({ "table": table.name(), "from": name }));
            Ok(RunOutcome::ok())
        }
        Command::DropTables { names } => {
            for name in &names {
                tableset.drop(name)?;
            }
            emit_json(json!({ "dropped": names }));
            Ok(RunOutcome::ok())
        }
        Command::List => {
            let mut tables = Vec::new();
            for row in tableset.list()? {
                let mut value = registry_row_json(&row);
                value["live"] = json!(tableset.exists(&row.name)?);
                tables.push(value);
            }
            emit_json(json!({ "tables": tables }));
            Ok(RunOutcome::ok())
        }
        Command::Show { name, limit } => {
            let table = tableset.table(&name);
            if !table.exists()? {
                return Err(Error::new(ErrorKind::NotFound)
                    .with_message("no such table")
                    .with_table(name)
                    .with_hint("Use `tableset list` to see registered tables."));
            }
            emit_json(table_json(&table, limit)?);
            Ok(RunOutcome::ok())
        }
        Command::Exec { sql } => {
            tableset.execute(&sql)?;
            emit_json(json!({ "ok": true }));
            Ok(RunOutcome::ok())
        }
    }
}

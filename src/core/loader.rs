//! Purpose: Load delimited text files into typed tables through a staging table.
//! Exports: `load`, `LoadOptions`, `LoadReport`, `SchemaColumn`, `staging_name`.
//! Role: Bulk loader used by `Tableset::load`; sniffs types then inserts in one transaction.
//! Invariants: Readers never see a partially populated table under the final name.
//! Invariants: On failure before publish the final table is untouched and staging is dropped.
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use rusqlite::types::Null;
use serde::Serialize;

use crate::core::error::{Error, ErrorKind};
use crate::core::infer::{ColumnType, TypeInferencer};
use crate::core::signature::NAME_PREFIX;
use crate::core::store::{Store, quote_ident};
use crate::core::tokenize::{Dialect, Row, RowReader};

#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    pub header: bool,
    pub sample_rows: usize,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SchemaColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LoadReport {
    pub table: String,
    pub columns: Vec<SchemaColumn>,
    pub rows: u64,
}

pub fn staging_name(name: &str) -> String {
    format!("{NAME_PREFIX}{name}_temp")
}

pub fn load(store: &Store, name: &str, path: &Path, options: LoadOptions) -> Result<LoadReport, Error> {
    let file = File::open(path).map_err(|err| io_error(err, "unable to open file", path))?;
    let dialect = Dialect::from_path(path)?;
    let mut reader = RowReader::new(BufReader::new(file), dialect.tokenizer());

    let first = reader
        .next_row()
        .map_err(|err| io_error(err, "failed to read file", path))?
        .ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message("file has no columns")
                .with_path(path)
        })?;
    let names = if options.header {
        header_names(first.fields)
    } else {
        reader
            .rewind(0, 0)
            .map_err(|err| io_error(err, "failed to rewind file", path))?;
        synthesized_names(first.fields.len())
    };
    let data_start = (reader.offset(), reader.line());

    let mut inferencer = TypeInferencer::new(names.len());
    for _ in 0..options.sample_rows {
        let Some(row) = reader
            .next_row()
            .map_err(|err| io_error(err, "failed to read file", path))?
        else {
            break;
        };
        inferencer.observe(&row.fields);
    }
    reader
        .rewind(data_start.0, data_start.1)
        .map_err(|err| io_error(err, "failed to rewind file", path))?;

    let columns: Vec<SchemaColumn> = names
        .into_iter()
        .zip(inferencer.finish())
        .map(|(name, column_type)| SchemaColumn { name, column_type })
        .collect();
    tracing::debug!(table = name, columns = ?columns, "inferred column types");

    let staging = staging_name(name);
    store.drop_table(&staging)?;
    store.execute(&create_sql(&staging, &columns), [])?;

    let rows = match fill_staging(store, &staging, &columns, &mut reader, path)
        .and_then(|rows| publish(store, &staging, name).map(|()| rows))
    {
        Ok(rows) => rows,
        Err(err) => {
            if let Err(cleanup) = store.drop_table(&staging) {
                tracing::warn!(table = %staging, error = %cleanup, "failed to drop staging table");
            }
            return Err(err.with_table(name));
        }
    };

    tracing::info!(table = name, rows, path = %path.display(), "loaded table");
    Ok(LoadReport {
        table: name.to_string(),
        columns,
        rows,
    })
}

fn fill_staging<R>(
    store: &Store,
    staging: &str,
    columns: &[SchemaColumn],
    reader: &mut RowReader<R>,
    path: &Path,
) -> Result<u64, Error>
where
    R: io::BufRead + io::Seek,
{
    let tx = store.transaction()?;
    let rows = insert_rows(store, staging, columns, reader, path)?;
    tx.commit()?;
    Ok(rows)
}

// Views over `name` survive the swap and resolve to the new table.
fn publish(store: &Store, staging: &str, name: &str) -> Result<(), Error> {
    let tx = store.transaction()?;
    store.drop_table(name)?;
    store.rename_table_over(staging, name)?;
    tx.commit()?;
    Ok(())
}

fn insert_rows<R>(
    store: &Store,
    staging: &str,
    columns: &[SchemaColumn],
    reader: &mut RowReader<R>,
    path: &Path,
) -> Result<u64, Error>
where
    R: io::BufRead + io::Seek,
{
    let placeholders = vec!["?"; columns.len()].join(", ");
    let mut cursor = store.cursor(&format!(
        "INSERT INTO {} VALUES ({placeholders})",
        quote_ident(staging)
    ))?;

    let mut rows = 0u64;
    while let Some(Row { line, fields }) = reader
        .next_row()
        .map_err(|err| io_error(err, "failed to read file", path))?
    {
        if fields.len() != columns.len() {
            return Err(Error::new(ErrorKind::MalformedRow)
                .with_message(format!(
                    "line {line} has {} items but expected {} items",
                    fields.len(),
                    columns.len()
                ))
                .with_path(path)
                .with_line(line)
                .with_counts(columns.len(), fields.len()));
        }
        for (position, (field, column)) in fields.iter().zip(columns).enumerate() {
            if field.is_empty() && column.column_type != ColumnType::Text {
                cursor.bind(position + 1, Null)?;
            } else {
                cursor.bind(position + 1, field.as_str())?;
            }
        }
        cursor.execute()?;
        cursor.reset()?;
        rows += 1;
    }
    Ok(rows)
}

fn create_sql(table: &str, columns: &[SchemaColumn]) -> String {
    let definitions = columns
        .iter()
        .map(|column| format!("{} {}", quote_ident(&column.name), column.column_type))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({definitions})", quote_ident(table))
}

fn header_names(fields: Vec<String>) -> Vec<String> {
    fields
        .into_iter()
        .enumerate()
        .map(|(index, field)| {
            if field.is_empty() {
                format!("_{}", index + 1)
            } else {
                field
            }
        })
        .collect()
}

fn synthesized_names(count: usize) -> Vec<String> {
    (1..=count).map(|index| format!("_{index}")).collect()
}

fn io_error(err: io::Error, message: &str, path: &Path) -> Error {
    Error::new(ErrorKind::Io)
        .with_message(message)
        .with_path(path)
        .with_source(err)
}

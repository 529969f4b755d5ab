//! Purpose: Persist metadata for every managed table in the `stencila_tables` registry.
//! Exports: `Registry`, `RegistryRow`, `Provenance`, `Status`, `REGISTRY_TABLE`.
//! Role: Single metadata table read and written by the loader, cache and facade.
//! Invariants: `name` is unique across rows (enforced by the schema).
//! Invariants: Unknown provenance or status values read back are `Corrupt`.
use std::fmt;

use rusqlite::Row;
use serde::Serialize;

use crate::core::error::{Error, ErrorKind};
use crate::core::store::Store;

pub const REGISTRY_TABLE: &str = "stencila_tables";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS stencila_tables(\
    name TEXT UNIQUE, source TEXT, sql TEXT, signature TEXT, status INTEGER)";
const COLUMNS: &str = "name, source, sql, signature, status";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Table,
    Select,
    Clone,
    Import,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Table => "table",
            Provenance::Select => "select",
            Provenance::Clone => "clone",
            Provenance::Import => "import",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "table" => Some(Provenance::Table),
            "select" => Some(Provenance::Select),
            "clone" => Some(Provenance::Clone),
            "import" => Some(Provenance::Import),
            _ => None,
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Ephemeral or uncommitted.
    Ephemeral,
    /// Registered but not yet confirmed. Reserved.
    Registered,
    /// Externally imported and authoritative.
    Authoritative,
}

impl Status {
    pub fn code(self) -> i64 {
        match self {
            Status::Ephemeral => 0,
            Status::Registered => 1,
            Status::Authoritative => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Status::Ephemeral),
            1 => Some(Status::Registered),
            2 => Some(Status::Authoritative),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RegistryRow {
    pub name: String,
    pub provenance: Provenance,
    pub sql: Option<String>,
    pub signature: Option<String>,
    pub status: Status,
}

impl RegistryRow {
    pub fn new(name: impl Into<String>, provenance: Provenance, status: Status) -> Self {
        Self {
            name: name.into(),
            provenance,
            sql: None,
            signature: None,
            status,
        }
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }
}

/// Borrowed view over the registry table of one store.
#[derive(Clone, Copy)]
pub struct Registry<'s> {
    store: &'s Store,
}

impl<'s> Registry<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    pub fn ensure(&self) -> Result<(), Error> {
        self.store.execute_batch(SCHEMA)
    }

    pub fn insert(&self, row: &RegistryRow) -> Result<(), Error> {
        self.store
            .execute(
                "INSERT INTO stencila_tables(name, source, sql, signature, status) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    &row.name,
                    row.provenance.as_str(),
                    &row.sql,
                    &row.signature,
                    row.status.code(),
                ),
            )
            .map_err(|err| err.with_table(row.name.as_str()))?;
        Ok(())
    }

    pub fn contains(&self, name: &str) -> Result<bool, Error> {
        let count: i64 = self.store.value(
            "SELECT count(*) FROM stencila_tables WHERE name = ?1",
            [name],
        )?;
        Ok(count > 0)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<RegistryRow>, Error> {
        self.find_one(
            &format!("SELECT {COLUMNS} FROM stencila_tables WHERE name = ?1"),
            name,
        )
    }

    pub fn find_by_signature(&self, signature: &str) -> Result<Option<RegistryRow>, Error> {
        self.find_one(
            &format!(
                "SELECT {COLUMNS} FROM stencila_tables WHERE signature = ?1 ORDER BY rowid LIMIT 1"
            ),
            signature,
        )
    }

    pub fn rename(&self, name: &str, new_name: &str) -> Result<usize, Error> {
        self.store.execute(
            "UPDATE stencila_tables SET name = ?2 WHERE name = ?1",
            [name, new_name],
        )
    }

    pub fn remove(&self, name: &str) -> Result<usize, Error> {
        self.store
            .execute("DELETE FROM stencila_tables WHERE name = ?1", [name])
    }

    pub fn list(&self) -> Result<Vec<RegistryRow>, Error> {
        let sql = format!("SELECT {COLUMNS} FROM stencila_tables ORDER BY name");
        let mut stmt = self.store.connection().prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(decode_row(row)?);
        }
        Ok(out)
    }

    fn find_one(&self, sql: &str, key: &str) -> Result<Option<RegistryRow>, Error> {
        let mut stmt = self.store.connection().prepare(sql)?;
        let mut rows = stmt.query([key])?;
        match rows.next()? {
            Some(row) => Ok(Some(decode_row(row)?)),
            None => Ok(None),
        }
    }
}

fn decode_row(row: &Row<'_>) -> Result<RegistryRow, Error> {
    let name: String = row.get(0)?;
    let source: Option<String> = row.get(1)?;
    let code: Option<i64> = row.get(4)?;

    let provenance = source
        .as_deref()
        .and_then(Provenance::parse)
        .ok_or_else(|| corrupt(&name, "unknown provenance"))?;
    let status = code
        .and_then(Status::from_code)
        .ok_or_else(|| corrupt(&name, "unknown status"))?;

    Ok(RegistryRow {
        name,
        provenance,
        sql: row.get(2)?,
        signature: row.get(3)?,
        status,
    })
}

fn corrupt(name: &str, message: &str) -> Error {
    Error::new(ErrorKind::Corrupt)
        .with_message(format!("registry row {message}"))
        .with_table(name)
}

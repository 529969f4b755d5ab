//! Purpose: Read-side handle bound to one physical table name.
//! Exports: `Table`, `Column`, `Cell`.
//! Role: Returned by every `Tableset` operation; reads go straight to the backing store.
//! Invariants: A handle never caches rows; each call reflects the current table contents.
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::core::error::Error;
use crate::core::store::{Store, quote_ident};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    /// Declared type as reported by the store, e.g. `INTEGER`.
    pub declared_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(value) => Cell::Integer(value),
            ValueRef::Real(value) => Cell::Real(value),
            ValueRef::Text(bytes) => Cell::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Cell::Blob(bytes.to_vec()),
        }
    }
}

#[derive(Clone)]
pub struct Table<'t> {
    name: String,
    store: &'t Store,
}

impl<'t> Table<'t> {
    pub(crate) fn new(name: impl Into<String>, store: &'t Store) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self) -> Result<bool, Error> {
        self.store.probe(&self.name)
    }

    pub fn count(&self) -> Result<u64, Error> {
        let count: i64 = self.store.value(
            &format!("SELECT count(*) FROM {}", quote_ident(&self.name)),
            [],
        )?;
        Ok(count.max(0) as u64)
    }

    pub fn columns(&self) -> Result<Vec<Column>, Error> {
        let mut stmt = self
            .store
            .connection()
            .prepare(&format!("PRAGMA table_info({})", quote_ident(&self.name)))?;
        let columns = stmt
            .query_map([], |row| {
                Ok(Column {
                    name: row.get("name")?,
                    declared_type: row.get("type")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    pub fn rows(&self) -> Result<Vec<Vec<Cell>>, Error> {
        self.read(None)
    }

    pub fn head(&self, limit: usize) -> Result<Vec<Vec<Cell>>, Error> {
        self.read(Some(limit))
    }

    fn read(&self, limit: Option<usize>) -> Result<Vec<Vec<Cell>>, Error> {
        let mut sql = format!("SELECT * FROM {} ORDER BY rowid", quote_ident(&self.name));
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        let mut stmt = self.store.connection().prepare(&sql)?;
        let width = stmt.column_count();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                cells.push(Cell::from(row.get_ref(index)?));
            }
            out.push(cells);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for Table<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table").field("name", &self.name).finish()
    }
}

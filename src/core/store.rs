//! Purpose: Thin adapter over the SQLite backing store used by every other component.
//! Exports: `Store`, `Cursor`, `quote_ident`.
//! Role: Provides the `execute` / `value` / `cursor` primitives plus transactions and probes.
//! Invariants: Identifiers reaching SQL text are always quoted with `quote_ident`.
//! Invariants: `Store` is `Send` but not `Sync`; one owner drives it at a time.
use std::path::Path;

use rusqlite::types::{FromSql, Null, ToSql};
use rusqlite::{Connection, Params, Statement, Transaction};

use crate::core::error::{Error, ErrorKind};

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path).map_err(|err| {
            Error::new(ErrorKind::BackingStore)
                .with_message("failed to open database")
                .with_path(path)
                .with_source(err)
        })?;
        tracing::debug!(path = %path.display(), "opened backing store");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run one DDL/DML statement; returns the number of changed rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<usize, Error> {
        Ok(self.conn.execute(sql, params)?)
    }

    pub fn execute_batch(&self, sql: &str) -> Result<(), Error> {
        Ok(self.conn.execute_batch(sql)?)
    }

    /// Scalar read of the first column of the first row.
    pub fn value<T: FromSql, P: Params>(&self, sql: &str, params: P) -> Result<T, Error> {
        Ok(self.conn.query_row(sql, params, |row| row.get(0))?)
    }

    pub fn cursor(&self, sql: &str) -> Result<Cursor<'_>, Error> {
        Ok(Cursor {
            stmt: self.conn.prepare(sql)?,
        })
    }

    /// Begin a transaction that rolls back when dropped uncommitted.
    pub fn transaction(&self) -> Result<Transaction<'_>, Error> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Lightweight existence check. A missing table is `Ok(false)`; any other
    /// failure is surfaced.
    pub fn probe(&self, name: &str) -> Result<bool, Error> {
        let sql = format!("SELECT * FROM {} LIMIT 1", quote_ident(name));
        match self.conn.prepare(&sql) {
            Ok(mut stmt) => {
                let mut rows = stmt.query([])?;
                rows.next()?;
                Ok(true)
            }
            Err(err) if is_missing_table(&err) => Ok(false),
            Err(err) => Err(Error::from(err).with_table(name)),
        }
    }

    pub fn drop_table(&self, name: &str) -> Result<(), Error> {
        self.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)), [])?;
        Ok(())
    }

    pub fn rename_table(&self, name: &str, new_name: &str) -> Result<(), Error> {
        self.execute(
            &format!(
                "ALTER TABLE {} RENAME TO {}",
                quote_ident(name),
                quote_ident(new_name)
            ),
            [],
        )?;
        Ok(())
    }

    /// Rename without re-validating views and triggers against the new
    /// schema, so a view over a just-dropped `new_name` does not block it.
    pub fn rename_table_over(&self, name: &str, new_name: &str) -> Result<(), Error> {
        self.execute_batch("PRAGMA legacy_alter_table = ON")?;
        let renamed = self.rename_table(name, new_name);
        let reset = self.execute_batch("PRAGMA legacy_alter_table = OFF");
        renamed?;
        reset
    }
}

/// Prepared statement driven by position: `bind`, `execute`, `reset`.
pub struct Cursor<'conn> {
    stmt: Statement<'conn>,
}

impl Cursor<'_> {
    /// Bind `value` at 1-based `position`.
    pub fn bind<T: ToSql>(&mut self, position: usize, value: T) -> Result<(), Error> {
        Ok(self.stmt.raw_bind_parameter(position, value)?)
    }

    pub fn execute(&mut self) -> Result<usize, Error> {
        Ok(self.stmt.raw_execute()?)
    }

    /// Clear all bindings back to NULL.
    pub fn reset(&mut self) -> Result<(), Error> {
        for position in 1..=self.stmt.parameter_count() {
            self.stmt.raw_bind_parameter(position, Null)?;
        }
        Ok(())
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// Prepare failures surface as `SqliteFailure` or `SqlInputError` depending on
// whether SQLite reports an offset; both render the message first.
fn is_missing_table(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(..) | rusqlite::Error::SqlInputError { .. }
    ) && err.to_string().starts_with("no such table")
}

//! Purpose: Public facade composing the store, registry, loader and query cache.
//! Exports: `Tableset`, `TablesetOptions`.
//! Role: Entry point for `load`, `import`, `select`, `clone`, `rename`, `create`, `table`, `drop`.
//! Invariants: The registry table exists once a `Tableset` is open.
//! Invariants: Multi-statement mutations commit as one transaction or not at all.
//! Invariants: No internal locking; wrap in a `Mutex` to share across threads.
#![allow(clippy::result_large_err)]

use std::path::Path;

use super::table::Table;
use crate::core::cache::{self, Materialized};
use crate::core::error::{Error, ErrorKind};
use crate::core::infer::DEFAULT_SAMPLE_ROWS;
use crate::core::loader::{self, LoadOptions, LoadReport};
use crate::core::registry::{Provenance, Registry, RegistryRow, Status};
use crate::core::store::Store;

pub type ApiResult<T> = Result<T, Error>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TablesetOptions {
    /// Upper bound on data rows sampled for type inference during `load`.
    pub sample_rows: usize,
}

impl TablesetOptions {
    pub fn new() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
        }
    }

    pub fn with_sample_rows(mut self, sample_rows: usize) -> Self {
        self.sample_rows = sample_rows;
        self
    }
}

impl Default for TablesetOptions {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Tableset {
    store: Store,
    options: TablesetOptions,
}

impl Tableset {
    pub fn open(path: impl AsRef<Path>, options: TablesetOptions) -> ApiResult<Self> {
        Self::with_store(Store::open(path.as_ref())?, options)
    }

    pub fn open_in_memory(options: TablesetOptions) -> ApiResult<Self> {
        Self::with_store(Store::open_in_memory()?, options)
    }

    fn with_store(store: Store, options: TablesetOptions) -> ApiResult<Self> {
        Registry::new(&store).ensure()?;
        Ok(Self { store, options })
    }

    pub fn options(&self) -> TablesetOptions {
        self.options
    }

    fn registry(&self) -> Registry<'_> {
        Registry::new(&self.store)
    }

    /// Handle for `name` with no registry interaction and no existence check.
    pub fn table(&self, name: &str) -> Table<'_> {
        Table::new(name, &self.store)
    }

    pub fn exists(&self, name: &str) -> ApiResult<bool> {
        self.store.probe(name)
    }

    /// Register a placeholder for a table the caller will create.
    pub fn create(&self, name: &str) -> ApiResult<Table<'_>> {
        if self.registry().contains(name)? || self.store.probe(name)? {
            return Err(name_conflict(name));
        }
        self.registry()
            .insert(&RegistryRow::new(name, Provenance::Table, Status::Ephemeral))?;
        Ok(self.table(name))
    }

    pub fn load(&self, name: &str, path: impl AsRef<Path>, header: bool) -> ApiResult<Table<'_>> {
        self.load_with_report(name, path, header)?;
        Ok(self.table(name))
    }

    pub fn load_with_report(
        &self,
        name: &str,
        path: impl AsRef<Path>,
        header: bool,
    ) -> ApiResult<LoadReport> {
        let options = LoadOptions {
            header,
            sample_rows: self.options.sample_rows,
        };
        loader::load(&self.store, name, path.as_ref(), options)
    }

    /// Register an externally created table as authoritative. Idempotent.
    pub fn import(&self, name: &str) -> ApiResult<Table<'_>> {
        if !self.registry().contains(name)? {
            self.registry()
                .insert(&RegistryRow::new(name, Provenance::Table, Status::Authoritative))?;
        }
        Ok(self.table(name))
    }

    pub fn select(&self, sql: &str, reuse: bool) -> ApiResult<Table<'_>> {
        let materialized = self.materialize(sql, reuse)?;
        Ok(Table::new(materialized.name, &self.store))
    }

    pub fn materialize(&self, sql: &str, reuse: bool) -> ApiResult<Materialized> {
        cache::select(&self.store, sql, reuse)
    }

    pub fn clone(&self, original: &str) -> ApiResult<Table<'_>> {
        let materialized = cache::clone_table(&self.store, original)?;
        Ok(Table::new(materialized.name, &self.store))
    }

    /// Rename the physical table and its registry row together.
    pub fn rename(&self, name: &str, new_name: &str) -> ApiResult<Table<'_>> {
        if !self.store.probe(name)? {
            return Err(Error::new(ErrorKind::NotFound)
                .with_message("cannot rename a missing table")
                .with_table(name));
        }
        if self.store.probe(new_name)? || self.registry().contains(new_name)? {
            return Err(name_conflict(new_name));
        }
        let tx = self.store.transaction()?;
        self.store.rename_table(name, new_name)?;
        self.registry().rename(name, new_name)?;
        tx.commit()?;
        tracing::debug!(from = name, to = new_name, "renamed table");
        Ok(self.table(new_name))
    }

    /// Remove the physical table and its registry row; unknown names are a no-op.
    pub fn drop(&self, name: &str) -> ApiResult<()> {
        let tx = self.store.transaction()?;
        self.store.drop_table(name)?;
        self.registry().remove(name)?;
        tx.commit()?;
        Ok(())
    }

    pub fn registry_row(&self, name: &str) -> ApiResult<Option<RegistryRow>> {
        self.registry().find_by_name(name)
    }

    pub fn list(&self) -> ApiResult<Vec<RegistryRow>> {
        self.registry().list()
    }

    /// Run caller SQL (one or more statements) against the backing store.
    pub fn execute(&self, sql: &str) -> ApiResult<()> {
        self.store.execute_batch(sql)
    }
}

fn name_conflict(name: &str) -> Error {
    Error::new(ErrorKind::NameConflict)
        .with_message("table already exists")
        .with_table(name)
}

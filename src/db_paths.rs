//! Purpose: Resolve the database file used by the `tableset` CLI.
//! Exports: `default_db_path` and `prepare_db_path`.
//! Role: Keep CLI path defaults in one place.
//! Invariants: Default database remains `~/.tableset/tables.db`.
//! Invariants: Parent directories are created on demand, never the file itself.

use std::path::{Path, PathBuf};

use tableset::api::{Error, ErrorKind};

pub(crate) fn default_db_path() -> PathBuf {
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(".tableset").join("tables.db")
}

pub(crate) fn prepare_db_path(path: &Path) -> Result<(), Error> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to create database directory")
            .with_path(parent)
            .with_source(err)
    })
}

//! Purpose: Define the public Rust API boundary for `tableset`.
//! Exports: The `Tableset` facade, table handles, registry types and errors.
//! Role: Stable surface used by the CLI and tests; core modules stay implementation detail.
//! Invariants: Every handle returned here names an already-materialized table
//! (except `Tableset::table`, which does not check).

mod table;
mod tableset;

pub use crate::core::cache::Materialized;
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::infer::{ColumnType, DEFAULT_SAMPLE_ROWS};
pub use crate::core::loader::{LoadReport, SchemaColumn};
pub use crate::core::registry::{Provenance, REGISTRY_TABLE, RegistryRow, Status};
pub use table::{Cell, Column, Table};
pub use tableset::{Tableset, TablesetOptions};

//! Purpose: Materialize query results and clones as registry-tracked temporary tables.
//! Exports: `select`, `clone_table`, `Materialized`.
//! Role: Content-addressed cache behind `Tableset::select` and `Tableset::clone`.
//! Invariants: At most one registry row per select signature survives a `select` call.
//! Invariants: Lookup, invalidation, creation and registration commit as one transaction.
//! Invariants: Signature collisions are cache hits; only table existence is verified.
use serde::Serialize;

use crate::core::error::{Error, ErrorKind};
use crate::core::registry::{Provenance, Registry, RegistryRow, Status};
use crate::core::signature::{fresh_signature, signature_of, table_name_for};
use crate::core::store::{Store, quote_ident};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Materialized {
    pub name: String,
    pub signature: String,
    /// True when an existing cached table was returned without recomputation.
    pub reused: bool,
}

pub fn select(store: &Store, sql: &str, reuse: bool) -> Result<Materialized, Error> {
    let signature = signature_of(sql);
    let registry = Registry::new(store);
    let tx = store.transaction()?;

    while let Some(row) = registry.find_by_signature(&signature)? {
        if !store.probe(&row.name)? {
            tracing::warn!(table = %row.name, "dropping stale registry row");
            registry.remove(&row.name)?;
            continue;
        }
        if reuse {
            tx.commit()?;
            tracing::debug!(table = %row.name, %signature, "select cache hit");
            return Ok(Materialized {
                name: row.name,
                signature,
                reused: true,
            });
        }
        tracing::debug!(table = %row.name, %signature, "invalidating cached select");
        store.drop_table(&row.name)?;
        registry.remove(&row.name)?;
    }

    // The subquery keeps quoted column names in the caller's SQL from being
    // read as string literals.
    let name = table_name_for(&fresh_signature()?);
    store.execute(
        &format!(
            "CREATE TEMPORARY TABLE {} AS SELECT * FROM ({}\n)",
            quote_ident(&name),
            subquery_body(sql)
        ),
        [],
    )?;
    registry.insert(
        &RegistryRow::new(name.as_str(), Provenance::Select, Status::Ephemeral)
            .with_sql(sql)
            .with_signature(signature.as_str()),
    )?;
    tx.commit()?;

    tracing::debug!(table = %name, %signature, "select cache miss");
    Ok(Materialized {
        name,
        signature,
        reused: false,
    })
}

// Trailing terminators are legal at statement level but not inside a
// subquery; a trailing line comment is closed by the newline before `)`.
fn subquery_body(sql: &str) -> &str {
    sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

pub fn clone_table(store: &Store, original: &str) -> Result<Materialized, Error> {
    if !store.probe(original)? {
        return Err(Error::new(ErrorKind::NotFound)
            .with_message("cannot clone a missing table")
            .with_table(original));
    }

    let signature = fresh_signature()?;
    let name = table_name_for(&signature);
    let tx = store.transaction()?;
    store.drop_table(&name)?;
    store.execute(
        &format!(
            "CREATE TEMPORARY TABLE {} AS SELECT * FROM {}",
            quote_ident(&name),
            quote_ident(original)
        ),
        [],
    )?;
    Registry::new(store).insert(
        &RegistryRow::new(name.as_str(), Provenance::Clone, Status::Ephemeral)
            .with_sql(original)
            .with_signature(signature.as_str()),
    )?;
    tx.commit()?;

    tracing::debug!(table = %name, original, "cloned table");
    Ok(Materialized {
        name,
        signature,
        reused: false,
    })
}

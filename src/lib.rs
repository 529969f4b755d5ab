//! Purpose: Table materialization and caching over SQLite for the `tableset` CLI and library users.
//! Exports: `api` (facade, handles, errors) and `core` (store, registry, loader, cache).
//! Role: Decides which table to create or reuse and how to type and load rows into it.
//! Invariants: One `Tableset` per owner; the type is `Send` but not `Sync`.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod api;
pub mod core;

// Core modules implementing the backing store adapter, registry, loading and caching.
pub mod cache;
pub mod error;
pub mod infer;
pub mod loader;
pub mod registry;
pub mod signature;
pub mod store;
pub mod tokenize;

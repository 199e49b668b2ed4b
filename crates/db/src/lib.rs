//! Data-access layer: a flat-file JSON document store with typed models,
//! repositories, startup migrations and maintenance operations.

use std::path::PathBuf;
use std::sync::Arc;

pub mod maintenance;
pub mod migrations;
pub mod models;
pub mod repositories;
pub mod store;

pub use migrations::MigrationReport;
pub use store::{Collections, DocumentStore, StoreError};

/// Shared handle to the document store, cloned into every request.
pub type DbPool = Arc<DocumentStore>;

/// Open (or create) the data file at `path`.
pub async fn open_store(path: impl Into<PathBuf>) -> Result<DbPool, StoreError> {
    Ok(Arc::new(DocumentStore::open(path).await?))
}

/// A store that never touches disk, for tests and dry runs.
pub fn in_memory_store() -> DbPool {
    Arc::new(DocumentStore::in_memory())
}

/// Verify the store is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), StoreError> {
    pool.ping().await
}

/// Bring the data file up to the current schema.
pub async fn run_migrations(pool: &DbPool) -> Result<MigrationReport, StoreError> {
    migrations::run(pool).await
}

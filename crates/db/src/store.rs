//! Flat-file JSON document store.
//!
//! The whole database is one JSON file holding the `users`, `brands` and
//! `projects` collections. It is loaded into memory on open; every write runs
//! against a copy of the collections, is persisted with write-then-rename and
//! only then replaces the in-memory state. A write that fails to persist
//! therefore leaves both memory and disk untouched.

use std::path::{Path, PathBuf};

use briefdesk_core::error::CoreError;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::models::brand::Brand;
use crate::models::project::Project;
use crate::models::user::User;

/// Errors raised by the document store and the repositories on top of it.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data file exists but is not valid store JSON. Never reset silently.
    #[error("Data file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A uniqueness rule was violated (e.g. two users with one email).
    #[error("Duplicate value for {collection}.{field}: {value}")]
    UniqueViolation {
        collection: &'static str,
        field: &'static str,
        value: String,
    },

    /// A domain rule rejected the write.
    #[error(transparent)]
    Domain(#[from] CoreError),
}

/// Every collection in the store, exactly as laid out in the data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collections {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub brands: Vec<Brand>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// In-memory document store optionally backed by a JSON file.
#[derive(Debug)]
pub struct DocumentStore {
    path: Option<PathBuf>,
    data: RwLock<Collections>,
}

impl DocumentStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Collections>(&bytes).map_err(|source| {
                StoreError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let data = Collections::default();
                persist(&path, &data).await?;
                tracing::info!(path = %path.display(), "Created empty data file");
                data
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        tracing::debug!(
            path = %path.display(),
            users = data.users.len(),
            brands = data.brands.len(),
            projects = data.projects.len(),
            "Document store loaded"
        );

        Ok(Self {
            path: Some(path),
            data: RwLock::new(data),
        })
    }

    /// A store that lives only in memory (nothing is written to disk).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: RwLock::new(Collections::default()),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a read-only query against the collections.
    pub async fn read<T>(&self, query: impl FnOnce(&Collections) -> T) -> T {
        let guard = self.data.read().await;
        query(&guard)
    }

    /// Run a mutation atomically: it either fully applies and is persisted,
    /// or nothing changes.
    pub async fn write<T>(
        &self,
        mutation: impl FnOnce(&mut Collections) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.data.write().await;
        let mut draft = guard.clone();
        let out = mutation(&mut draft)?;
        if let Some(path) = &self.path {
            persist(path, &draft).await?;
        }
        *guard = draft;
        Ok(out)
    }

    /// Clone of the full current state.
    pub async fn snapshot(&self) -> Collections {
        self.data.read().await.clone()
    }

    /// Write the current state to `dest` (used for backups before maintenance).
    pub async fn backup_to(&self, dest: &Path) -> Result<(), StoreError> {
        let data = self.snapshot().await;
        persist(dest, &data).await
    }

    /// Verify the backing directory is still reachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let dir = parent_dir(path);
        tokio::fs::metadata(dir)
            .await
            .map(|_| ())
            .map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Serialize `data` to a sibling temp file and rename it over `path`.
async fn persist(path: &Path, data: &Collections) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    tokio::fs::create_dir_all(parent_dir(path))
        .await
        .map_err(io_err)?;

    let bytes = serde_json::to_vec_pretty(data)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}

//! On-disk storage for files received through multipart uploads.
//!
//! Files are written flat into the upload directory under a generated name
//! `<unix-millis>-<random><.ext>` and served back at `/uploads/<name>`.

use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use briefdesk_core::roles::Role;
use briefdesk_db::models::project::ProjectFile;
use chrono::Utc;
use rand::Rng;

use crate::error::{AppError, AppResult};

/// Multipart field name carrying uploaded files.
pub const FILES_FIELD: &str = "files";

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `data` under a fresh name and describe it as a project file.
    pub async fn save(
        &self,
        original_name: &str,
        data: &[u8],
        uploaded_by: Role,
    ) -> AppResult<ProjectFile> {
        self.ensure_dir()
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {e}")))?;

        let name = stored_name(original_name);
        let dest = self.dir.join(&name);
        tokio::fs::write(&dest, data)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to write upload: {e}")))?;

        tracing::debug!(file = %name, size = data.len(), "Stored upload");

        Ok(ProjectFile {
            url: format!("{PUBLIC_PREFIX}/{name}"),
            original_name: original_name.to_string(),
            uploaded_by,
            uploaded_at: Utc::now(),
            size_bytes: data.len() as u64,
        })
    }

    /// Store every part named `files` from `multipart`. Other fields are
    /// skipped. If the body breaks off midway, files already written are
    /// removed again.
    pub async fn save_multipart(
        &self,
        mut multipart: Multipart,
        uploaded_by: Role,
    ) -> AppResult<Vec<ProjectFile>> {
        let mut saved = Vec::new();
        loop {
            match self.next_file(&mut multipart, uploaded_by).await {
                Ok(Some(file)) => saved.push(file),
                Ok(None) => return Ok(saved),
                Err(e) => {
                    self.discard(&saved).await;
                    return Err(e);
                }
            }
        }
    }

    async fn next_file(
        &self,
        multipart: &mut Multipart,
        uploaded_by: Role,
    ) -> AppResult<Option<ProjectFile>> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            if field.name() != Some(FILES_FIELD) {
                continue;
            }

            let original_name = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;

            return self.save(&original_name, &data, uploaded_by).await.map(Some);
        }
        Ok(None)
    }

    /// Delete stored files that never made it into a project.
    pub async fn discard(&self, files: &[ProjectFile]) {
        for file in files {
            let Some(name) = file.url.strip_prefix(&format!("{PUBLIC_PREFIX}/")) else {
                continue;
            };
            if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
                tracing::warn!(file = %name, error = %e, "Failed to remove orphaned upload");
            }
        }
    }
}

/// `<unix-millis>-<random><.ext>`, keeping only an alphanumeric extension.
fn stored_name(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{millis}-{suffix}{ext}")
}

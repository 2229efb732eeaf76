//! Request-scoped ownership of uploaded files.
//!
//! An upload is spooled to `UPLOAD_DIR` as a named temp file owned by
//! [`UploadedDocument`]. Dropping the document removes the file, so every exit
//! path of the request (success, extraction failure, validation failure)
//! cleans up after itself.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::ingest::extract::{extract_text_blocking, ExtractError};

#[derive(Debug)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub original_name: String,
    pub mime_type: String,
    pub size: usize,
    file: NamedTempFile,
}

impl UploadedDocument {
    /// Writes `bytes` into a fresh temp file under `upload_dir`.
    pub async fn spool(
        upload_dir: &Path,
        original_name: String,
        mime_type: String,
        bytes: bytes::Bytes,
    ) -> Result<Self> {
        let id = Uuid::new_v4();
        let dir = upload_dir.to_path_buf();
        let size = bytes.len();

        let file = tokio::task::spawn_blocking(move || -> Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("resume-")
                .tempfile_in(&dir)
                .with_context(|| format!("Failed to create upload file in {dir:?}"))?;
            file.write_all(&bytes)
                .context("Failed to write uploaded file")?;
            file.flush().context("Failed to flush uploaded file")?;
            Ok(file)
        })
        .await
        .context("Upload spooling task aborted")??;

        debug!(
            "Spooled upload {} ({}, {} bytes, {}) to {:?}",
            id,
            original_name,
            size,
            mime_type,
            file.path()
        );

        Ok(Self {
            id,
            original_name,
            mime_type,
            size,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Extracts the document's text. The file stays owned by `self` and is
    /// removed when `self` is dropped.
    pub async fn extract_text(&self) -> Result<String, ExtractError> {
        extract_text_blocking(self.path().to_path_buf(), self.mime_type.clone()).await
    }
}

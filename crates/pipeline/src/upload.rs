//! Filesystem storage for uploaded video bytes.
//!
//! Bytes are written to `{video_id}.part` and renamed into place, so a
//! reader never sees a half-written upload.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use vidsum_core::retry::RetryPolicy;
use vidsum_core::storage;

use crate::error::LifecycleError;

/// I/O failures worth another attempt.
fn is_transient_io(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    retry: RetryPolicy,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            root: root.into(),
            retry,
        }
    }

    /// The storage root shared with keyframes and static serving.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `bytes` as the upload for `video_id`, replacing any earlier
    /// upload. Returns the final path.
    pub async fn save(&self, video_id: &str, bytes: &[u8]) -> Result<PathBuf, LifecycleError> {
        let path = storage::upload_path(&self.root, video_id)?;
        let part = path.with_extension("part");

        let (target, part_ref) = (&path, &part);
        self.retry
            .run("save_upload", is_transient_io, move || {
                write_atomically(part_ref, target, bytes)
            })
            .await
            .map_err(LifecycleError::Upload)?;

        tracing::debug!(video_id, bytes = bytes.len(), path = %path.display(), "Upload stored");
        Ok(path)
    }

    /// Remove the upload for `video_id`. A missing file is not an error.
    pub async fn remove(&self, video_id: &str) -> Result<(), LifecycleError> {
        let path = storage::upload_path(&self.root, video_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LifecycleError::Upload(e)),
        }
    }
}

async fn write_atomically(part: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = target.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let written = async {
        tokio::fs::write(part, bytes).await?;
        tokio::fs::rename(part, target).await
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(part).await;
    }
    written
}

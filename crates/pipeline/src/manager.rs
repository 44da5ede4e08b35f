//! The video lifecycle manager.

use std::sync::Arc;

use tokio::sync::Mutex;
use vidsum_core::naming;
use vidsum_core::status::VideoStatus;
use vidsum_db::models::job::Job;
use vidsum_db::models::shot::Shot;
use vidsum_db::models::summary::Summary;
use vidsum_db::models::video::{CreateVideo, Video};
use vidsum_db::VideoStore;

use crate::error::LifecycleError;
use crate::upload::UploadStore;

/// Attempts at finding an unused video ID before giving up.
const MAX_ID_ATTEMPTS: usize = 3;

/// Public location of a video resource.
pub fn video_url(video_id: &str) -> String {
    format!("/api/videos/{video_id}")
}

/// Where the client sends the raw bytes for a registered video.
pub fn upload_url(video_id: &str) -> String {
    format!("/api/videos/{video_id}/upload")
}

/// Result of [`VideoManager::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub video: Video,
    pub upload_url: String,
}

/// A video with its summary. `summary` is only present once the video is
/// `completed`.
#[derive(Debug, Clone)]
pub struct VideoDetails {
    pub video: Video,
    pub summary: Option<Summary>,
}

pub struct VideoManager {
    store: Arc<dyn VideoStore>,
    uploads: UploadStore,
    /// Serializes the active-job check with job creation.
    enqueue_lock: Mutex<()>,
}

impl VideoManager {
    pub fn new(store: Arc<dyn VideoStore>, uploads: UploadStore) -> Self {
        Self {
            store,
            uploads,
            enqueue_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<dyn VideoStore> {
        &self.store
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.uploads
    }

    /// Register a new video in `created` and return where to upload it.
    pub async fn register(&self, file_name: &str) -> Result<Registration, LifecycleError> {
        naming::validate_file_name(file_name)?;
        let file_name = file_name.trim();

        let mut attempt = 0;
        let video = loop {
            attempt += 1;
            let input = CreateVideo {
                id: naming::derive_video_id(file_name),
                file_name: file_name.to_string(),
            };
            match self.store.create_video(&input).await {
                Ok(video) => break video,
                Err(vidsum_db::StoreError::Conflict(_)) if attempt < MAX_ID_ATTEMPTS => {
                    tracing::debug!(video_id = %input.id, "Video id collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        };

        tracing::info!(video_id = %video.id, file_name = %video.file_name, "Video registered");
        let upload_url = upload_url(&video.id);
        Ok(Registration { video, upload_url })
    }

    /// Store the uploaded bytes and move the video to `uploaded`.
    ///
    /// Re-uploading is allowed until a job is enqueued; a `failed` video can
    /// be re-uploaded too. The final status write is conditional, so a video
    /// that started processing while the bytes were written keeps its status
    /// and the upload is reported as a conflict.
    pub async fn store_upload(&self, video_id: &str, bytes: &[u8]) -> Result<Video, LifecycleError> {
        let video = self.require_video(video_id).await?;
        if !video.status.can_transition_to(VideoStatus::Uploaded) {
            return Err(upload_conflict(video_id, video.status));
        }
        if self.store.has_active_job(video_id).await? {
            return Err(LifecycleError::Conflict(format!(
                "Video {video_id} has a pending job"
            )));
        }

        self.uploads.save(video_id, bytes).await?;

        if !self
            .store
            .transition_video(video_id, VideoStatus::Uploaded, None)
            .await?
        {
            return Err(match self.store.find_video(video_id).await? {
                Some(current) => upload_conflict(video_id, current.status),
                None => not_found(video_id),
            });
        }

        tracing::info!(video_id, bytes = bytes.len(), "Video uploaded");
        Ok(Video {
            status: VideoStatus::Uploaded,
            error: None,
            ..video
        })
    }

    /// Create a `queued` job for the video.
    pub async fn enqueue(&self, video_id: &str) -> Result<Job, LifecycleError> {
        let _guard = self.enqueue_lock.lock().await;

        let video = self.require_video(video_id).await?;
        match video.status {
            VideoStatus::Uploaded | VideoStatus::Failed => {}
            VideoStatus::Created => {
                return Err(LifecycleError::Conflict(format!(
                    "Video {video_id} has not been uploaded yet"
                )));
            }
            VideoStatus::Processing | VideoStatus::Completed => {
                return Err(LifecycleError::Conflict(format!(
                    "Video {video_id} is already {}",
                    video.status
                )));
            }
        }
        if self.store.has_active_job(video_id).await? {
            return Err(LifecycleError::Conflict(format!(
                "Video {video_id} already has a pending job"
            )));
        }

        let job = self.store.create_job(video_id).await?;
        tracing::info!(job_id = %job.id, video_id, "Job enqueued");
        Ok(job)
    }

    /// Current status, plus the summary once processing has completed.
    pub async fn get_details(&self, video_id: &str) -> Result<VideoDetails, LifecycleError> {
        let video = self.require_video(video_id).await?;
        let summary = if video.status == VideoStatus::Completed {
            self.store.summary_for_video(video_id).await?
        } else {
            None
        };
        Ok(VideoDetails { video, summary })
    }

    /// Shots ordered by start time. Unknown videos have no shots.
    pub async fn list_shots(&self, video_id: &str) -> Result<Vec<Shot>, LifecycleError> {
        Ok(self.store.shots_for_video(video_id).await?)
    }

    /// Delete a video with its artifacts and uploaded bytes.
    pub async fn delete(&self, video_id: &str) -> Result<(), LifecycleError> {
        if !self.store.delete_video(video_id).await? {
            return Err(not_found(video_id));
        }
        if let Err(e) = self.uploads.remove(video_id).await {
            tracing::warn!(video_id, error = %e, "Failed to remove uploaded bytes");
        }
        tracing::info!(video_id, "Video deleted");
        Ok(())
    }

    async fn require_video(&self, video_id: &str) -> Result<Video, LifecycleError> {
        self.store
            .find_video(video_id)
            .await?
            .ok_or_else(|| not_found(video_id))
    }
}

fn upload_conflict(video_id: &str, status: VideoStatus) -> LifecycleError {
    LifecycleError::Conflict(format!(
        "Video {video_id} cannot accept an upload while {status}"
    ))
}

fn not_found(video_id: &str) -> LifecycleError {
    LifecycleError::NotFound {
        entity: "Video",
        id: video_id.to_string(),
    }
}

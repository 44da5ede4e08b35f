//! The persistence gateway consumed by the lifecycle manager and the worker.
//!
//! Every backend implements [`VideoStore`]. Wrap one in [`RetryingStore`]
//! to retry transient failures with exponential backoff.

mod memory;
mod pg;
mod retrying;

use async_trait::async_trait;
use vidsum_core::analyzer::{ShotDescriptor, SummaryPayload};
use vidsum_core::status::{JobStatus, VideoStatus};
use vidsum_core::types::EntityId;

use crate::error::StoreError;
use crate::models::job::Job;
use crate::models::shot::Shot;
use crate::models::summary::Summary;
use crate::models::video::{CreateVideo, Video};

pub use memory::{Fault, MemoryStore};
pub use pg::PgStore;
pub use retrying::RetryingStore;

/// Shots and summary of a video, as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub shots: Vec<Shot>,
    pub summary: Option<Summary>,
}

#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Confirm the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Insert a video in `created`. A duplicate ID yields `Conflict`.
    async fn create_video(&self, input: &CreateVideo) -> Result<Video, StoreError>;

    async fn find_video(&self, id: &str) -> Result<Option<Video>, StoreError>;

    /// Move the video to `status` if its current status allows it (see
    /// [`VideoStatus::can_transition_to`]). Returns `false` when the video
    /// does not exist or cannot move to `status`; nothing changes then.
    async fn transition_video(
        &self,
        id: &str,
        status: VideoStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Delete a video with its shots and summary. Jobs are kept.
    async fn delete_video(&self, id: &str) -> Result<bool, StoreError>;

    /// Enqueue a job in `queued` for `video_id`.
    async fn create_job(&self, video_id: &str) -> Result<Job, StoreError>;

    async fn find_job(&self, id: EntityId) -> Result<Option<Job>, StoreError>;

    /// Whether `video_id` has a queued or processing job.
    async fn has_active_job(&self, video_id: &str) -> Result<bool, StoreError>;

    /// Oldest queued job by `(created_at, id)`.
    async fn next_queued_job(&self) -> Result<Option<Job>, StoreError>;

    /// `queued -> processing` on behalf of `worker`. `false` if the job was
    /// neither queued nor already claimed by `worker`, so repeating a claim
    /// whose reply was lost still reports the win.
    async fn claim_job(&self, id: EntityId, worker: EntityId) -> Result<bool, StoreError>;

    /// `processing -> completed | failed`. `false` if the job was not
    /// processing. A non-terminal `status` is rejected with `Conflict`.
    async fn finish_job(
        &self,
        id: EntityId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Fail every job still in `processing` and return them.
    async fn fail_interrupted_jobs(&self, reason: &str) -> Result<Vec<Job>, StoreError>;

    /// Record a successful run as one unit: insert the shots and summary and
    /// move both the job and the video to `completed`. Nothing is written on
    /// error. Fails with `NotFound` if the video is gone, and `Conflict` if
    /// the job or video is no longer `processing` or a summary already exists.
    async fn complete_job(
        &self,
        job_id: EntityId,
        video_id: &str,
        shots: &[ShotDescriptor],
        summary: &SummaryPayload,
    ) -> Result<(), StoreError>;

    /// Shots ordered by `start_ms`. Empty for unknown videos.
    async fn shots_for_video(&self, video_id: &str) -> Result<Vec<Shot>, StoreError>;

    async fn summary_for_video(&self, video_id: &str) -> Result<Option<Summary>, StoreError>;

    async fn artifacts_for_video(&self, video_id: &str) -> Result<Artifacts, StoreError> {
        Ok(Artifacts {
            shots: self.shots_for_video(video_id).await?,
            summary: self.summary_for_video(video_id).await?,
        })
    }
}

pub(crate) fn ensure_terminal(status: JobStatus) -> Result<(), StoreError> {
    if JobStatus::Processing.can_transition_to(status) {
        Ok(())
    } else {
        Err(StoreError::Conflict(format!(
            "Job can only be finished as completed or failed, not {status}"
        )))
    }
}

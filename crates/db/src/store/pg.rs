use async_trait::async_trait;
use vidsum_core::analyzer::{ShotDescriptor, SummaryPayload};
use vidsum_core::status::{JobStatus, VideoStatus};
use vidsum_core::types::EntityId;

use super::{ensure_terminal, VideoStore};
use crate::error::StoreError;
use crate::models::job::Job;
use crate::models::shot::Shot;
use crate::models::summary::Summary;
use crate::models::video::{CreateVideo, Video};
use crate::repositories::{ArtifactRepo, Completion, JobRepo, ShotRepo, SummaryRepo, VideoRepo};
use crate::DbPool;

/// PostgreSQL foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";

const UNIQUE_VIOLATION: &str = "23505";

/// [`VideoStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl VideoStore for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_video(&self, input: &CreateVideo) -> Result<Video, StoreError> {
        VideoRepo::create(&self.pool, input).await.map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::Conflict(format!("Video {} already exists", input.id))
            } else {
                StoreError::from(err)
            }
        })
    }

    async fn find_video(&self, id: &str) -> Result<Option<Video>, StoreError> {
        Ok(VideoRepo::find_by_id(&self.pool, id).await?)
    }

    async fn transition_video(
        &self,
        id: &str,
        status: VideoStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError> {
        Ok(VideoRepo::transition(&self.pool, id, status, error).await?)
    }

    async fn delete_video(&self, id: &str) -> Result<bool, StoreError> {
        Ok(VideoRepo::delete(&self.pool, id).await?)
    }

    async fn create_job(&self, video_id: &str) -> Result<Job, StoreError> {
        Ok(JobRepo::create(&self.pool, video_id).await?)
    }

    async fn find_job(&self, id: EntityId) -> Result<Option<Job>, StoreError> {
        Ok(JobRepo::find_by_id(&self.pool, id).await?)
    }

    async fn has_active_job(&self, video_id: &str) -> Result<bool, StoreError> {
        Ok(JobRepo::has_active(&self.pool, video_id).await?)
    }

    async fn next_queued_job(&self) -> Result<Option<Job>, StoreError> {
        Ok(JobRepo::next_queued(&self.pool).await?)
    }

    async fn claim_job(&self, id: EntityId, worker: EntityId) -> Result<bool, StoreError> {
        Ok(JobRepo::claim(&self.pool, id, worker).await?)
    }

    async fn finish_job(
        &self,
        id: EntityId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError> {
        ensure_terminal(status)?;
        Ok(JobRepo::finish(&self.pool, id, status, error).await?)
    }

    async fn fail_interrupted_jobs(&self, reason: &str) -> Result<Vec<Job>, StoreError> {
        Ok(JobRepo::fail_processing(&self.pool, reason).await?)
    }

    async fn complete_job(
        &self,
        job_id: EntityId,
        video_id: &str,
        shots: &[ShotDescriptor],
        summary: &SummaryPayload,
    ) -> Result<(), StoreError> {
        let missing = || StoreError::NotFound {
            entity: "Video",
            id: video_id.to_string(),
        };
        let completion = ArtifactRepo::complete_job(&self.pool, job_id, video_id, shots, summary)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    missing()
                } else if is_unique_violation(&err) {
                    StoreError::Conflict(format!("Summary for video {video_id} already exists"))
                } else {
                    StoreError::from(err)
                }
            })?;
        match completion {
            Completion::Completed => Ok(()),
            Completion::VideoMissing => Err(missing()),
            Completion::JobNotProcessing => Err(StoreError::Conflict(format!(
                "Job {job_id} is no longer processing"
            ))),
            Completion::VideoNotProcessing => Err(StoreError::Conflict(format!(
                "Video {video_id} is no longer processing"
            ))),
        }
    }

    async fn shots_for_video(&self, video_id: &str) -> Result<Vec<Shot>, StoreError> {
        Ok(ShotRepo::list_by_video(&self.pool, video_id).await?)
    }

    async fn summary_for_video(&self, video_id: &str) -> Result<Option<Summary>, StoreError> {
        Ok(SummaryRepo::find_by_video(&self.pool, video_id).await?)
    }
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(code))
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    has_code(err, FOREIGN_KEY_VIOLATION)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    has_code(err, UNIQUE_VIOLATION)
}

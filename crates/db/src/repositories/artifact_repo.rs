//! Records the outcome of one successful analysis run as a single unit.

use sqlx::PgPool;
use vidsum_core::analyzer::{ShotDescriptor, SummaryPayload};
use vidsum_core::status::{JobStatus, VideoStatus};
use vidsum_core::types::EntityId;

use crate::repositories::{JobRepo, ShotRepo, SummaryRepo, VideoRepo};

/// Result of [`ArtifactRepo::complete_job`]. Anything but `Completed`
/// means nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Completed,
    JobNotProcessing,
    VideoNotProcessing,
    VideoMissing,
}

pub struct ArtifactRepo;

impl ArtifactRepo {
    /// In one transaction: mark the job and the video `completed` and insert
    /// every shot plus the summary. Either all of it lands or none does.
    pub async fn complete_job(
        pool: &PgPool,
        job_id: EntityId,
        video_id: &str,
        shots: &[ShotDescriptor],
        summary: &SummaryPayload,
    ) -> Result<Completion, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Returning before commit drops `tx`, which rolls it back.
        if !JobRepo::finish(&mut *tx, job_id, JobStatus::Completed, None).await? {
            return Ok(Completion::JobNotProcessing);
        }
        if !VideoRepo::transition(&mut *tx, video_id, VideoStatus::Completed, None).await? {
            return Ok(if VideoRepo::exists(&mut *tx, video_id).await? {
                Completion::VideoNotProcessing
            } else {
                Completion::VideoMissing
            });
        }

        for shot in shots {
            ShotRepo::insert(&mut *tx, video_id, shot).await?;
        }
        SummaryRepo::insert(&mut *tx, video_id, summary).await?;

        tx.commit().await?;
        Ok(Completion::Completed)
    }
}

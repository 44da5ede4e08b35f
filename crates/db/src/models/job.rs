use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use vidsum_core::status::JobStatus;
use vidsum_core::types::{EntityId, Timestamp, VideoId};

use super::decode_status;

/// A row from the `jobs` table: one processing attempt for a video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: EntityId,
    pub video_id: VideoId,
    pub status: JobStatus,
    pub error: Option<String>,
    /// Scheduler that claimed the job, once claimed.
    pub claimed_by: Option<EntityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for Job {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            video_id: row.try_get("video_id")?,
            status: decode_status(row.try_get("status_id")?, JobStatus::from_id, "job")?,
            error: row.try_get("error")?,
            claimed_by: row.try_get("claimed_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

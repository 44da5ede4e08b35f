//! Repository for the `jobs` table.
//!
//! Jobs are claimed with a conditional `UPDATE ... WHERE status_id = queued`
//! so two pollers can never both move the same job to `processing`. The
//! claimer's ID is stored with the claim, which makes repeating a claim
//! after a lost reply safe.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;
use vidsum_core::status::{JobStatus, StatusId};
use vidsum_core::types::EntityId;

use crate::models::job::Job;

/// Column list for `jobs` queries.
const COLUMNS: &str = "id, video_id, status_id, error, claimed_by, created_at, updated_at";

/// Statuses that still occupy a video.
const ACTIVE_STATUSES: [StatusId; 2] = [JobStatus::Queued as StatusId, JobStatus::Processing as StatusId];

pub struct JobRepo;

impl JobRepo {
    /// Enqueue a job for `video_id`. IDs are UUIDv7 so they sort by creation.
    pub async fn create(pool: &PgPool, video_id: &str) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs (id, video_id, status_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(Uuid::now_v7())
            .bind(video_id)
            .bind(JobStatus::Queued.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: EntityId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether `video_id` has a queued or processing job.
    pub async fn has_active(pool: &PgPool, video_id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM jobs WHERE video_id = $1 AND status_id = ANY($2))",
        )
        .bind(video_id)
        .bind(&ACTIVE_STATUSES[..])
        .fetch_one(pool)
        .await
    }

    /// Oldest queued job, ties broken by ID.
    pub async fn next_queued(pool: &PgPool) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE status_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Queued.id())
            .fetch_optional(pool)
            .await
    }

    /// Move a job from `queued` to `processing` on behalf of `worker`.
    ///
    /// Returns `false` if another poller got there first or the job no longer
    /// exists. A job already claimed by the same `worker` counts as claimed.
    pub async fn claim(pool: &PgPool, id: EntityId, worker: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET status_id = $2, claimed_by = $4, updated_at = NOW() \
             WHERE id = $1 \
               AND (status_id = $3 OR (status_id = $2 AND claimed_by = $4))",
        )
        .bind(id)
        .bind(JobStatus::Processing.id())
        .bind(JobStatus::Queued.id())
        .bind(worker)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a terminal status for a `processing` job. Returns `false` if the
    /// job was not in `processing`.
    pub async fn finish<'e>(
        executor: impl PgExecutor<'e>,
        id: EntityId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE jobs SET status_id = $2, error = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(status.id())
        .bind(error)
        .bind(JobStatus::Processing.id())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fail every job left in `processing`, e.g. after a crash.
    pub async fn fail_processing(pool: &PgPool, reason: &str) -> Result<Vec<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs SET status_id = $1, error = $2, updated_at = NOW() \
             WHERE status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(JobStatus::Failed.id())
            .bind(reason)
            .bind(JobStatus::Processing.id())
            .fetch_all(pool)
            .await
    }
}

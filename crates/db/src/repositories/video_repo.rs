//! Repository for the `videos` table.

use sqlx::{PgExecutor, PgPool};
use vidsum_core::status::VideoStatus;

use crate::models::video::{CreateVideo, Video};

/// Column list for `videos` queries.
const COLUMNS: &str = "id, file_name, status_id, error, created_at, updated_at";

pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video in the `created` state.
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos (id, file_name, status_id) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(&input.id)
            .bind(&input.file_name)
            .bind(VideoStatus::Created.id())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move the video to `status` and set the error text, but only from a
    /// status allowed by [`VideoStatus::can_transition_to`]. Returns `false`
    /// if the row is gone or in a status that cannot move to `status`.
    ///
    /// Clears `error` whenever `error` is `None`, so a retried video does not
    /// keep the message from its previous failure.
    pub async fn transition<'e>(
        executor: impl PgExecutor<'e>,
        id: &str,
        status: VideoStatus,
        error: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE videos SET status_id = $2, error = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = ANY($4)",
        )
        .bind(id)
        .bind(status.id())
        .bind(error)
        .bind(VideoStatus::source_ids(status))
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists<'e>(executor: impl PgExecutor<'e>, id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM videos WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await
    }

    /// Delete a video. Shots and summary go with it via `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

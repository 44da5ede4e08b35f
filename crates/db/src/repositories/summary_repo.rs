//! Repository for the `summaries` table.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use vidsum_core::analyzer::SummaryPayload;

use crate::models::summary::Summary;

/// Column list for `summaries` queries.
const COLUMNS: &str = "id, video_id, bullets_md, paragraph_md, timeline, created_at";

pub struct SummaryRepo;

impl SummaryRepo {
    /// Insert the summary for a video. A second insert for the same video
    /// violates `uq_summaries_video_id`.
    pub async fn insert(
        conn: &mut PgConnection,
        video_id: &str,
        payload: &SummaryPayload,
    ) -> Result<Summary, sqlx::Error> {
        let query = format!(
            "INSERT INTO summaries (id, video_id, bullets_md, paragraph_md, timeline) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Summary>(&query)
            .bind(Uuid::new_v4())
            .bind(video_id)
            .bind(&payload.bullets_md)
            .bind(&payload.paragraph_md)
            .bind(&payload.timeline)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_video(pool: &PgPool, video_id: &str) -> Result<Option<Summary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM summaries WHERE video_id = $1");
        sqlx::query_as::<_, Summary>(&query)
            .bind(video_id)
            .fetch_optional(pool)
            .await
    }
}

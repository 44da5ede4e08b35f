//! Repository for the `shots` table.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use vidsum_core::analyzer::ShotDescriptor;

use crate::models::shot::Shot;

/// Column list for `shots` queries.
const COLUMNS: &str = "id, video_id, start_ms, end_ms, keyframe_path";

pub struct ShotRepo;

impl ShotRepo {
    /// Insert one shot. Called inside the artifact transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        video_id: &str,
        shot: &ShotDescriptor,
    ) -> Result<Shot, sqlx::Error> {
        let query = format!(
            "INSERT INTO shots (id, video_id, start_ms, end_ms, keyframe_path) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Shot>(&query)
            .bind(Uuid::new_v4())
            .bind(video_id)
            .bind(shot.start_ms)
            .bind(shot.end_ms)
            .bind(&shot.keyframe_path)
            .fetch_one(conn)
            .await
    }

    /// All shots for a video ordered by start time.
    pub async fn list_by_video(pool: &PgPool, video_id: &str) -> Result<Vec<Shot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM shots WHERE video_id = $1 ORDER BY start_ms ASC, id ASC"
        );
        sqlx::query_as::<_, Shot>(&query)
            .bind(video_id)
            .fetch_all(pool)
            .await
    }
}

use serde::Serialize;
use sqlx::FromRow;
use vidsum_core::types::{EntityId, Timestamp, VideoId};

/// A row from the `summaries` table. At most one per video.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Summary {
    pub id: EntityId,
    pub video_id: VideoId,
    pub bullets_md: String,
    pub paragraph_md: String,
    pub timeline: serde_json::Value,
    pub created_at: Timestamp,
}

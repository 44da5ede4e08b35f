use serde::Serialize;
use sqlx::FromRow;
use vidsum_core::types::{EntityId, VideoId};

/// A row from the `shots` table. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Shot {
    pub id: EntityId,
    pub video_id: VideoId,
    pub start_ms: i32,
    pub end_ms: i32,
    pub keyframe_path: Option<String>,
}

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use vidsum_core::status::VideoStatus;
use vidsum_core::types::{Timestamp, VideoId};

use super::decode_status;

/// A row from the `videos` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub id: VideoId,
    pub file_name: String,
    pub status: VideoStatus,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl<'r> FromRow<'r, PgRow> for Video {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            file_name: row.try_get("file_name")?,
            status: decode_status(row.try_get("status_id")?, VideoStatus::from_id, "video")?,
            error: row.try_get("error")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Insert DTO for a newly registered video. The ID is derived by the caller.
#[derive(Debug, Clone)]
pub struct CreateVideo {
    pub id: VideoId,
    pub file_name: String,
}

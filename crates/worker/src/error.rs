use std::time::Duration;

use vidsum_core::analyzer::AnalyzerError;
use vidsum_core::status::VideoStatus;
use vidsum_db::StoreError;

/// Why a claimed job ended in `failed`. The `Display` text is what gets
/// recorded on the job and video.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Video {0} not found")]
    VideoMissing(String),

    #[error("Video {video_id} cannot be processed while {status}")]
    InvalidState { video_id: String, status: VideoStatus },

    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalyzerError),

    #[error("Analysis timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),
}

impl ProcessError {
    /// Whether the owning video should be marked `failed` too.
    ///
    /// A missing video has nothing to mark, and a video in a state the job
    /// could not act on belongs to someone else.
    pub fn fails_video(&self) -> bool {
        !matches!(
            self,
            ProcessError::VideoMissing(_) | ProcessError::InvalidState { .. }
        )
    }
}

use std::path::PathBuf;

use async_trait::async_trait;

use super::content::{partition_shots, summarize, ContentCategory};
use super::{AnalysisRequest, AnalysisResult, Analyzer, AnalyzerError};
use crate::{ffmpeg, storage};

/// Reads the real duration of the uploaded file with `ffprobe` and splits
/// it evenly into shots. Summary text still comes from the file-name
/// category; no frames are decoded.
#[derive(Debug, Clone)]
pub struct ProbeAnalyzer {
    storage_root: PathBuf,
    shots_per_video: u32,
}

impl ProbeAnalyzer {
    pub fn new(storage_root: PathBuf, shots_per_video: u32) -> Self {
        Self {
            storage_root,
            shots_per_video,
        }
    }
}

#[async_trait]
impl Analyzer for ProbeAnalyzer {
    fn name(&self) -> &'static str {
        "probe"
    }

    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisResult, AnalyzerError> {
        let path = storage::upload_path(&self.storage_root, request.video_id)
            .map_err(|e| AnalyzerError::InvalidInput(e.to_string()))?;

        let probe = ffmpeg::probe_video(&path).await?;
        let duration_ms = ffmpeg::duration_ms(&probe).ok_or_else(|| {
            AnalyzerError::InvalidInput(format!(
                "could not determine duration of {}",
                path.display()
            ))
        })?;

        let category = ContentCategory::classify(request.file_name);
        tracing::debug!(
            video_id = request.video_id,
            duration_ms,
            format = probe.format.format_name.as_deref().unwrap_or("unknown"),
            "Probed uploaded video",
        );

        Ok(AnalysisResult {
            category,
            duration_ms,
            shots: partition_shots(request.file_name, duration_ms, self.shots_per_video),
            summary: summarize(category, duration_ms),
        })
    }
}

use std::time::Duration;

use async_trait::async_trait;

use super::content::{partition_shots, summarize, ContentCategory, DEFAULT_DURATION_MS};
use super::{AnalysisRequest, AnalysisResult, Analyzer, AnalyzerError};

/// Stand-in analyzer: waits `delay` to mimic decode latency, then returns
/// canned content chosen from the file name over a 30-second nominal
/// duration.
#[derive(Debug, Clone)]
pub struct MockAnalyzer {
    delay: Duration,
    shots_per_video: u32,
}

impl MockAnalyzer {
    pub fn new(delay: Duration, shots_per_video: u32) -> Self {
        Self {
            delay,
            shots_per_video,
        }
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisResult, AnalyzerError> {
        if request.file_name.trim().is_empty() {
            return Err(AnalyzerError::InvalidInput(format!(
                "video {} has no file name",
                request.video_id
            )));
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let category = ContentCategory::classify(request.file_name);
        tracing::debug!(
            video_id = request.video_id,
            category = %category,
            "Mock analysis finished",
        );

        Ok(AnalysisResult {
            category,
            duration_ms: DEFAULT_DURATION_MS,
            shots: partition_shots(request.file_name, DEFAULT_DURATION_MS, self.shots_per_video),
            summary: summarize(category, DEFAULT_DURATION_MS),
        })
    }
}

//! Content analysis: turning a registered video into shots and a summary.
//!
//! The scheduler only sees the [`Analyzer`] trait. Implementations compute
//! artifacts and never persist them.

mod content;
mod mock;
mod probe;

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CoreError;
use crate::ffmpeg::FfmpegError;

pub use content::{partition_shots, summarize, timeline, ContentCategory, DEFAULT_DURATION_MS};
pub use mock::MockAnalyzer;
pub use probe::ProbeAnalyzer;

/// Upper bound on shots per video accepted from configuration.
pub const MAX_SHOTS_PER_VIDEO: u32 = 100;

/// What the analyzer is asked to look at.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub video_id: &'a str,
    pub file_name: &'a str,
}

/// A time-bounded segment, `[start_ms, end_ms)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShotDescriptor {
    pub start_ms: i32,
    pub end_ms: i32,
    pub keyframe_path: Option<String>,
}

/// The three-part textual/structured description of a video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryPayload {
    pub bullets_md: String,
    pub paragraph_md: String,
    pub timeline: serde_json::Value,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub category: ContentCategory,
    pub duration_ms: u32,
    pub shots: Vec<ShotDescriptor>,
    pub summary: SummaryPayload,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("metadata probe failed: {0}")]
    Probe(#[from] FfmpegError),

    #[error("invalid analysis input: {0}")]
    InvalidInput(String),

    #[error("analyzer unavailable: {0}")]
    Unavailable(String),
}

/// Produces analysis artifacts for a video.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisResult, AnalyzerError>;
}

/// Which [`Analyzer`] implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    /// Canned, filename-driven content after a simulated delay.
    Mock,
    /// Real duration from `ffprobe`, canned text.
    Probe,
}

impl FromStr for AnalyzerKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(AnalyzerKind::Mock),
            "probe" => Ok(AnalyzerKind::Probe),
            other => Err(CoreError::Validation(format!(
                "Unknown analyzer '{other}'. Must be one of: mock, probe"
            ))),
        }
    }
}

/// Settings needed to construct any analyzer.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub kind: AnalyzerKind,
    pub simulated_delay: Duration,
    pub shots_per_video: u32,
    pub storage_root: PathBuf,
}

/// Build the configured analyzer.
pub fn build_analyzer(settings: &AnalyzerSettings) -> Arc<dyn Analyzer> {
    match settings.kind {
        AnalyzerKind::Mock => Arc::new(MockAnalyzer::new(
            settings.simulated_delay,
            settings.shots_per_video,
        )),
        AnalyzerKind::Probe => Arc::new(ProbeAnalyzer::new(
            settings.storage_root.clone(),
            settings.shots_per_video,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyzer_kind() {
        assert_eq!("mock".parse::<AnalyzerKind>().unwrap(), AnalyzerKind::Mock);
        assert_eq!(" Probe ".parse::<AnalyzerKind>().unwrap(), AnalyzerKind::Probe);
        assert!("whisper".parse::<AnalyzerKind>().is_err());
    }

    #[test]
    fn builds_the_requested_kind() {
        let mut settings = AnalyzerSettings {
            kind: AnalyzerKind::Mock,
            simulated_delay: Duration::ZERO,
            shots_per_video: 4,
            storage_root: PathBuf::from("/tmp"),
        };
        assert_eq!(build_analyzer(&settings).name(), "mock");
        settings.kind = AnalyzerKind::Probe;
        assert_eq!(build_analyzer(&settings).name(), "probe");
    }
}

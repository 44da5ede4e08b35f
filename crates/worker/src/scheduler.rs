//! The polling job scheduler.
//!
//! One cycle:
//! 1. Pick the oldest queued job and claim it with a conditional update.
//!    A lost claim (another poller won) re-polls straight away.
//! 2. Load the video and move it to `processing`.
//! 3. Run the analyzer, bounded by the optional job timeout.
//! 4. Confirm the video still exists, then persist shots and summary and
//!    mark job and video `completed` in one write.
//!
//! Any failure in steps 2-4 marks the job `failed` (and the video, when it
//! is still `processing`) and the loop carries on. Cancellation is only observed
//! between cycles; an in-flight job always runs to completion.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use vidsum_core::analyzer::{build_analyzer, AnalysisRequest, AnalysisResult, Analyzer};
use vidsum_core::status::{JobStatus, VideoStatus};
use vidsum_core::types::{EntityId, VideoId};
use vidsum_db::models::job::Job;
use vidsum_db::{StoreError, VideoStore};

use crate::config::WorkerConfig;
use crate::error::ProcessError;

/// Claim attempts per cycle before treating the queue as contended and idling.
const MAX_CLAIM_ATTEMPTS: usize = 3;

/// Error recorded on jobs found in `processing` at start-up.
pub const INTERRUPTED_REASON: &str = "interrupted by restart";

/// What a single [`JobScheduler::run_cycle`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No queued job could be claimed.
    Idle,
    /// A job was claimed and driven to a terminal status.
    Processed {
        job_id: EntityId,
        video_id: VideoId,
        status: JobStatus,
    },
}

pub struct JobScheduler {
    /// Recorded on every job this scheduler claims.
    worker_id: EntityId,
    store: Arc<dyn VideoStore>,
    analyzer: Arc<dyn Analyzer>,
    poll_interval: Duration,
    job_timeout: Option<Duration>,
}

impl JobScheduler {
    pub fn new(store: Arc<dyn VideoStore>, analyzer: Arc<dyn Analyzer>, poll_interval: Duration) -> Self {
        Self {
            worker_id: EntityId::new_v4(),
            store,
            analyzer,
            poll_interval,
            job_timeout: None,
        }
    }

    /// Build a scheduler with the analyzer selected by `config`.
    pub fn from_config(store: Arc<dyn VideoStore>, config: &WorkerConfig) -> Self {
        Self::new(store, build_analyzer(&config.analyzer), config.poll_interval)
            .with_job_timeout(config.job_timeout)
    }

    pub fn with_job_timeout(mut self, job_timeout: Option<Duration>) -> Self {
        self.job_timeout = job_timeout;
        self
    }

    pub fn worker_id(&self) -> EntityId {
        self.worker_id
    }

    /// Run until `cancel` fires.
    ///
    /// Jobs left in `processing` by a previous run are failed first, since
    /// nothing will ever finish them.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            worker_id = %self.worker_id,
            analyzer = self.analyzer.name(),
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            job_timeout_ms = self.job_timeout.map(|t| t.as_millis() as u64),
            "Job scheduler started",
        );

        if let Err(e) = self.recover_interrupted().await {
            tracing::error!(error = %e, "Failed to recover interrupted jobs");
        }

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let idle = match self.run_cycle().await {
                Ok(CycleOutcome::Processed { .. }) => false,
                Ok(CycleOutcome::Idle) => true,
                Err(e) => {
                    tracing::error!(error = %e, "Scheduler cycle failed");
                    true
                }
            };

            if idle {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }

        tracing::info!("Job scheduler shutting down");
    }

    /// Fail every job still marked `processing`, along with its video.
    /// Returns how many jobs were recovered.
    pub async fn recover_interrupted(&self) -> Result<usize, StoreError> {
        let jobs = self.store.fail_interrupted_jobs(INTERRUPTED_REASON).await?;
        for job in &jobs {
            tracing::warn!(job_id = %job.id, video_id = %job.video_id, "Failed interrupted job");
            if let Err(e) = self
                .store
                .transition_video(&job.video_id, VideoStatus::Failed, Some(INTERRUPTED_REASON))
                .await
            {
                tracing::error!(
                    job_id = %job.id,
                    video_id = %job.video_id,
                    error = %e,
                    "Failed to mark interrupted video as failed",
                );
            }
        }
        Ok(jobs.len())
    }

    /// Claim and process at most one job.
    ///
    /// Only errors while finding or claiming a job are returned; a job's own
    /// failure is recorded and reported as `Processed` with `Failed`.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, StoreError> {
        for _ in 0..MAX_CLAIM_ATTEMPTS {
            let Some(job) = self.store.next_queued_job().await? else {
                return Ok(CycleOutcome::Idle);
            };

            if !self.store.claim_job(job.id, self.worker_id).await? {
                tracing::debug!(job_id = %job.id, "Job claimed elsewhere, polling again");
                continue;
            }

            let status = self.process_job(&job).await;
            return Ok(CycleOutcome::Processed {
                job_id: job.id,
                video_id: job.video_id,
                status,
            });
        }
        Ok(CycleOutcome::Idle)
    }

    /// Drive a claimed job to a terminal status and return it.
    pub async fn process_job(&self, job: &Job) -> JobStatus {
        tracing::info!(job_id = %job.id, video_id = %job.video_id, "Processing job");
        let started = Instant::now();

        match self.execute(job).await {
            Ok(()) => {
                tracing::info!(
                    job_id = %job.id,
                    video_id = %job.video_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Job completed",
                );
                JobStatus::Completed
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job.id,
                    video_id = %job.video_id,
                    error = %e,
                    "Job failed",
                );
                self.record_failure(job, &e).await;
                JobStatus::Failed
            }
        }
    }

    async fn execute(&self, job: &Job) -> Result<(), ProcessError> {
        let video_id = job.video_id.as_str();
        let missing = || ProcessError::VideoMissing(job.video_id.clone());

        let video = self.store.find_video(video_id).await?.ok_or_else(missing)?;
        if !self
            .store
            .transition_video(video_id, VideoStatus::Processing, None)
            .await?
        {
            // Refused by the state machine, or deleted since the lookup.
            return Err(match self.store.find_video(video_id).await? {
                Some(current) => ProcessError::InvalidState {
                    video_id: current.id,
                    status: current.status,
                },
                None => missing(),
            });
        }

        let result = self
            .analyze(AnalysisRequest {
                video_id,
                file_name: &video.file_name,
            })
            .await?;
        tracing::debug!(
            job_id = %job.id,
            video_id,
            category = %result.category,
            shots = result.shots.len(),
            "Analysis finished",
        );

        // The video may have been deleted while the analyzer ran.
        if self.store.find_video(video_id).await?.is_none() {
            return Err(missing());
        }

        match self
            .store
            .complete_job(job.id, video_id, &result.shots, &result.summary)
            .await
        {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(missing()),
            Err(e) => Err(e.into()),
        }
    }

    async fn analyze(&self, request: AnalysisRequest<'_>) -> Result<AnalysisResult, ProcessError> {
        let analysis = self.analyzer.analyze(request);
        match self.job_timeout {
            Some(limit) => tokio::time::timeout(limit, analysis)
                .await
                .map_err(|_| ProcessError::TimedOut(limit))?
                .map_err(ProcessError::from),
            None => Ok(analysis.await?),
        }
    }

    /// Persist a job failure. Errors here are logged, never propagated.
    async fn record_failure(&self, job: &Job, error: &ProcessError) {
        let message = error.to_string();

        match self
            .store
            .finish_job(job.id, JobStatus::Failed, Some(&message))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(job_id = %job.id, "Job was no longer processing when failing it");
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job.id,
                    video_id = %job.video_id,
                    error = %e,
                    "Failed to record job failure",
                );
            }
        }

        if !error.fails_video() {
            return;
        }
        match self
            .store
            .transition_video(&job.video_id, VideoStatus::Failed, Some(&message))
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    job_id = %job.id,
                    video_id = %job.video_id,
                    "Video is gone or no longer processing, status left as is",
                );
            }
            Err(e) => {
                tracing::error!(
                    job_id = %job.id,
                    video_id = %job.video_id,
                    error = %e,
                    "Failed to record video failure",
                );
            }
        }
    }
}

//! In-process [`VideoStore`] used by tests and `STORE=memory` runs.
//!
//! All state sits behind one async mutex, so every trait method is atomic
//! with respect to the others. Faults can be injected per operation to
//! exercise retry and failure paths without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use vidsum_core::analyzer::{ShotDescriptor, SummaryPayload};
use vidsum_core::status::{JobStatus, VideoStatus};
use vidsum_core::types::EntityId;

use super::{ensure_terminal, VideoStore};
use crate::error::StoreError;
use crate::models::job::Job;
use crate::models::shot::Shot;
use crate::models::summary::Summary;
use crate::models::video::{CreateVideo, Video};

/// Kind of failure an injected fault produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Fails with [`StoreError::Unavailable`], which callers may retry.
    Transient,
    /// Fails with [`StoreError::Internal`].
    Permanent,
    /// Applies the write, then fails with [`StoreError::Unavailable`] as if
    /// the reply was lost. Only `claim_job` honours it.
    Lost,
}

#[derive(Default)]
struct State {
    videos: HashMap<String, Video>,
    jobs: Vec<Job>,
    shots: Vec<Shot>,
    summaries: HashMap<String, Summary>,
    faults: HashMap<&'static str, (Fault, u32)>,
}

impl State {
    /// Consume one pending fault for `operation` that fails before any write.
    fn trip(&mut self, operation: &'static str) -> Result<(), StoreError> {
        match self.faults.get(operation) {
            Some((Fault::Transient | Fault::Permanent, _)) => self.consume(operation),
            _ => Ok(()),
        }
    }

    /// Consume one pending [`Fault::Lost`] for `operation`, after its write.
    fn trip_after_write(&mut self, operation: &'static str) -> Result<(), StoreError> {
        match self.faults.get(operation) {
            Some((Fault::Lost, _)) => self.consume(operation),
            _ => Ok(()),
        }
    }

    fn consume(&mut self, operation: &'static str) -> Result<(), StoreError> {
        let Some((fault, remaining)) = self.faults.get_mut(operation) else {
            return Ok(());
        };
        let fault = *fault;
        *remaining -= 1;
        if *remaining == 0 {
            self.faults.remove(operation);
        }
        Err(match fault {
            Fault::Transient => StoreError::Unavailable(format!("injected fault in {operation}")),
            Fault::Permanent => StoreError::Internal(format!("injected fault in {operation}")),
            Fault::Lost => StoreError::Unavailable(format!("reply lost in {operation}")),
        })
    }

    fn job_mut(&mut self, id: EntityId) -> Option<&mut Job> {
        self.jobs.iter_mut().find(|job| job.id == id)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `times` calls to `operation` fail with `fault`.
    /// `operation` is the [`VideoStore`] method name.
    pub async fn inject_fault(&self, operation: &'static str, fault: Fault, times: u32) {
        let mut state = self.state.lock().await;
        if times == 0 {
            state.faults.remove(operation);
        } else {
            state.faults.insert(operation, (fault, times));
        }
    }

    /// Every job ever enqueued, in insertion order.
    pub async fn jobs(&self) -> Vec<Job> {
        self.state.lock().await.jobs.clone()
    }
}

#[async_trait]
impl VideoStore for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.state.lock().await.trip("health_check")
    }

    async fn create_video(&self, input: &CreateVideo) -> Result<Video, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("create_video")?;
        if state.videos.contains_key(&input.id) {
            return Err(StoreError::Conflict(format!("Video {} already exists", input.id)));
        }
        let now = Utc::now();
        let video = Video {
            id: input.id.clone(),
            file_name: input.file_name.clone(),
            status: VideoStatus::Created,
            error: None,
            created_at: now,
            updated_at: now,
        };
        state.videos.insert(video.id.clone(), video.clone());
        Ok(video)
    }

    async fn find_video(&self, id: &str) -> Result<Option<Video>, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("find_video")?;
        Ok(state.videos.get(id).cloned())
    }

    async fn transition_video(
        &self,
        id: &str,
        status: VideoStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("transition_video")?;
        match state.videos.get_mut(id) {
            Some(video) if video.status.can_transition_to(status) => {
                video.status = status;
                video.error = error.map(str::to_string);
                video.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_video(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("delete_video")?;
        if state.videos.remove(id).is_none() {
            return Ok(false);
        }
        state.shots.retain(|shot| shot.video_id != id);
        state.summaries.remove(id);
        Ok(true)
    }

    async fn create_job(&self, video_id: &str) -> Result<Job, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("create_job")?;
        let now = Utc::now();
        let job = Job {
            id: Uuid::now_v7(),
            video_id: video_id.to_string(),
            status: JobStatus::Queued,
            error: None,
            claimed_by: None,
            created_at: now,
            updated_at: now,
        };
        state.jobs.push(job.clone());
        Ok(job)
    }

    async fn find_job(&self, id: EntityId) -> Result<Option<Job>, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("find_job")?;
        Ok(state.jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn has_active_job(&self, video_id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("has_active_job")?;
        Ok(state
            .jobs
            .iter()
            .any(|job| job.video_id == video_id && !job.status.is_terminal()))
    }

    async fn next_queued_job(&self) -> Result<Option<Job>, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("next_queued_job")?;
        Ok(state
            .jobs
            .iter()
            .filter(|job| job.status == JobStatus::Queued)
            .min_by_key(|job| (job.created_at, job.id))
            .cloned())
    }

    async fn claim_job(&self, id: EntityId, worker: EntityId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("claim_job")?;
        let claimed = match state.job_mut(id) {
            Some(job) if job.status.can_transition_to(JobStatus::Processing) => {
                job.status = JobStatus::Processing;
                job.claimed_by = Some(worker);
                job.updated_at = Utc::now();
                true
            }
            Some(job) => job.status == JobStatus::Processing && job.claimed_by == Some(worker),
            None => false,
        };
        state.trip_after_write("claim_job")?;
        Ok(claimed)
    }

    async fn finish_job(
        &self,
        id: EntityId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError> {
        ensure_terminal(status)?;
        let mut state = self.state.lock().await;
        state.trip("finish_job")?;
        match state.job_mut(id) {
            Some(job) if job.status.can_transition_to(status) => {
                job.status = status;
                job.error = error.map(str::to_string);
                job.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn fail_interrupted_jobs(&self, reason: &str) -> Result<Vec<Job>, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("fail_interrupted_jobs")?;
        let now = Utc::now();
        let mut failed = Vec::new();
        for job in state.jobs.iter_mut().filter(|job| job.status == JobStatus::Processing) {
            job.status = JobStatus::Failed;
            job.error = Some(reason.to_string());
            job.updated_at = now;
            failed.push(job.clone());
        }
        Ok(failed)
    }

    async fn complete_job(
        &self,
        job_id: EntityId,
        video_id: &str,
        shots: &[ShotDescriptor],
        summary: &SummaryPayload,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.trip("complete_job")?;

        // Validate everything before the first write.
        let job_ready = state
            .jobs
            .iter()
            .any(|job| job.id == job_id && job.status.can_transition_to(JobStatus::Completed));
        if !job_ready {
            return Err(StoreError::Conflict(format!(
                "Job {job_id} is no longer processing"
            )));
        }
        match state.videos.get(video_id) {
            None => {
                return Err(StoreError::NotFound {
                    entity: "Video",
                    id: video_id.to_string(),
                })
            }
            Some(video) if !video.status.can_transition_to(VideoStatus::Completed) => {
                return Err(StoreError::Conflict(format!(
                    "Video {video_id} is no longer processing"
                )));
            }
            Some(_) => {}
        }
        if state.summaries.contains_key(video_id) {
            return Err(StoreError::Conflict(format!(
                "Summary for video {video_id} already exists"
            )));
        }
        if let Some(bad) = shots.iter().find(|s| s.start_ms < 0 || s.start_ms >= s.end_ms) {
            return Err(StoreError::Internal(format!(
                "Invalid shot bounds [{}, {})",
                bad.start_ms, bad.end_ms
            )));
        }

        let now = Utc::now();
        if let Some(job) = state.job_mut(job_id) {
            job.status = JobStatus::Completed;
            job.error = None;
            job.updated_at = now;
        }
        if let Some(video) = state.videos.get_mut(video_id) {
            video.status = VideoStatus::Completed;
            video.error = None;
            video.updated_at = now;
        }
        state.shots.extend(shots.iter().map(|shot| Shot {
            id: Uuid::new_v4(),
            video_id: video_id.to_string(),
            start_ms: shot.start_ms,
            end_ms: shot.end_ms,
            keyframe_path: shot.keyframe_path.clone(),
        }));
        state.summaries.insert(
            video_id.to_string(),
            Summary {
                id: Uuid::new_v4(),
                video_id: video_id.to_string(),
                bullets_md: summary.bullets_md.clone(),
                paragraph_md: summary.paragraph_md.clone(),
                timeline: summary.timeline.clone(),
                created_at: now,
            },
        );
        Ok(())
    }

    async fn shots_for_video(&self, video_id: &str) -> Result<Vec<Shot>, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("shots_for_video")?;
        let mut shots: Vec<Shot> = state
            .shots
            .iter()
            .filter(|shot| shot.video_id == video_id)
            .cloned()
            .collect();
        shots.sort_by_key(|shot| shot.start_ms);
        Ok(shots)
    }

    async fn summary_for_video(&self, video_id: &str) -> Result<Option<Summary>, StoreError> {
        let mut state = self.state.lock().await;
        state.trip("summary_for_video")?;
        Ok(state.summaries.get(video_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn new_video(id: &str) -> CreateVideo {
        CreateVideo {
            id: id.to_string(),
            file_name: format!("{id}.mp4"),
        }
    }

    fn payload() -> SummaryPayload {
        SummaryPayload {
            bullets_md: "- one".into(),
            paragraph_md: "para".into(),
            timeline: json!({ "segments": [] }),
        }
    }

    fn shot(start_ms: i32, end_ms: i32) -> ShotDescriptor {
        ShotDescriptor {
            start_ms,
            end_ms,
            keyframe_path: None,
        }
    }

    #[tokio::test]
    async fn duplicate_video_id_conflicts() {
        let store = MemoryStore::new();
        store.create_video(&new_video("a")).await.unwrap();
        let err = store.create_video(&new_video("a")).await.unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));
    }

    const WORKER: EntityId = Uuid::from_u128(7);

    /// A video in `processing` with a claimed job, ready to complete.
    async fn processing(store: &MemoryStore, id: &str) -> Job {
        store.create_video(&new_video(id)).await.unwrap();
        assert!(store.transition_video(id, VideoStatus::Uploaded, None).await.unwrap());
        assert!(store.transition_video(id, VideoStatus::Processing, None).await.unwrap());
        let job = store.create_job(id).await.unwrap();
        assert!(store.claim_job(job.id, WORKER).await.unwrap());
        job
    }

    #[tokio::test]
    async fn claim_only_succeeds_once_per_worker() {
        let store = MemoryStore::new();
        let job = store.create_job("a").await.unwrap();
        assert!(store.claim_job(job.id, WORKER).await.unwrap());
        assert!(store.claim_job(job.id, WORKER).await.unwrap());
        assert!(!store.claim_job(job.id, Uuid::from_u128(8)).await.unwrap());
        assert!(store.has_active_job("a").await.unwrap());
    }

    #[tokio::test]
    async fn finish_requires_processing_and_terminal_status() {
        let store = MemoryStore::new();
        let job = store.create_job("a").await.unwrap();
        assert!(!store.finish_job(job.id, JobStatus::Completed, None).await.unwrap());

        store.claim_job(job.id, WORKER).await.unwrap();
        let err = store.finish_job(job.id, JobStatus::Queued, None).await.unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));

        assert!(store.finish_job(job.id, JobStatus::Failed, Some("boom")).await.unwrap());
        let job = store.find_job(job.id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("boom"));
        assert!(!store.has_active_job("a").await.unwrap());
        assert!(!store.claim_job(job.id, WORKER).await.unwrap());
    }

    #[tokio::test]
    async fn next_queued_is_oldest_first() {
        let store = MemoryStore::new();
        let first = store.create_job("a").await.unwrap();
        let second = store.create_job("b").await.unwrap();

        assert_eq!(store.next_queued_job().await.unwrap().unwrap().id, first.id);
        store.claim_job(first.id, WORKER).await.unwrap();
        assert_eq!(store.next_queued_job().await.unwrap().unwrap().id, second.id);
    }

    #[tokio::test]
    async fn video_transitions_follow_the_state_machine() {
        let store = MemoryStore::new();
        store.create_video(&new_video("a")).await.unwrap();

        assert!(!store.transition_video("a", VideoStatus::Processing, None).await.unwrap());
        assert!(store.transition_video("a", VideoStatus::Uploaded, None).await.unwrap());
        assert!(store.transition_video("a", VideoStatus::Processing, None).await.unwrap());
        // A late upload cannot pull the video back out of processing.
        assert!(!store.transition_video("a", VideoStatus::Uploaded, None).await.unwrap());
        assert!(store.transition_video("a", VideoStatus::Failed, Some("boom")).await.unwrap());

        let video = store.find_video("a").await.unwrap().unwrap();
        assert_eq!(video.status, VideoStatus::Failed);
        assert_eq!(video.error.as_deref(), Some("boom"));
        assert!(!store.transition_video("ghost", VideoStatus::Uploaded, None).await.unwrap());
    }

    #[tokio::test]
    async fn completion_is_all_or_nothing() {
        let store = MemoryStore::new();
        let job = processing(&store, "a").await;

        let err = store
            .complete_job(job.id, "a", &[shot(0, 10), shot(10, 10)], &payload())
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Internal(_));
        let artifacts = store.artifacts_for_video("a").await.unwrap();
        assert!(artifacts.shots.is_empty());
        assert!(artifacts.summary.is_none());
        assert_eq!(store.find_video("a").await.unwrap().unwrap().status, VideoStatus::Processing);
        assert_eq!(store.find_job(job.id).await.unwrap().unwrap().status, JobStatus::Processing);

        store
            .complete_job(job.id, "a", &[shot(10, 20), shot(0, 10)], &payload())
            .await
            .unwrap();
        let shots = store.shots_for_video("a").await.unwrap();
        assert_eq!(shots.iter().map(|s| s.start_ms).collect::<Vec<_>>(), vec![0, 10]);
        assert_eq!(store.find_video("a").await.unwrap().unwrap().status, VideoStatus::Completed);
        assert_eq!(store.find_job(job.id).await.unwrap().unwrap().status, JobStatus::Completed);

        let err = store.complete_job(job.id, "a", &[], &payload()).await.unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));
    }

    #[tokio::test]
    async fn completion_for_missing_video_is_rejected() {
        let store = MemoryStore::new();
        let job = processing(&store, "a").await;
        store.delete_video("a").await.unwrap();

        let err = store.complete_job(job.id, "a", &[shot(0, 1)], &payload()).await.unwrap_err();
        assert_matches!(err, StoreError::NotFound { entity: "Video", .. });
        assert_eq!(store.find_job(job.id).await.unwrap().unwrap().status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn delete_cascades_to_artifacts_but_keeps_jobs() {
        let store = MemoryStore::new();
        let job = processing(&store, "a").await;
        store.complete_job(job.id, "a", &[shot(0, 5)], &payload()).await.unwrap();

        assert!(store.delete_video("a").await.unwrap());
        assert!(!store.delete_video("a").await.unwrap());
        assert!(store.shots_for_video("a").await.unwrap().is_empty());
        assert!(store.summary_for_video("a").await.unwrap().is_none());
        assert_eq!(store.jobs().await.len(), 1);
    }

    #[tokio::test]
    async fn interrupted_jobs_are_failed() {
        let store = MemoryStore::new();
        let running = store.create_job("a").await.unwrap();
        let waiting = store.create_job("b").await.unwrap();
        store.claim_job(running.id, WORKER).await.unwrap();

        let failed = store.fail_interrupted_jobs("restarted").await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].id, running.id);
        let waiting = store.find_job(waiting.id).await.unwrap().unwrap();
        assert_eq!(waiting.status, JobStatus::Queued);
    }

    #[tokio::test]
    async fn injected_faults_are_consumed() {
        let store = MemoryStore::new();
        store.inject_fault("find_video", Fault::Transient, 2).await;

        assert_matches!(store.find_video("a").await, Err(StoreError::Unavailable(_)));
        assert_matches!(store.find_video("a").await, Err(StoreError::Unavailable(_)));
        assert_matches!(store.find_video("a").await, Ok(None));

        store.inject_fault("health_check", Fault::Permanent, 1).await;
        assert_matches!(store.health_check().await, Err(StoreError::Internal(_)));
        assert_matches!(store.health_check().await, Ok(()));
    }
}

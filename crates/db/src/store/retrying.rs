//! Decorator that retries transient [`StoreError`]s with exponential backoff.

use async_trait::async_trait;
use vidsum_core::analyzer::{ShotDescriptor, SummaryPayload};
use vidsum_core::retry::RetryPolicy;
use vidsum_core::status::{JobStatus, VideoStatus};
use vidsum_core::types::EntityId;

use super::VideoStore;
use crate::error::StoreError;
use crate::models::job::Job;
use crate::models::shot::Shot;
use crate::models::summary::Summary;
use crate::models::video::{CreateVideo, Video};

/// Wraps any [`VideoStore`] and retries each call per `policy`.
///
/// Only errors for which [`StoreError::is_transient`] holds are retried;
/// conflicts and missing rows surface on the first attempt.
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: VideoStore> RetryingStore<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<S: VideoStore> VideoStore for RetryingStore<S> {
    async fn health_check(&self) -> Result<(), StoreError> {
        let inner = &self.inner;
        self.policy
            .run("health_check", StoreError::is_transient, move || inner.health_check())
            .await
    }

    async fn create_video(&self, input: &CreateVideo) -> Result<Video, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("create_video", StoreError::is_transient, move || inner.create_video(input))
            .await
    }

    async fn find_video(&self, id: &str) -> Result<Option<Video>, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("find_video", StoreError::is_transient, move || inner.find_video(id))
            .await
    }

    async fn transition_video(
        &self,
        id: &str,
        status: VideoStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("transition_video", StoreError::is_transient, move || {
                inner.transition_video(id, status, error)
            })
            .await
    }

    async fn delete_video(&self, id: &str) -> Result<bool, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("delete_video", StoreError::is_transient, move || inner.delete_video(id))
            .await
    }

    async fn create_job(&self, video_id: &str) -> Result<Job, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("create_job", StoreError::is_transient, move || inner.create_job(video_id))
            .await
    }

    async fn find_job(&self, id: EntityId) -> Result<Option<Job>, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("find_job", StoreError::is_transient, move || inner.find_job(id))
            .await
    }

    async fn has_active_job(&self, video_id: &str) -> Result<bool, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("has_active_job", StoreError::is_transient, move || inner.has_active_job(video_id))
            .await
    }

    async fn next_queued_job(&self) -> Result<Option<Job>, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("next_queued_job", StoreError::is_transient, move || inner.next_queued_job())
            .await
    }

    /// Safe to retry: a replayed claim by the same `worker` still succeeds.
    async fn claim_job(&self, id: EntityId, worker: EntityId) -> Result<bool, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("claim_job", StoreError::is_transient, move || inner.claim_job(id, worker))
            .await
    }

    async fn finish_job(
        &self,
        id: EntityId,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<bool, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("finish_job", StoreError::is_transient, move || {
                inner.finish_job(id, status, error)
            })
            .await
    }

    async fn fail_interrupted_jobs(&self, reason: &str) -> Result<Vec<Job>, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("fail_interrupted_jobs", StoreError::is_transient, move || {
                inner.fail_interrupted_jobs(reason)
            })
            .await
    }

    async fn complete_job(
        &self,
        job_id: EntityId,
        video_id: &str,
        shots: &[ShotDescriptor],
        summary: &SummaryPayload,
    ) -> Result<(), StoreError> {
        let inner = &self.inner;
        self.policy
            .run("complete_job", StoreError::is_transient, move || {
                inner.complete_job(job_id, video_id, shots, summary)
            })
            .await
    }

    async fn shots_for_video(&self, video_id: &str) -> Result<Vec<Shot>, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("shots_for_video", StoreError::is_transient, move || {
                inner.shots_for_video(video_id)
            })
            .await
    }

    async fn summary_for_video(&self, video_id: &str) -> Result<Option<Summary>, StoreError> {
        let inner = &self.inner;
        self.policy
            .run("summary_for_video", StoreError::is_transient, move || {
                inner.summary_for_video(video_id)
            })
            .await
    }
}

//! Repository layer: one zero-sized struct per table.
//!
//! Each method takes an executor (`&PgPool` or a transaction) and returns
//! raw `sqlx::Error`; classification happens in [`crate::store::PgStore`].

pub mod artifact_repo;
pub mod job_repo;
pub mod shot_repo;
pub mod summary_repo;
pub mod video_repo;

pub use artifact_repo::{ArtifactRepo, Completion};
pub use job_repo::JobRepo;
pub use shot_repo::ShotRepo;
pub use summary_repo::SummaryRepo;
pub use video_repo::VideoRepo;

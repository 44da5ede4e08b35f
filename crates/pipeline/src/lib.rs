//! Video lifecycle: registration, upload storage and job enqueueing.
//!
//! [`VideoManager`] is the only component that creates videos and jobs and
//! moves videos between `created` and `uploaded`. Everything past that is
//! the worker's business.

pub mod error;
pub mod manager;
pub mod upload;

pub use error::LifecycleError;
pub use manager::{upload_url, video_url, Registration, VideoDetails, VideoManager};
pub use upload::UploadStore;

use vidsum_core::error::CoreError;
use vidsum_db::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),

    #[error("Upload storage failed: {0}")]
    Upload(#[source] std::io::Error),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => LifecycleError::NotFound { entity, id },
            StoreError::Conflict(msg) => LifecycleError::Conflict(msg),
            other => LifecycleError::Store(other),
        }
    }
}

impl From<CoreError> for LifecycleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => LifecycleError::NotFound { entity, id },
            CoreError::Validation(msg) => LifecycleError::Validation(msg),
            CoreError::Conflict(msg) => LifecycleError::Conflict(msg),
            CoreError::Internal(msg) => LifecycleError::Store(StoreError::Internal(msg)),
        }
    }
}

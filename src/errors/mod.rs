use thiserror::Error;
use uuid::Uuid;

/// Persistence failures. The one class the engine surfaces to callers
/// as-is instead of absorbing into a degraded result.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Snapshot not found: {snapshot_id}")]
    SnapshotNotFound { snapshot_id: Uuid },

    #[error("Storage backend failure: {message}")]
    Backend { message: String },
}

/// Failures talking to the external completion service. NotConfigured is a
/// degraded-mode signal, not an error condition for the engine.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Completion service not configured")]
    NotConfigured,

    #[error("Completion transport failure: {message}")]
    Transport { message: String },

    #[error("Completion service returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Transport {
            message: err.to_string(),
        }
    }
}

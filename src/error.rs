//! Error types for the pipeline engine and its store boundary

use thiserror::Error;

/// Failure reported by the authoritative store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Other(err.into())
    }
}

/// Errors surfaced by pipeline operations. Every variant is recoverable:
/// the worst outcome is a stale or rolled-back cache.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Lead {lead_id} is closed and locked in the pipeline")]
    LockedStage { lead_id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("No candidates match quick-select filter '{filter}'")]
    NoCandidates { filter: String },

    #[error("{action} failed: {source}")]
    Remote {
        action: String,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    pub fn validation(message: impl Into<String>) -> Self {
        PipelineError::Validation(message.into())
    }

    pub fn remote(action: impl Into<String>, source: StoreError) -> Self {
        PipelineError::Remote {
            action: action.into(),
            source,
        }
    }

    /// True for errors caused by the store rather than by user input
    pub fn is_remote(&self) -> bool {
        matches!(self, PipelineError::Remote { .. })
    }
}

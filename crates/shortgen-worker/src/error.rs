//! Worker error types.

use thiserror::Error;

use crate::ai::AiError;

/// Result type for worker operations.
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that can occur while processing a job.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("AI capability error: {0}")]
    Ai(#[from] AiError),

    #[error("Media error: {0}")]
    Media(#[from] shortgen_media::MediaError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    /// Create a job failure error.
    pub fn job_failed(message: impl Into<String>) -> Self {
        Self::JobFailed(message.into())
    }

    /// Create a transcription failure error.
    pub fn transcription_failed(message: impl Into<String>) -> Self {
        Self::TranscriptionFailed(message.into())
    }

    /// Create a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Whether retrying the whole job could help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WorkerError::Ai(AiError::RateLimited(_)) | WorkerError::Ai(AiError::Transport(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(WorkerError::from(AiError::RateLimited("429".into())).is_retryable());
        assert!(WorkerError::from(AiError::Transport("reset".into())).is_retryable());
        assert!(!WorkerError::from(AiError::InvalidResponse("bad json".into())).is_retryable());
        assert!(!WorkerError::job_failed("boom").is_retryable());
    }
}

//! Capability interfaces for transcription and text generation.
//!
//! Both external services hide behind traits so the extraction engine and
//! pipeline can be exercised with deterministic fakes.

pub mod openai;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use shortgen_models::TranscriptSegment;

pub use openai::OpenAiClient;

/// Errors surfaced by the AI capabilities.
#[derive(Debug, Error)]
pub enum AiError {
    /// Provider signalled a rate limit (HTTP 429 or equivalent).
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Network or provider-side failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response arrived but was not usable.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AiError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, AiError::RateLimited(_))
    }
}

/// Request for one text completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Ask the provider for a JSON-biased response mode where supported.
    pub json_response: bool,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.7,
            max_tokens: None,
            json_response: false,
        }
    }

    pub fn with_json_response(mut self) -> Self {
        self.json_response = true;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError>;
}

/// Transcription output: flattened text plus timed segments.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
}

/// Speech-to-text capability.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription, AiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_builder() {
        let request = CompletionRequest::new("sys", "user")
            .with_json_response()
            .with_max_tokens(2048)
            .with_temperature(0.2);
        assert!(request.json_response);
        assert_eq!(request.max_tokens, Some(2048));
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rate_limit_classification() {
        assert!(AiError::RateLimited("429".into()).is_rate_limit());
        assert!(!AiError::Transport("reset".into()).is_rate_limit());
    }
}

//! OpenAI-compatible implementations of the capability traits.

use std::path::Path;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{AiError, CompletionRequest, Transcriber, TextGenerator, Transcription};
use shortgen_models::TranscriptSegment;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-1106";
const DEFAULT_WHISPER_MODEL: &str = "whisper-1";

/// Client for OpenAI-style chat-completions and transcription endpoints.
pub struct OpenAiClient {
    api_key: String,
    chat_model: String,
    whisper_model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        whisper_model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            chat_model: chat_model.into(),
            whisper_model: whisper_model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a client from `OPENAI_API_KEY` and the optional model overrides
    /// `SHORTGEN_CHAT_MODEL` / `SHORTGEN_WHISPER_MODEL`.
    pub fn from_env() -> Result<Self, AiError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AiError::Config("OPENAI_API_KEY is not set".to_string()))?;
        let chat_model = std::env::var("SHORTGEN_CHAT_MODEL")
            .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string());
        let whisper_model = std::env::var("SHORTGEN_WHISPER_MODEL")
            .unwrap_or_else(|_| DEFAULT_WHISPER_MODEL.to_string());
        Ok(Self::new(api_key, chat_model, whisper_model))
    }

    /// Override the API base URL (for proxies and tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::RateLimited(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Transport(format!("HTTP {status}: {body}")));
        }
        Ok(response)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        let mut body = json!({
            "model": self.chat_model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user},
            ],
            "temperature": request.temperature,
        });
        if request.json_response {
            body["response_format"] = json!({"type": "json_object"});
        }
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        debug!(model = %self.chat_model, "Requesting completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;
        let response = Self::check_response(response).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::InvalidResponse("Completion had no choices".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
}

#[async_trait]
impl Transcriber for OpenAiClient {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcription, AiError> {
        let bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| AiError::Transport(format!("Reading {}: {e}", audio_path.display())))?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        debug!(model = %self.whisper_model, file = %file_name, "Requesting transcription");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")
            .map_err(|e| AiError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.whisper_model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AiError::Transport(e.to_string()))?;
        let response = Self::check_response(response).await?;

        let parsed: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;

        Ok(Transcription {
            text: parsed.text,
            segments: parsed
                .segments
                .into_iter()
                .map(|s| TranscriptSegment::new(s.start, s.end, s.text.trim()))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_transcription_parsing() {
        let raw = r#"{
            "text": "hello world",
            "segments": [
                {"start": 0.0, "end": 1.2, "text": " hello "},
                {"start": 1.2, "end": 2.4, "text": "world"}
            ]
        }"#;
        let parsed: VerboseTranscription = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text, "hello world");
        assert_eq!(parsed.segments.len(), 2);
    }

    #[test]
    fn test_transcription_without_segments() {
        let parsed: VerboseTranscription = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
        assert!(parsed.segments.is_empty());
    }
}

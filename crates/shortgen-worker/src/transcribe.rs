//! Audio transcription with large-file chunking.
//!
//! Small files go up in one request; anything over the upload cap is cut
//! into 10-minute mp3 chunks whose segment timestamps get the chunk offset
//! added back before merging.

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use shortgen_models::{Transcript, TranscriptSegment};

use crate::ai::{AiError, Transcriber, Transcription};
use crate::error::WorkerResult;

/// Practical single-upload cap of the transcription endpoint.
pub const MAX_SINGLE_UPLOAD_BYTES: u64 = 24 * 1024 * 1024;
/// Span of each audio chunk in seconds.
const CHUNK_SPAN_SECS: f64 = 600.0;
/// Attempts per chunk when the provider rate-limits.
const MAX_CHUNK_ATTEMPTS: u32 = 3;
/// Base backoff in seconds, multiplied by the attempt number.
const RATE_LIMIT_BACKOFF_SECS: u64 = 20;
/// Pause between chunk uploads.
const CHUNK_PACING_SECS: u64 = 2;

/// Transcribe an audio file, chunking when it exceeds the upload cap.
pub async fn transcribe_audio(
    transcriber: &dyn Transcriber,
    audio_path: &Path,
    audio_duration: f64,
) -> WorkerResult<Transcript> {
    let size = tokio::fs::metadata(audio_path).await?.len();
    if size > MAX_SINGLE_UPLOAD_BYTES {
        info!(
            size_mb = size / (1024 * 1024),
            "Audio exceeds single-upload cap, transcribing in chunks"
        );
        transcribe_chunked(transcriber, audio_path, audio_duration).await
    } else {
        let result = transcribe_with_retry(transcriber, audio_path).await?;
        Ok(Transcript::from_segments(result.segments))
    }
}

async fn transcribe_chunked(
    transcriber: &dyn Transcriber,
    audio_path: &Path,
    audio_duration: f64,
) -> WorkerResult<Transcript> {
    let mut segments: Vec<TranscriptSegment> = Vec::new();
    let mut offset = 0.0;
    let mut chunk_num = 1u32;

    while offset < audio_duration {
        let span = CHUNK_SPAN_SECS.min(audio_duration - offset);

        // Tempfile scope guarantees the chunk is removed on every path.
        let chunk_file = tempfile::Builder::new()
            .prefix("audio_chunk_")
            .suffix(".mp3")
            .tempfile()?;
        shortgen_media::audio::extract_audio_span(audio_path, chunk_file.path(), offset, span)
            .await?;

        match transcribe_with_retry(transcriber, chunk_file.path()).await {
            Ok(result) => {
                for seg in result.segments {
                    segments.push(TranscriptSegment::new(
                        seg.start + offset,
                        seg.end + offset,
                        seg.text,
                    ));
                }
            }
            Err(e) => {
                warn!(chunk = chunk_num, error = %e, "Chunk transcription failed, skipping");
            }
        }

        offset += CHUNK_SPAN_SECS;
        chunk_num += 1;
        if offset < audio_duration {
            tokio::time::sleep(Duration::from_secs(CHUNK_PACING_SECS)).await;
        }
    }

    info!(segments = segments.len(), "Chunked transcription complete");
    Ok(Transcript::from_segments(segments))
}

/// One transcription call with rate-limit backoff. Non-rate-limit errors
/// surface immediately.
async fn transcribe_with_retry(
    transcriber: &dyn Transcriber,
    audio_path: &Path,
) -> Result<Transcription, AiError> {
    let mut attempt = 0u32;
    loop {
        match transcriber.transcribe(audio_path).await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_rate_limit() && attempt + 1 < MAX_CHUNK_ATTEMPTS => {
                attempt += 1;
                let wait = RATE_LIMIT_BACKOFF_SECS * attempt as u64;
                warn!(attempt, wait_secs = wait, "Rate limited during transcription, backing off");
                tokio::time::sleep(Duration::from_secs(wait)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

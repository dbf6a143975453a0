//! Timed transcript models and time-span chunking.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One timed utterance from the transcription capability.
///
/// Upstream does not guarantee non-overlapping segments; consumers must
/// tolerate overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Start time in seconds from the beginning of the source video.
    pub start: f64,
    /// End time in seconds (greater than `start`).
    pub end: f64,
    /// Spoken text of this segment.
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A full transcript: ordered segments plus the flattened text.
///
/// Immutable once produced; shared read-only by moment extraction,
/// subtitle windowing and title generation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    pub text: String,
}

impl Transcript {
    /// Build a transcript from segments, deriving the flattened text.
    pub fn from_segments(segments: Vec<TranscriptSegment>) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self { segments, text }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Partition into fixed time windows tiling `[0, video_duration)`.
    ///
    /// A segment belongs to a window only when fully contained in it
    /// (`start >= lo && end <= hi`), so segments straddling a window
    /// boundary are dropped from both sides. Windows holding no segments
    /// are skipped.
    pub fn chunk(&self, span_secs: f64, video_duration: f64) -> Vec<TranscriptChunk> {
        let mut chunks = Vec::new();
        if span_secs <= 0.0 {
            return chunks;
        }

        let mut lo = 0.0;
        while lo < video_duration {
            let hi = (lo + span_secs).min(video_duration);
            let segments: Vec<TranscriptSegment> = self
                .segments
                .iter()
                .filter(|s| s.start >= lo && s.end <= hi)
                .cloned()
                .collect();
            if !segments.is_empty() {
                chunks.push(TranscriptChunk {
                    window_start: lo,
                    window_end: hi,
                    segments,
                });
            }
            lo = hi;
        }
        chunks
    }
}

/// One time window of a chunked transcript.
#[derive(Debug, Clone)]
pub struct TranscriptChunk {
    /// Window start in seconds.
    pub window_start: f64,
    /// Window end in seconds.
    pub window_end: f64,
    /// Segments fully contained in the window.
    pub segments: Vec<TranscriptSegment>,
}

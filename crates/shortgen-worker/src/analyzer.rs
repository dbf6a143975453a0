//! Moment extraction engine.
//!
//! Turns a transcript into candidate viral moments through the
//! text-generation capability. Transcripts inside the token budget are
//! analyzed in one call; larger ones go window by window and the results
//! are re-merged.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use shortgen_models::{
    dedup_overlapping, DurationPolicy, Moment, Transcript, TranscriptChunk, TranscriptSegment,
};

use crate::ai::{AiError, CompletionRequest, TextGenerator};
use crate::error::WorkerResult;

/// Token budget for single-pass analysis, against the 4-chars-per-token
/// heuristic over the serialized segments.
pub const DEFAULT_TOKEN_BUDGET: usize = 10_000;
/// Span of each analysis window for over-budget transcripts.
const ANALYSIS_WINDOW_SECS: f64 = 600.0;
/// Windows holding more than this many segments are subsampled.
const SAMPLE_THRESHOLD: usize = 100;
/// Stride used when subsampling an oversized window.
const SAMPLE_STRIDE: usize = 3;
/// At most this many segments are serialized into a window prompt.
const MAX_PROMPT_SEGMENTS: usize = 80;
/// Attempts per window when the provider rate-limits.
const MAX_WINDOW_ATTEMPTS: u32 = 3;
/// Base backoff in seconds, multiplied by the attempt number.
const RATE_LIMIT_BACKOFF_SECS: u64 = 10;

const SINGLE_PASS_SYSTEM: &str = "You are an expert at creating viral social media content. \
Analyze each moment individually, using only the text spoken between that moment's start_time \
and end_time. Key phrases and captions must reflect only what is said in that specific span. \
Respond only with valid JSON and no additional text.";

const WINDOW_SYSTEM: &str =
    "You are a viral content analyst. Respond only with valid JSON and no additional text.";

/// Finds candidate viral moments in a transcript.
pub struct MomentAnalyzer<'a> {
    generator: &'a dyn TextGenerator,
    token_budget: usize,
}

impl<'a> MomentAnalyzer<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self {
            generator,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }

    pub fn with_token_budget(mut self, token_budget: usize) -> Self {
        self.token_budget = token_budget;
        self
    }

    /// Find candidate moments for the whole video.
    ///
    /// Every returned moment has been normalized against the policy and the
    /// video bounds. A response that fails to decode yields synthetic
    /// fallback moments instead of failing the job; transport errors
    /// surface to the caller.
    pub async fn find_viral_moments(
        &self,
        transcript: &Transcript,
        video_duration: f64,
        policy: DurationPolicy,
    ) -> WorkerResult<Vec<Moment>> {
        let serialized = serde_json::to_string(&transcript.segments)?;
        let estimated_tokens = serialized.len() / 4;

        if estimated_tokens < self.token_budget {
            info!(estimated_tokens, "Analyzing transcript in a single pass");
            self.find_single_pass(transcript, video_duration, policy)
                .await
        } else {
            info!(
                estimated_tokens,
                budget = self.token_budget,
                "Transcript over token budget, analyzing in windows"
            );
            self.find_windowed(transcript, video_duration, policy).await
        }
    }

    async fn find_single_pass(
        &self,
        transcript: &Transcript,
        video_duration: f64,
        policy: DurationPolicy,
    ) -> WorkerResult<Vec<Moment>> {
        let request = CompletionRequest::new(
            SINGLE_PASS_SYSTEM,
            build_single_pass_prompt(&transcript.segments, video_duration, policy)?,
        )
        .with_json_response();

        let raw = self.generator.complete(request).await?;
        let mut moments = match parse_moments(&raw) {
            Ok(moments) => moments,
            Err(e) => {
                warn!(error = %e, "Moment response was not decodable, using fallback moments");
                fallback_moments(transcript, video_duration)
            }
        };

        for moment in &mut moments {
            moment.normalize(policy, video_duration);
        }
        info!(count = moments.len(), "Found viral moments");
        Ok(moments)
    }

    async fn find_windowed(
        &self,
        transcript: &Transcript,
        video_duration: f64,
        policy: DurationPolicy,
    ) -> WorkerResult<Vec<Moment>> {
        let mut collected: Vec<Moment> = Vec::new();

        for (i, chunk) in transcript
            .chunk(ANALYSIS_WINDOW_SECS, video_duration)
            .into_iter()
            .enumerate()
        {
            let window = i + 1;
            debug!(
                window,
                start = chunk.window_start,
                end = chunk.window_end,
                segments = chunk.segments.len(),
                "Analyzing window"
            );

            let request = CompletionRequest::new(WINDOW_SYSTEM, build_window_prompt(&chunk, policy)?)
                .with_json_response()
                .with_max_tokens(2048);

            match self.complete_with_retry(request).await {
                Ok(raw) => match parse_moments(&raw) {
                    Ok(moments) => {
                        info!(window, count = moments.len(), "Window produced moments");
                        collected.extend(moments);
                    }
                    Err(e) => warn!(window, error = %e, "Window response unusable, skipping"),
                },
                // One window failing never aborts the others.
                Err(e) => warn!(window, error = %e, "Window analysis failed, skipping"),
            }
        }

        for moment in &mut collected {
            moment.normalize(policy, video_duration);
        }
        let kept = dedup_overlapping(collected);
        info!(count = kept.len(), "Unique moments after merging windows");
        Ok(kept)
    }

    async fn complete_with_retry(&self, request: CompletionRequest) -> Result<String, AiError> {
        let mut attempt = 0u32;
        loop {
            match self.generator.complete(request.clone()).await {
                Ok(raw) => return Ok(raw),
                Err(e) if e.is_rate_limit() && attempt + 1 < MAX_WINDOW_ATTEMPTS => {
                    attempt += 1;
                    let wait = RATE_LIMIT_BACKOFF_SECS * attempt as u64;
                    warn!(attempt, wait_secs = wait, "Rate limited during analysis, backing off");
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct MomentsResponse {
    #[serde(default)]
    moments: Vec<Moment>,
}

/// Decode a `{"moments": [...]}` payload, tolerating conversational text
/// around the JSON object.
fn parse_moments(raw: &str) -> Result<Vec<Moment>, AiError> {
    let trimmed = trim_to_json_object(raw);
    let parsed: MomentsResponse =
        serde_json::from_str(trimmed).map_err(|e| AiError::InvalidResponse(e.to_string()))?;
    Ok(parsed.moments)
}

/// Slice from the first `{` to the last `}`.
fn trim_to_json_object(raw: &str) -> &str {
    let raw = raw.trim();
    match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if end > start => &raw[start..=end],
        _ => raw,
    }
}

/// Synthetic moments used when the capability responds with unusable JSON:
/// the opening of the video, plus a mid-video moment for longer sources.
fn fallback_moments(transcript: &Transcript, video_duration: f64) -> Vec<Moment> {
    if transcript.is_empty() {
        return Vec::new();
    }

    let mut moments = vec![Moment {
        start_time: 0.0,
        end_time: 45.0_f64.min(video_duration),
        title: "Opening moment".to_string(),
        description: "Clip from the start of the video".to_string(),
        score: 70,
        key_phrases: vec!["opening moment".to_string()],
        social_copy: Some("🎬 Check out this moment!\n\n#viral #shorts #content".to_string()),
    }];

    if video_duration > 60.0 {
        let midpoint = (video_duration / 2.0).floor();
        moments.push(Moment {
            start_time: (midpoint - 20.0).max(0.0),
            end_time: (midpoint + 25.0).min(video_duration),
            title: "Highlight moment".to_string(),
            description: "Clip from the middle of the video".to_string(),
            score: 70,
            key_phrases: vec!["highlight".to_string()],
            social_copy: Some("🔥 Don't miss this!\n\n#viral #shorts #content".to_string()),
        });
    }

    moments
}

fn build_single_pass_prompt(
    segments: &[TranscriptSegment],
    video_duration: f64,
    policy: DurationPolicy,
) -> WorkerResult<String> {
    let serialized = serde_json::to_string(segments)?;
    Ok(format!(
        r#"Analyze this video transcript and find ALL the interesting, viral-worthy moments for short-form clips.

Transcript with timestamps:
{serialized}

Total video duration: {video_duration:.0} seconds

IMPORTANT CRITERIA:
1. Each moment must run {range}
2. Find ALL the good moments, there is no quantity limit
3. Look for strong hooks in the first 3 seconds, valuable or surprising content, and satisfying payoffs
4. Moments must NOT overlap
5. Prefer self-contained moments that work without context

For each moment also write a social caption that talks specifically about that clip's content, hooks from the first line, uses topical emojis, stays short (2-4 lines) and ends with 3-5 hashtags relevant to the clip.

Respond ONLY with a valid JSON object in this format:
{{
  "moments": [
    {{
      "start_time": 10.5,
      "end_time": {example_end:.1},
      "title": "Specific title about WHAT IS SAID in this moment",
      "description": "What exactly is discussed in this span",
      "score": 95,
      "key_phrases": ["SHORT DIRECT VIRAL PHRASE FROM THE CONTENT (max 5-8 words)", "another key phrase"],
      "social_copy": "🔥 [specific hook]\n\n[phrase from the clip]\n\n#tag1 #tag2 #tag3"
    }}
  ]
}}

The FIRST key phrase is shown as large on-screen text: keep it short and direct (max 5-8 words) and take it ONLY from the text spoken between that moment's start_time and end_time.

Generate as many moments as you find (minimum 2, maximum 15). Quality over quantity.
Make sure the JSON is valid and every timestamp lies between 0 and {video_duration:.0} seconds."#,
        range = policy.prompt_range(),
        example_end = policy.example_end(),
    ))
}

fn build_window_prompt(chunk: &TranscriptChunk, policy: DurationPolicy) -> WorkerResult<String> {
    let sampled = sample_for_prompt(&chunk.segments);
    let serialized = serde_json::to_string(&sampled)?;
    Ok(format!(
        r#"Find the 1-3 most viral-worthy moments in this section of a video transcript.

Section: {start:.0}s to {end:.0}s
Transcript segments:
{serialized}

Each moment must run {range} and lie entirely between {start:.0} and {end:.0} seconds.
Also write a short social caption for each moment (2-4 lines, topical emojis, 3-5 relevant hashtags).

Respond ONLY with a valid JSON object:
{{
  "moments": [
    {{
      "start_time": {start:.1},
      "end_time": {example_end:.1},
      "title": "Specific title about what is said",
      "description": "What is discussed",
      "score": 90,
      "key_phrases": ["SHORT VIRAL PHRASE (max 5-8 words)"],
      "social_copy": "🔥 [hook]\n\n#tag1 #tag2 #tag3"
    }}
  ]
}}"#,
        start = chunk.window_start,
        end = chunk.window_end,
        range = policy.prompt_range(),
        example_end = chunk.window_start + policy.example_end(),
    ))
}

/// Subsample an oversized window so the prompt stays within budget.
fn sample_for_prompt(segments: &[TranscriptSegment]) -> Vec<&TranscriptSegment> {
    let sampled: Vec<&TranscriptSegment> = if segments.len() > SAMPLE_THRESHOLD {
        segments.iter().step_by(SAMPLE_STRIDE).collect()
    } else {
        segments.iter().collect()
    };
    sampled.into_iter().take(MAX_PROMPT_SEGMENTS).collect()
}

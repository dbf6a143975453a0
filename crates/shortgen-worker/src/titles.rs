//! Viral overlay titles for rendered shorts.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use shortgen_models::Transcript;

use crate::ai::{CompletionRequest, TextGenerator};

const TITLE_SYSTEM: &str =
    "You write short, punchy on-screen titles for social media clips. Respond with the title only.";

/// Titles longer than this many words wrap onto two lines.
const MAX_SINGLE_LINE_WORDS: usize = 4;

/// Language for generated overlay titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleLanguage {
    /// Match the language of the clip.
    #[default]
    Auto,
    Spanish,
    English,
}

impl TitleLanguage {
    fn instruction(&self) -> &'static str {
        match self {
            TitleLanguage::Auto => "Write the title in the same language as the text.",
            TitleLanguage::Spanish => "Write the title in Spanish.",
            TitleLanguage::English => "Write the title in English.",
        }
    }
}

impl fmt::Display for TitleLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TitleLanguage::Auto => "auto",
            TitleLanguage::Spanish => "es",
            TitleLanguage::English => "en",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TitleLanguage {
    type Err = TitleLanguageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(TitleLanguage::Auto),
            "es" | "spanish" => Ok(TitleLanguage::Spanish),
            "en" | "english" => Ok(TitleLanguage::English),
            _ => Err(TitleLanguageParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown title language: {0}, expected 'auto', 'es' or 'en'")]
pub struct TitleLanguageParseError(String);

/// Collect the spoken text overlapping `[start_time, end_time]`.
///
/// Any partial overlap qualifies, matching the subtitle windowing rule.
/// Returns `None` when nothing was spoken in the window.
pub fn extract_segment_text(
    transcript: &Transcript,
    start_time: f64,
    end_time: f64,
) -> Option<String> {
    let mut collected = String::new();
    for segment in &transcript.segments {
        let overlaps = (segment.start >= start_time && segment.start < end_time)
            || (segment.end > start_time && segment.end <= end_time)
            || (segment.start <= start_time && segment.end >= end_time);
        if !overlaps {
            continue;
        }
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }
        if !collected.is_empty() {
            collected.push(' ');
        }
        collected.push_str(text);
    }
    if collected.is_empty() {
        None
    } else {
        Some(collected)
    }
}

/// Wrap a title of more than four words onto two lines at the word midpoint.
pub fn wrap_title(title: &str) -> String {
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.len() > MAX_SINGLE_LINE_WORDS {
        let mid = words.len() / 2;
        format!("{}\n{}", words[..mid].join(" "), words[mid..].join(" "))
    } else {
        words.join(" ")
    }
}

fn build_title_prompt(segment_text: &str, language: TitleLanguage) -> String {
    format!(
        "Write one attention-grabbing title (maximum 8 words) for a short clip where this is said:\n\n\
         \"{segment_text}\"\n\n\
         {}\nNo quotes, no hashtags, no explanation. Title only.",
        language.instruction()
    )
}

/// Ask the text-generation capability for an on-screen title.
///
/// Returns `None` on any failure so callers can fall back to key phrases.
pub async fn generate_viral_title(
    generator: &dyn TextGenerator,
    segment_text: &str,
    language: TitleLanguage,
) -> Option<String> {
    let request = CompletionRequest::new(TITLE_SYSTEM, build_title_prompt(segment_text, language))
        .with_max_tokens(50);

    match generator.complete(request).await {
        Ok(raw) => {
            let title = raw.trim().trim_matches('"').trim_matches('\'').trim();
            if title.is_empty() {
                None
            } else {
                Some(wrap_title(title))
            }
        }
        Err(e) => {
            warn!(error = %e, "Viral title generation failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use async_trait::async_trait;
    use shortgen_models::TranscriptSegment;

    struct FixedGenerator(Option<String>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, AiError> {
            match &self.0 {
                Some(response) => Ok(response.clone()),
                None => Err(AiError::Transport("down".to_string())),
            }
        }
    }

    fn transcript() -> Transcript {
        Transcript::from_segments(vec![
            TranscriptSegment::new(0.0, 10.0, "before"),
            TranscriptSegment::new(15.0, 25.0, "starts inside"),
            TranscriptSegment::new(25.0, 70.0, "spans the whole window"),
            TranscriptSegment::new(80.0, 90.0, "after"),
        ])
    }

    #[test]
    fn test_extract_segment_text_overlap_rules() {
        let text = extract_segment_text(&transcript(), 20.0, 60.0).unwrap();
        assert_eq!(text, "starts inside spans the whole window");
    }

    #[test]
    fn test_extract_segment_text_empty_window() {
        assert!(extract_segment_text(&transcript(), 71.0, 79.0).is_none());
    }

    #[test]
    fn test_wrap_title_short_untouched() {
        assert_eq!(wrap_title("FOUR WORD TITLE HERE"), "FOUR WORD TITLE HERE");
    }

    #[test]
    fn test_wrap_title_long_splits_two_lines() {
        assert_eq!(
            wrap_title("THIS SECRET CHANGED MY LIFE FOREVER"),
            "THIS SECRET CHANGED\nMY LIFE FOREVER"
        );
    }

    #[tokio::test]
    async fn test_generated_title_trimmed_and_wrapped() {
        let generator =
            FixedGenerator(Some("\"NOBODY EXPECTED THIS SHOCKING ENDING\"".to_string()));
        let title = generate_viral_title(&generator, "some text", TitleLanguage::Auto)
            .await
            .unwrap();
        assert_eq!(title, "NOBODY EXPECTED\nTHIS SHOCKING ENDING");
    }

    #[tokio::test]
    async fn test_generation_failure_returns_none() {
        let generator = FixedGenerator(None);
        assert!(
            generate_viral_title(&generator, "some text", TitleLanguage::English)
                .await
                .is_none()
        );
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("auto".parse::<TitleLanguage>().unwrap(), TitleLanguage::Auto);
        assert_eq!("ES".parse::<TitleLanguage>().unwrap(), TitleLanguage::Spanish);
        assert_eq!("en".parse::<TitleLanguage>().unwrap(), TitleLanguage::English);
        assert!("fr".parse::<TitleLanguage>().is_err());
    }
}

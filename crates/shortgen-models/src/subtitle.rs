//! Subtitle cues and transcript windowing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;

/// Words per display line when a long utterance is re-flowed.
pub const WORDS_PER_CUE: usize = 7;
/// Utterances up to this many words stay as a single cue.
pub const MAX_SINGLE_CUE_WORDS: usize = 8;

/// One display cue, timestamped relative to the clip start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubtitleCue {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Map the transcript onto the clip `[start_time, end_time]` and re-flow
/// long utterances into short display lines.
///
/// A segment is included when it lies fully inside the window or straddles
/// either edge. Included segments are re-based to clip-relative time and
/// clamped to the clip bounds. Text over 8 words splits into 7-word groups
/// whose spans are proportional to word count; the last group is clamped to
/// the segment end.
pub fn window_subtitles(transcript: &Transcript, start_time: f64, end_time: f64) -> Vec<SubtitleCue> {
    let mut cues = Vec::new();

    for segment in &transcript.segments {
        let inside = segment.start >= start_time && segment.end <= end_time;
        let straddles_start = segment.start <= start_time && segment.end >= start_time;
        let straddles_end = segment.start <= end_time && segment.end >= end_time;
        if !(inside || straddles_start || straddles_end) {
            continue;
        }

        let cue_start = (segment.start - start_time).max(0.0);
        let cue_end = (segment.end - start_time).min(end_time - start_time);

        let text = segment.text.trim();
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        if words.len() <= MAX_SINGLE_CUE_WORDS {
            cues.push(SubtitleCue {
                start: cue_start,
                end: cue_end,
                text: words.join(" "),
            });
        } else {
            let per_word = (cue_end - cue_start) / words.len() as f64;
            let mut current = cue_start;
            for group in words.chunks(WORDS_PER_CUE) {
                let group_end = current + group.len() as f64 * per_word;
                cues.push(SubtitleCue {
                    start: current,
                    end: group_end.min(cue_end),
                    text: group.join(" "),
                });
                current = group_end;
            }
        }
    }

    cues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptSegment;

    fn transcript(segments: Vec<(f64, f64, &str)>) -> Transcript {
        Transcript::from_segments(
            segments
                .into_iter()
                .map(|(s, e, t)| TranscriptSegment::new(s, e, t))
                .collect(),
        )
    }

    #[test]
    fn test_short_segment_single_cue() {
        let t = transcript(vec![(12.0, 15.0, "just a few words here")]);
        let cues = window_subtitles(&t, 10.0, 60.0);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].start, 2.0);
        assert_eq!(cues[0].end, 5.0);
        assert_eq!(cues[0].text, "just a few words here");
    }

    #[test]
    fn test_long_segment_reflows_proportionally() {
        // 15 words over 9 seconds: groups of 7, 7 and 1 at 0.6s per word.
        let text = "w1 w2 w3 w4 w5 w6 w7 w8 w9 w10 w11 w12 w13 w14 w15";
        let t = transcript(vec![(0.0, 9.0, text)]);
        let cues = window_subtitles(&t, 0.0, 9.0);
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].text.split_whitespace().count(), 7);
        assert_eq!(cues[1].text.split_whitespace().count(), 7);
        assert_eq!(cues[2].text.split_whitespace().count(), 1);
        assert!((cues[0].start - 0.0).abs() < 1e-9);
        assert!((cues[0].end - 4.2).abs() < 1e-9);
        assert!((cues[1].start - 4.2).abs() < 1e-9);
        assert!((cues[1].end - 8.4).abs() < 1e-9);
        assert!((cues[2].end - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_straddling_segments_included_and_clamped() {
        let t = transcript(vec![
            (8.0, 12.0, "straddles the start"),
            (20.0, 25.0, "fully inside"),
            (58.0, 63.0, "straddles the end"),
            (70.0, 75.0, "outside"),
        ]);
        let cues = window_subtitles(&t, 10.0, 60.0);
        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[0].end, 2.0);
        assert_eq!(cues[2].start, 48.0);
        assert_eq!(cues[2].end, 50.0);
    }

    #[test]
    fn test_windowing_is_deterministic() {
        let t = transcript(vec![
            (0.0, 5.0, "a b c d e f g h i j"),
            (5.0, 9.0, "short line"),
        ]);
        let first = window_subtitles(&t, 0.0, 9.0);
        let second = window_subtitles(&t, 0.0, 9.0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_whitespace_only_segment_skipped() {
        let t = transcript(vec![(1.0, 2.0, "   ")]);
        assert!(window_subtitles(&t, 0.0, 10.0).is_empty());
    }
}

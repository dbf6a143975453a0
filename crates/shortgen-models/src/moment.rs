//! Candidate viral moments and duration policies.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Acceptable clip-length bounds for one extraction run.
///
/// A policy is passed explicitly into every extraction call; one policy
/// applies to the whole run, never per-moment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DurationPolicy {
    /// Minimum clip length in seconds.
    pub min: f64,
    /// Maximum clip length in seconds.
    pub max: f64,
    /// Preferred clip length in seconds.
    pub optimal: f64,
}

impl DurationPolicy {
    /// Short-form preset: 35-60s clips aiming for 50s.
    pub const fn short() -> Self {
        Self {
            min: 35.0,
            max: 60.0,
            optimal: 50.0,
        }
    }

    /// Long-form preset: 70-90s clips aiming for 80s.
    pub const fn long() -> Self {
        Self {
            min: 70.0,
            max: 90.0,
            optimal: 80.0,
        }
    }

    /// Human-readable range for extraction prompts.
    pub fn prompt_range(&self) -> String {
        format!(
            "{:.0}-{:.0} seconds (ideal: {:.0}-{:.0} seconds)",
            self.min,
            self.max,
            self.optimal - 5.0,
            self.optimal + 5.0
        )
    }

    /// Example end timestamp used in prompt templates.
    pub fn example_end(&self) -> f64 {
        self.optimal + 5.0
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self::short()
    }
}

impl FromStr for DurationPolicy {
    type Err = DurationPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(Self::short()),
            "long" => Ok(Self::long()),
            _ => Err(DurationPolicyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown duration preset: {0}, expected 'short' or 'long'")]
pub struct DurationPolicyParseError(String);

/// A candidate short-form clip: time range plus narrative metadata.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Moment {
    /// Clip start in seconds from the beginning of the source video.
    pub start_time: f64,
    /// Clip end in seconds.
    pub end_time: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Relevance score from the extraction capability (0-100).
    #[serde(default)]
    pub score: u8,
    /// Key phrases; the first one doubles as the on-screen phrase.
    #[serde(default)]
    pub key_phrases: Vec<String>,
    /// Ready-to-post caption. Synthesized during normalization when the
    /// capability omits it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_copy: Option<String>,
}

impl Moment {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// True when the half-open time ranges intersect.
    pub fn overlaps(&self, other: &Moment) -> bool {
        self.start_time < other.end_time && self.end_time > other.start_time
    }

    /// Correct the duration against the policy and the video bounds.
    ///
    /// A negative start is lifted to zero first, shifting the window while
    /// keeping its length. Then checks run in order: too short snaps to the
    /// optimal length, too long clamps to the maximum, and durations less
    /// than 5s above the minimum also snap to optimal. A moment pushed past
    /// the end of the video is pulled back to finish exactly at
    /// `video_duration`. Missing social copy is synthesized from the title
    /// and description.
    pub fn normalize(&mut self, policy: DurationPolicy, video_duration: f64) {
        if self.start_time < 0.0 {
            self.end_time = (self.end_time - self.start_time).min(video_duration);
            self.start_time = 0.0;
        }

        let duration = self.duration();
        if duration < policy.min {
            self.end_time = (self.start_time + policy.optimal).min(video_duration);
        } else if duration > policy.max {
            self.end_time = self.start_time + policy.max;
        } else if duration < policy.min + 5.0 {
            self.end_time = (self.start_time + policy.optimal).min(video_duration);
        }

        if self.end_time > video_duration {
            self.end_time = video_duration;
            self.start_time = (video_duration - policy.optimal).max(0.0);
        }

        if self
            .social_copy
            .as_deref()
            .map_or(true, |c| c.trim().is_empty())
        {
            self.social_copy = Some(default_social_copy(&self.title, &self.description));
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:.1}s-{:.1}s] {} (score {})",
            self.start_time, self.end_time, self.title, self.score
        )
    }
}

/// Fixed-template caption used when the capability returns no social copy.
pub fn default_social_copy(title: &str, description: &str) -> String {
    format!(
        "🎯 {title}\n\n{description}\n\n💬 What do you think? Comment below 👇\n\n#viral #content #shorts"
    )
}

/// Rank by score descending and greedily keep non-overlapping moments.
pub fn dedup_overlapping(mut moments: Vec<Moment>) -> Vec<Moment> {
    moments.sort_by(|a, b| b.score.cmp(&a.score));
    let mut kept: Vec<Moment> = Vec::new();
    for moment in moments {
        if !kept.iter().any(|k| k.overlaps(&moment)) {
            kept.push(moment);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moment(start: f64, end: f64, score: u8) -> Moment {
        Moment {
            start_time: start,
            end_time: end,
            title: "t".to_string(),
            description: "d".to_string(),
            score,
            key_phrases: vec![],
            social_copy: None,
        }
    }

    #[test]
    fn test_normalize_short_snaps_to_optimal() {
        // 10s moment under the short policy lands at the optimal 50s.
        let mut m = moment(10.0, 20.0, 90);
        m.normalize(DurationPolicy::short(), 3600.0);
        assert_eq!(m.start_time, 10.0);
        assert_eq!(m.end_time, 60.0);
    }

    #[test]
    fn test_normalize_too_long_clamps_to_max() {
        let mut m = moment(100.0, 300.0, 90);
        m.normalize(DurationPolicy::short(), 3600.0);
        assert_eq!(m.end_time, 160.0);
    }

    #[test]
    fn test_normalize_near_minimum_snaps_to_optimal() {
        // 37s is inside [min, min+5): snaps to optimal, not left alone.
        let mut m = moment(100.0, 137.0, 90);
        m.normalize(DurationPolicy::short(), 3600.0);
        assert_eq!(m.end_time, 150.0);
    }

    #[test]
    fn test_normalize_acceptable_duration_untouched() {
        let mut m = moment(100.0, 145.0, 90);
        m.normalize(DurationPolicy::short(), 3600.0);
        assert_eq!(m.start_time, 100.0);
        assert_eq!(m.end_time, 145.0);
    }

    #[test]
    fn test_normalize_clamps_to_video_end() {
        // An acceptable duration running past the end pulls the whole
        // moment back to finish exactly at the video bound.
        let mut m = moment(70.0, 120.0, 90);
        m.normalize(DurationPolicy::short(), 100.0);
        assert_eq!(m.end_time, 100.0);
        assert_eq!(m.start_time, 50.0);
    }

    #[test]
    fn test_normalize_snap_is_limited_by_video_end() {
        // Snapping to optimal is capped at the video duration; the clip
        // just ends early instead of shifting its start.
        let mut m = moment(80.0, 90.0, 90);
        m.normalize(DurationPolicy::short(), 100.0);
        assert_eq!(m.start_time, 80.0);
        assert_eq!(m.end_time, 100.0);
    }

    #[test]
    fn test_normalize_lifts_negative_start() {
        // A window starting before zero shifts forward, keeping its length.
        let mut m = moment(-10.0, 40.0, 90);
        m.normalize(DurationPolicy::short(), 3600.0);
        assert_eq!(m.start_time, 0.0);
        assert_eq!(m.end_time, 50.0);
    }

    #[test]
    fn test_normalize_negative_start_respects_video_end() {
        let mut m = moment(-10.0, 40.0, 90);
        m.normalize(DurationPolicy::short(), 45.0);
        assert!(m.start_time >= 0.0);
        assert!(m.end_time <= 45.0);
    }

    #[test]
    fn test_normalize_synthesizes_social_copy() {
        let mut m = moment(0.0, 50.0, 90);
        m.normalize(DurationPolicy::short(), 3600.0);
        let copy = m.social_copy.unwrap();
        assert!(copy.contains("t"));
        assert!(copy.contains("#viral"));
    }

    #[test]
    fn test_normalize_keeps_existing_social_copy() {
        let mut m = moment(0.0, 50.0, 90);
        m.social_copy = Some("custom".to_string());
        m.normalize(DurationPolicy::short(), 3600.0);
        assert_eq!(m.social_copy.unwrap(), "custom");
    }

    #[test]
    fn test_long_policy_bounds() {
        let mut m = moment(0.0, 30.0, 90);
        m.normalize(DurationPolicy::long(), 3600.0);
        assert_eq!(m.end_time, 80.0);
    }

    #[test]
    fn test_overlap_half_open() {
        // Touching endpoints do not overlap.
        assert!(!moment(0.0, 50.0, 1).overlaps(&moment(50.0, 100.0, 1)));
        assert!(moment(0.0, 50.0, 1).overlaps(&moment(49.0, 100.0, 1)));
    }

    #[test]
    fn test_dedup_keeps_highest_score() {
        let kept = dedup_overlapping(vec![
            moment(0.0, 50.0, 70),
            moment(40.0, 90.0, 95),
            moment(100.0, 150.0, 80),
        ]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].score, 95);
        assert_eq!(kept[1].score, 80);
        for i in 0..kept.len() {
            for j in (i + 1)..kept.len() {
                assert!(!kept[i].overlaps(&kept[j]));
            }
        }
    }

    #[test]
    fn test_duration_policy_parse() {
        assert_eq!(
            "short".parse::<DurationPolicy>().unwrap(),
            DurationPolicy::short()
        );
        assert_eq!(
            "LONG".parse::<DurationPolicy>().unwrap(),
            DurationPolicy::long()
        );
        assert!("medium".parse::<DurationPolicy>().is_err());
    }
}

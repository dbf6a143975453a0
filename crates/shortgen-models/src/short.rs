//! Rendered short metadata.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata for one rendered vertical short.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RenderedShort {
    /// 1-based position within the job.
    pub index: u32,
    pub filename: String,
    pub title: String,
    pub description: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub score: u8,
    pub social_copy: String,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl RenderedShort {
    /// Deterministic output filename for a job/index pair.
    pub fn output_filename(job_id: &str, index: u32) -> String {
        format!("short_{job_id}_{index}.mp4")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_filename() {
        assert_eq!(
            RenderedShort::output_filename("abc123", 2),
            "short_abc123_2.mp4"
        );
    }
}

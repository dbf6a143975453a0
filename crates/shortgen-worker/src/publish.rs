//! Publishing collaborator interface.
//!
//! The actual uploader lives outside this crate; the pipeline only needs
//! the `publish` seam plus the pure caption/hashtag preparation.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;

use crate::error::WorkerResult;

/// Seed tags attached to every published short.
pub const DEFAULT_HASHTAGS: &[&str] = &["viral", "fyp", "shorts", "tiktok"];
/// Most platforms bury posts with too many tags.
pub const MAX_HASHTAGS: usize = 5;

/// Upload collaborator for rendered shorts.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload one rendered short. Returns whether the upload succeeded.
    async fn publish(
        &self,
        video_path: &Path,
        caption: &str,
        hashtags: &[String],
    ) -> WorkerResult<bool>;
}

/// Harvest hashtags for a short: the defaults first, then tags mined from
/// lines of the social copy starting with `#`, deduplicated in order and
/// capped at [`MAX_HASHTAGS`].
pub fn collect_hashtags(social_copy: &str) -> Vec<String> {
    let mut tags: Vec<String> = DEFAULT_HASHTAGS.iter().map(|t| t.to_string()).collect();

    for line in social_copy.lines() {
        let line = line.trim();
        if !line.starts_with('#') {
            continue;
        }
        for token in line.split_whitespace() {
            if let Some(tag) = token.strip_prefix('#') {
                if !tag.is_empty() {
                    tags.push(tag.to_string());
                }
            }
        }
    }

    let mut seen = HashSet::new();
    tags.retain(|t| seen.insert(t.clone()));
    tags.truncate(MAX_HASHTAGS);
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_copy_has_no_tags() {
        let tags = collect_hashtags("great clip, watch it!");
        assert_eq!(tags, vec!["viral", "fyp", "shorts", "tiktok"]);
    }

    #[test]
    fn test_tags_mined_from_hash_lines_only() {
        let copy = "Amazing reveal #notcounted inline\n#comedy #standup";
        let tags = collect_hashtags(copy);
        assert_eq!(tags, vec!["viral", "fyp", "shorts", "tiktok", "comedy"]);
    }

    #[test]
    fn test_dedup_preserves_order_and_caps() {
        let copy = "#viral #fresh #fyp #more #extra";
        let tags = collect_hashtags(copy);
        assert_eq!(tags.len(), MAX_HASHTAGS);
        assert_eq!(tags, vec!["viral", "fyp", "shorts", "tiktok", "fresh"]);
    }
}

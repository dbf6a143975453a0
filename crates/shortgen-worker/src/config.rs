//! Worker configuration.

use std::path::PathBuf;

use crate::analyzer::DEFAULT_TOKEN_BUDGET;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory for transient artifacts (extracted audio, chunks)
    pub work_dir: PathBuf,
    /// Directory receiving rendered shorts and thumbnails
    pub output_dir: PathBuf,
    /// Token budget for single-pass moment extraction
    pub token_budget: usize,
    /// Watermark image path override (None resolves the default locations)
    pub watermark_path: Option<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("outputs"),
            token_budget: DEFAULT_TOKEN_BUDGET,
            watermark_path: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("SHORTGEN_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("temp")),
            output_dir: std::env::var("SHORTGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("outputs")),
            token_budget: std::env::var("SHORTGEN_TOKEN_BUDGET")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_BUDGET),
            watermark_path: std::env::var("SHORTGEN_WATERMARK").ok(),
        }
    }
}

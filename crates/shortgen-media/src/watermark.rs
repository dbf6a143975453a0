//! Watermark asset resolution.
//!
//! The watermark is composited by the layout planner via the `movie` source
//! filter; a missing asset is never fatal, the plan just degrades to the
//! plain geometry.

use std::path::Path;
use tracing::debug;

/// Environment variable overriding the watermark asset path.
pub const WATERMARK_PATH_ENV: &str = "SHORTGEN_WATERMARK";

/// Default watermark asset path.
pub const DEFAULT_WATERMARK_PATH: &str = "assets/watermark.png";

/// Development fallback paths to check.
const DEV_WATERMARK_PATHS: &[&str] = &[
    "./assets/watermark.png",
    "../assets/watermark.png",
];

/// Watermark overlay configuration.
#[derive(Debug, Clone)]
pub struct WatermarkConfig {
    /// Path to the watermark image (PNG with transparency)
    pub image_path: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            image_path: resolve_watermark_path(),
        }
    }
}

impl WatermarkConfig {
    /// Create config with a custom image path.
    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = path.into();
        self
    }

    /// Check if the watermark image exists.
    pub fn is_available(&self) -> bool {
        !self.image_path.is_empty() && Path::new(&self.image_path).exists()
    }
}

/// Resolve the watermark path: env override, then default, then dev fallbacks.
fn resolve_watermark_path() -> String {
    if let Ok(path) = std::env::var(WATERMARK_PATH_ENV) {
        return path;
    }

    if Path::new(DEFAULT_WATERMARK_PATH).exists() {
        return DEFAULT_WATERMARK_PATH.to_string();
    }

    for path in DEV_WATERMARK_PATHS {
        if Path::new(path).exists() {
            debug!(path = path, "Found watermark at dev fallback path");
            return path.to_string();
        }
    }

    // Missing asset degrades gracefully at plan time
    DEFAULT_WATERMARK_PATH.to_string()
}

/// Escape a path for use inside an FFmpeg filter expression.
pub fn escape_filter_path(path: &str) -> String {
    path.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
}

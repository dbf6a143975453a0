//! Encoding configuration for rendered shorts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Canvas width for vertical shorts.
pub const CANVAS_WIDTH: u32 = 1080;
/// Canvas height for vertical shorts.
pub const CANVAS_HEIGHT: u32 = 1920;

/// Thumbnail output width (height follows the aspect ratio).
pub const THUMBNAIL_SCALE_WIDTH: u32 = 480;
/// Timestamp the thumbnail frame is taken at.
pub const THUMBNAIL_TIMESTAMP: &str = "00:00:01";

/// Video/audio encoding settings for the render pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_crf")]
    pub crf: u8,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
    #[serde(default = "default_audio_sample_rate")]
    pub audio_sample_rate: u32,
    /// Move the moov atom to the front for streaming playback.
    #[serde(default = "default_faststart")]
    pub faststart: bool,
}

fn default_codec() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_crf() -> u8 {
    23
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_bitrate() -> String {
    "192k".to_string()
}

fn default_audio_sample_rate() -> u32 {
    44_100
}

fn default_faststart() -> bool {
    true
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: default_codec(),
            preset: default_preset(),
            crf: default_crf(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
            audio_sample_rate: default_audio_sample_rate(),
            faststart: default_faststart(),
        }
    }
}

impl EncodingConfig {
    /// Output-side FFmpeg arguments for this configuration.
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
            "-ar".to_string(),
            self.audio_sample_rate.to_string(),
        ];
        if self.faststart {
            args.push("-movflags".to_string());
            args.push("+faststart".to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoding_args() {
        let args = EncodingConfig::default().to_ffmpeg_args();
        let joined = args.join(" ");
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-preset medium"));
        assert!(joined.contains("-crf 23"));
        assert!(joined.contains("-c:a aac"));
        assert!(joined.contains("-b:a 192k"));
        assert!(joined.contains("-ar 44100"));
        assert!(joined.contains("-movflags +faststart"));
    }

    #[test]
    fn test_faststart_disabled() {
        let config = EncodingConfig {
            faststart: false,
            ..Default::default()
        };
        assert!(!config.to_ffmpeg_args().contains(&"-movflags".to_string()));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: EncodingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EncodingConfig::default());
    }
}

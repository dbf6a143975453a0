//! Audio extraction for transcription.
//!
//! The transcription capability wants 16kHz mono mp3; chunk pieces are
//! re-encoded at a lower bitrate to stay under the upload cap.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Sample rate for transcription audio.
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;

/// Extract the full audio track as 16kHz mono mp3.
///
/// The output name is derived from a hash of the source path so repeated
/// runs against the same source reuse one slot.
pub async fn extract_audio(video_path: &Path, out_dir: &Path) -> MediaResult<PathBuf> {
    if !video_path.exists() {
        return Err(MediaError::FileNotFound(video_path.to_path_buf()));
    }
    tokio::fs::create_dir_all(out_dir).await?;

    let mut hasher = DefaultHasher::new();
    video_path.hash(&mut hasher);
    let audio_path = out_dir.join(format!("audio_{:08x}.mp3", hasher.finish() as u32));

    info!(
        source = %video_path.display(),
        target = %audio_path.display(),
        "Extracting audio for transcription"
    );

    let cmd = FfmpegCommand::new(video_path, &audio_path).output_args([
        "-vn",
        "-acodec",
        "libmp3lame",
        "-ar",
        "16000",
        "-ac",
        "1",
        "-b:a",
        "128k",
    ]);

    FfmpegRunner::new().run(&cmd).await?;
    Ok(audio_path)
}

/// Extract one time span of an audio file as 64kbps mono mp3.
///
/// Used to split oversized audio into uploadable chunks.
pub async fn extract_audio_span(
    audio_path: &Path,
    out_path: &Path,
    start_secs: f64,
    duration_secs: f64,
) -> MediaResult<()> {
    if !audio_path.exists() {
        return Err(MediaError::FileNotFound(audio_path.to_path_buf()));
    }

    let cmd = FfmpegCommand::new(audio_path, out_path)
        .seek(start_secs)
        .duration(duration_secs)
        .output_args(["-acodec", "libmp3lame", "-ac", "1", "-b:a", "64k"]);

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_command_args() {
        let cmd = FfmpegCommand::new("audio.mp3", "chunk.mp3")
            .seek(600.0)
            .duration(600.0)
            .output_args(["-acodec", "libmp3lame", "-ac", "1", "-b:a", "64k"]);
        let args = cmd.build_args();
        assert!(args.contains(&"600.000".to_string()));
        assert!(args.contains(&"64k".to_string()));
    }
}

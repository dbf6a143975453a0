//! Render driver: cut, compose and burn subtitles in one FFmpeg pass.

use std::path::Path;
use tracing::info;

use shortgen_models::{EncodingConfig, SubtitleCue};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::layout::LayoutPlan;
use crate::subtitle::write_ass_file;

/// Render one short: seek to `[start_time, end_time)`, apply the layout
/// plan's filter graph with subtitles appended last, and encode.
///
/// The subtitle definition lives in a tempfile-scoped `.ass` artifact that
/// is removed on every exit path, including errors.
pub async fn render_short(
    input: &Path,
    output: &Path,
    start_time: f64,
    end_time: f64,
    cues: &[SubtitleCue],
    plan: &LayoutPlan,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }
    let duration = end_time - start_time;
    if duration <= 0.0 {
        return Err(MediaError::internal(format!(
            "Non-positive clip duration: {start_time}..{end_time}"
        )));
    }

    info!(
        input = %input.display(),
        output = %output.display(),
        start = start_time,
        duration,
        mode = %plan.mode,
        cues = cues.len(),
        "Rendering short"
    );

    let mut ass_guard = None;
    let filter = if cues.is_empty() {
        plan.filter_graph.clone()
    } else {
        let ass = tempfile::Builder::new()
            .prefix("subs_")
            .suffix(".ass")
            .tempfile()?;
        write_ass_file(cues, ass.path()).await?;
        let graph = plan.filter_graph_with_subtitles(&ass.path().to_string_lossy());
        ass_guard = Some(ass);
        graph
    };

    let cmd = FfmpegCommand::new(input, output)
        .seek(start_time)
        .duration(duration)
        .filter_complex(filter)
        .output_args(encoding.to_ffmpeg_args());

    let result = FfmpegRunner::new().run(&cmd).await;
    drop(ass_guard);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortgen_models::LayoutMode;

    use crate::watermark::WatermarkConfig;

    #[tokio::test]
    async fn test_missing_input_is_rejected() {
        let wm = WatermarkConfig::default().with_image_path("/nonexistent.png");
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Full, None, &wm);
        let result = render_short(
            Path::new("/nonexistent/input.mp4"),
            Path::new("/tmp/out.mp4"),
            0.0,
            10.0,
            &[],
            &plan,
            &EncodingConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_non_positive_duration_is_rejected() {
        let wm = WatermarkConfig::default().with_image_path("/nonexistent.png");
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Full, None, &wm);
        let input = tempfile::NamedTempFile::new().unwrap();
        let result = render_short(
            input.path(),
            Path::new("/tmp/out.mp4"),
            10.0,
            10.0,
            &[],
            &plan,
            &EncodingConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(MediaError::Internal(_))));
    }
}

//! Layout compositor for the 9:16 canvas.
//!
//! Produces a [`LayoutPlan`]: the FFmpeg filter graph for one render pass
//! plus the structured geometry (bands, crop, overlays) behind it, so
//! callers can inspect the plan without running FFmpeg.

use shortgen_models::encoding::{CANVAS_HEIGHT, CANVAS_WIDTH};
use shortgen_models::LayoutMode;
use tracing::debug;

use crate::watermark::{escape_filter_path, WatermarkConfig};

/// Height of the top band reserved for the watermark in full mode.
pub const WATERMARK_BAND_HEIGHT: u32 = 280;
/// Height of the bottom band reserved for subtitles in full mode.
pub const SUBTITLE_BAND_HEIGHT: u32 = 240;
/// Height of the middle content band in full mode.
pub const CONTENT_BAND_HEIGHT: u32 = CANVAS_HEIGHT - WATERMARK_BAND_HEIGHT - SUBTITLE_BAND_HEIGHT;

/// Height of each stacked region in split mode.
pub const SPLIT_REGION_HEIGHT: u32 = CANVAS_HEIGHT / 2;

/// Watermark width in full mode.
const FULL_WATERMARK_WIDTH: u32 = 300;
/// Watermark width on the split-mode seam.
const SPLIT_WATERMARK_WIDTH: u32 = 80;
/// Vertical position of the full-mode watermark.
const FULL_WATERMARK_Y: u32 = 100;
/// The split-mode watermark sits this far above the seam.
const SPLIT_WATERMARK_LIFT: u32 = 40;

/// Vertical position of the caption overlay.
const CAPTION_Y: u32 = 530;
/// Caption font size.
const CAPTION_FONT_SIZE: u32 = 50;

/// Top-region crop takes this fraction of the source width.
const SPLIT_CROP_WIDTH_RATIO: f64 = 0.50;
/// Top-region crop takes this fraction of the source height.
const SPLIT_CROP_HEIGHT_RATIO: f64 = 0.35;

/// Sources within this relative tolerance of 9:16 skip the band geometry.
const ASPECT_TOLERANCE: f64 = 0.05;

/// Vertical band heights for the full-mode canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bands {
    pub watermark: u32,
    pub content: u32,
    pub subtitle: u32,
}

/// Source-space crop region for the split-mode top view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// One overlay element of a plan.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Watermark { x: u32, y: u32, width: u32 },
    Caption { text: String, y: u32 },
}

/// Computed geometry and filter graph for one render call.
#[derive(Debug, Clone)]
pub struct LayoutPlan {
    pub mode: LayoutMode,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Band geometry; `None` when the source already fills the canvas.
    pub bands: Option<Bands>,
    /// Split-mode top crop; `None` in full mode.
    pub split_top_crop: Option<CropRegion>,
    pub overlays: Vec<Overlay>,
    /// Filter graph ending in an open chain so subtitles can be appended.
    pub filter_graph: String,
}

impl LayoutPlan {
    /// Plan the composition for one source geometry.
    ///
    /// A configured but missing watermark degrades to the plain geometry
    /// instead of failing the plan.
    pub fn build(
        source_width: u32,
        source_height: u32,
        mode: LayoutMode,
        viral_text: Option<&str>,
        watermark: &WatermarkConfig,
    ) -> Self {
        let watermark_path = if watermark.is_available() {
            Some(watermark.image_path.as_str())
        } else {
            debug!(
                watermark = %watermark.image_path,
                "Watermark asset unavailable, composing without it"
            );
            None
        };

        match mode {
            LayoutMode::Full => plan_full(source_width, source_height, viral_text, watermark_path),
            LayoutMode::Split => plan_split(source_width, source_height, watermark_path),
        }
    }

    /// The filter graph with burned-in subtitles appended as the last stage.
    pub fn filter_graph_with_subtitles(&self, ass_path: &str) -> String {
        format!("{},ass='{}'", self.filter_graph, escape_filter_path(ass_path))
    }
}

fn plan_full(
    source_width: u32,
    source_height: u32,
    viral_text: Option<&str>,
    watermark_path: Option<&str>,
) -> LayoutPlan {
    let target_ratio = CANVAS_WIDTH as f64 / CANVAS_HEIGHT as f64;
    let current_ratio = source_width as f64 / source_height.max(1) as f64;
    let aspect_ok = (current_ratio - target_ratio).abs() < target_ratio * ASPECT_TOLERANCE;

    let mut overlays = Vec::new();
    let mut chains: Vec<String> = Vec::new();

    // Already-vertical sources fill the canvas directly; everything else is
    // shrunk to fit the content band and boxed into the three-band geometry.
    let (bands, base) = if aspect_ok {
        (
            None,
            format!("[0:v]scale={CANVAS_WIDTH}:{CANVAS_HEIGHT}:flags=lanczos"),
        )
    } else if watermark_path.is_some() {
        (
            Some(Bands {
                watermark: WATERMARK_BAND_HEIGHT,
                content: CONTENT_BAND_HEIGHT,
                subtitle: SUBTITLE_BAND_HEIGHT,
            }),
            format!(
                "[0:v]scale={CANVAS_WIDTH}:{CONTENT_BAND_HEIGHT}:force_original_aspect_ratio=decrease:flags=lanczos,\
                 pad={CANVAS_WIDTH}:{CONTENT_BAND_HEIGHT}:(ow-iw)/2:(oh-ih)/2:black,\
                 pad={CANVAS_WIDTH}:{CANVAS_HEIGHT}:0:{WATERMARK_BAND_HEIGHT}:black"
            ),
        )
    } else {
        (
            Some(Bands {
                watermark: WATERMARK_BAND_HEIGHT,
                content: CONTENT_BAND_HEIGHT,
                subtitle: SUBTITLE_BAND_HEIGHT,
            }),
            format!(
                "[0:v]scale={CANVAS_WIDTH}:{CONTENT_BAND_HEIGHT}:force_original_aspect_ratio=decrease,\
                 pad={CANVAS_WIDTH}:{CANVAS_HEIGHT}:(ow-iw)/2:{WATERMARK_BAND_HEIGHT}:black"
            ),
        )
    };

    let mut tail = if let Some(path) = watermark_path {
        chains.push(format!("{base}[padded]"));
        chains.push(format!(
            "movie='{}',scale={FULL_WATERMARK_WIDTH}:-1[wm]",
            escape_filter_path(path)
        ));
        overlays.push(Overlay::Watermark {
            x: (CANVAS_WIDTH - FULL_WATERMARK_WIDTH) / 2,
            y: FULL_WATERMARK_Y,
            width: FULL_WATERMARK_WIDTH,
        });
        format!("[padded][wm]overlay=(W-w)/2:{FULL_WATERMARK_Y}")
    } else {
        base
    };

    if let Some(text) = viral_text {
        tail.push(',');
        tail.push_str(&caption_filter(text));
        overlays.push(Overlay::Caption {
            text: text.to_string(),
            y: CAPTION_Y,
        });
    }
    chains.push(tail);

    LayoutPlan {
        mode: LayoutMode::Full,
        canvas_width: CANVAS_WIDTH,
        canvas_height: CANVAS_HEIGHT,
        bands,
        split_top_crop: None,
        overlays,
        filter_graph: chains.join(";"),
    }
}

fn plan_split(source_width: u32, source_height: u32, watermark_path: Option<&str>) -> LayoutPlan {
    let crop_w = (source_width as f64 * SPLIT_CROP_WIDTH_RATIO) as u32;
    let crop_h = (source_height as f64 * SPLIT_CROP_HEIGHT_RATIO) as u32;
    let crop = CropRegion {
        width: crop_w,
        height: crop_h,
        x: (source_width - crop_w) / 2,
        y: 0,
    };

    let mut overlays = Vec::new();
    let mut chains = vec![
        "[0:v]split=2[full][top]".to_string(),
        format!(
            "[top]crop={}:{}:{}:{},scale={CANVAS_WIDTH}:{SPLIT_REGION_HEIGHT}:flags=lanczos[top_scaled]",
            crop.width, crop.height, crop.x, crop.y
        ),
        format!(
            "[full]scale={CANVAS_WIDTH}:{SPLIT_REGION_HEIGHT}:force_original_aspect_ratio=decrease,\
             pad={CANVAS_WIDTH}:{SPLIT_REGION_HEIGHT}:(ow-iw)/2:(oh-ih)/2:black[bottom_scaled]"
        ),
        "[top_scaled][bottom_scaled]vstack=inputs=2[stacked]".to_string(),
    ];

    let tail = if let Some(path) = watermark_path {
        let seam_y = SPLIT_REGION_HEIGHT - SPLIT_WATERMARK_LIFT;
        chains.push(format!(
            "movie='{}',scale={SPLIT_WATERMARK_WIDTH}:-1[wm]",
            escape_filter_path(path)
        ));
        chains.push(format!("[stacked][wm]overlay=(W-w)/2:{seam_y}[marked]"));
        overlays.push(Overlay::Watermark {
            x: (CANVAS_WIDTH - SPLIT_WATERMARK_WIDTH) / 2,
            y: seam_y,
            width: SPLIT_WATERMARK_WIDTH,
        });
        format!("[marked]scale={CANVAS_WIDTH}:{CANVAS_HEIGHT}:flags=lanczos")
    } else {
        format!("[stacked]scale={CANVAS_WIDTH}:{CANVAS_HEIGHT}:flags=lanczos")
    };
    chains.push(tail);

    LayoutPlan {
        mode: LayoutMode::Split,
        canvas_width: CANVAS_WIDTH,
        canvas_height: CANVAS_HEIGHT,
        bands: None,
        split_top_crop: Some(crop),
        overlays,
        filter_graph: chains.join(";"),
    }
}

/// drawtext overlay for the caption: opaque white box, black text, two
/// lines when the text carries a newline.
fn caption_filter(text: &str) -> String {
    format!(
        "drawtext=text='{}':fontsize={CAPTION_FONT_SIZE}:fontcolor=black:\
         box=1:boxcolor=white@1.0:boxborderw=15:line_spacing=10:\
         x=(w-text_w)/2:y={CAPTION_Y}",
        escape_drawtext(text)
    )
}

/// Escape text for a drawtext expression. Real newlines pass through and
/// become line breaks.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn watermark_at(path: &str) -> WatermarkConfig {
        WatermarkConfig::default().with_image_path(path)
    }

    fn existing_watermark() -> (tempfile::NamedTempFile, WatermarkConfig) {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"png").unwrap();
        let config = watermark_at(&file.path().to_string_lossy());
        (file, config)
    }

    #[test]
    fn test_full_mode_band_geometry() {
        let (_file, wm) = existing_watermark();
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Full, None, &wm);

        let bands = plan.bands.unwrap();
        assert_eq!(bands.watermark, 280);
        assert_eq!(bands.content, 1400);
        assert_eq!(bands.subtitle, 240);
        assert_eq!(bands.watermark + bands.content + bands.subtitle, 1920);

        assert_eq!(
            plan.overlays,
            vec![Overlay::Watermark {
                x: 390,
                y: 100,
                width: 300
            }]
        );
        assert!(plan.filter_graph.contains("pad=1080:1400"));
        assert!(plan.filter_graph.contains("movie="));
        assert!(plan.filter_graph.contains("overlay=(W-w)/2:100"));
    }

    #[test]
    fn test_full_mode_aspect_ok_skips_bands() {
        let (_file, wm) = existing_watermark();
        let plan = LayoutPlan::build(1080, 1920, LayoutMode::Full, None, &wm);
        assert!(plan.bands.is_none());
        assert!(plan.filter_graph.contains("scale=1080:1920"));
        assert!(!plan.filter_graph.contains("pad="));
    }

    #[test]
    fn test_full_mode_tall_source_fits_content_band() {
        // A 2:3 source scaled to width would overshoot the 1400px band;
        // the plan shrinks it to fit instead.
        let (_file, wm) = existing_watermark();
        let plan = LayoutPlan::build(720, 1080, LayoutMode::Full, None, &wm);
        assert!(plan.bands.is_some());
        assert!(plan
            .filter_graph
            .contains("scale=1080:1400:force_original_aspect_ratio=decrease"));
        assert!(plan.filter_graph.contains("pad=1080:1400"));
        assert!(plan.filter_graph.contains("movie="));
    }

    #[test]
    fn test_full_mode_missing_watermark_degrades() {
        let wm = watermark_at("/nonexistent/watermark.png");
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Full, None, &wm);
        assert!(plan.bands.is_some());
        assert!(!plan.filter_graph.contains("movie="));
        assert!(plan
            .filter_graph
            .contains("force_original_aspect_ratio=decrease"));
        assert!(plan.filter_graph.contains("pad=1080:1920:(ow-iw)/2:280"));
        assert!(plan.overlays.is_empty());
    }

    #[test]
    fn test_full_mode_caption_overlay() {
        let wm = watermark_at("/nonexistent/watermark.png");
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Full, Some("BIG NEWS\nTODAY"), &wm);
        assert!(plan.filter_graph.contains("drawtext="));
        assert!(plan.filter_graph.contains("y=530"));
        assert!(plan.filter_graph.contains("boxcolor=white@1.0"));
        assert!(matches!(
            plan.overlays.last(),
            Some(Overlay::Caption { y: 530, .. })
        ));
    }

    #[test]
    fn test_split_mode_crop_geometry() {
        let wm = watermark_at("/nonexistent/watermark.png");
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Split, None, &wm);

        // 50% x 35% of a 1920x1080 source, centered horizontally, anchored top.
        let crop = plan.split_top_crop.unwrap();
        assert_eq!(crop.width, 960);
        assert_eq!(crop.height, 378);
        assert_eq!(crop.x, 480);
        assert_eq!(crop.y, 0);

        assert!(plan.filter_graph.contains("split=2"));
        assert!(plan.filter_graph.contains("crop=960:378:480:0"));
        assert!(plan.filter_graph.contains("scale=1080:960"));
        assert!(plan.filter_graph.contains("vstack=inputs=2"));
        assert!(plan.filter_graph.ends_with("scale=1080:1920:flags=lanczos"));
    }

    #[test]
    fn test_split_mode_watermark_on_seam() {
        let (_file, wm) = existing_watermark();
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Split, None, &wm);
        assert_eq!(
            plan.overlays,
            vec![Overlay::Watermark {
                x: 500,
                y: 920,
                width: 80
            }]
        );
        assert!(plan.filter_graph.contains("overlay=(W-w)/2:920"));
    }

    #[test]
    fn test_subtitles_appended_last() {
        let wm = watermark_at("/nonexistent/watermark.png");
        let plan = LayoutPlan::build(1920, 1080, LayoutMode::Full, None, &wm);
        let graph = plan.filter_graph_with_subtitles("/tmp/subs.ass");
        assert!(graph.ends_with(",ass='/tmp/subs.ass'"));
    }

    #[test]
    fn test_drawtext_escaping() {
        assert_eq!(escape_drawtext("50% off: don't"), "50\\% off\\: don\\'t");
    }
}

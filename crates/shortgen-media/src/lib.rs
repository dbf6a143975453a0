//! FFmpeg wrapper for vertical short composition.
//!
//! Wraps the `ffmpeg`/`ffprobe` CLIs: probing, audio extraction for
//! transcription, 9:16 layout planning, ASS subtitle artifacts and the
//! single-pass render driver.

pub mod audio;
pub mod command;
pub mod error;
pub mod layout;
pub mod probe;
pub mod render;
pub mod subtitle;
pub mod thumbnail;
pub mod watermark;

pub use command::{FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use layout::LayoutPlan;
pub use probe::{probe_video, VideoInfo};
pub use watermark::WatermarkConfig;

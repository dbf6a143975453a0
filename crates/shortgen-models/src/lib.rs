//! Shared data models for the shortgen pipeline.
//!
//! Everything in this crate is pure data plus pure functions over it:
//! timed transcripts and time-span chunking, candidate viral moments with
//! duration normalization, subtitle cue windowing, layout modes and
//! encoding settings.

pub mod encoding;
pub mod layout;
pub mod moment;
pub mod short;
pub mod subtitle;
pub mod transcript;

pub use encoding::EncodingConfig;
pub use layout::{LayoutMode, LayoutModeParseError};
pub use moment::{dedup_overlapping, DurationPolicy, Moment};
pub use short::RenderedShort;
pub use subtitle::{window_subtitles, SubtitleCue};
pub use transcript::{Transcript, TranscriptChunk, TranscriptSegment};

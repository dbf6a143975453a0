//! Viral short extraction pipeline.
//!
//! One job takes a long source video through probe, audio extraction,
//! transcription, moment extraction and per-moment rendering, producing
//! `short_<jobid>_<n>.mp4` files with burned-in subtitles.

pub mod ai;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod publish;
pub mod titles;
pub mod transcribe;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use pipeline::{Pipeline, PipelineOptions};

//! Sequential per-job pipeline: probe, transcribe, analyze, render.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tracing::{warn, Instrument};

use shortgen_media::layout::LayoutPlan;
use shortgen_media::thumbnail::generate_thumbnail;
use shortgen_media::watermark::WatermarkConfig;
use shortgen_models::{
    window_subtitles, DurationPolicy, EncodingConfig, LayoutMode, Moment, RenderedShort, Transcript,
};

use crate::ai::{TextGenerator, Transcriber};
use crate::analyzer::MomentAnalyzer;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::publish::{collect_hashtags, Publisher};
use crate::titles::{extract_segment_text, generate_viral_title, TitleLanguage};
use crate::transcribe::transcribe_audio;

/// Pause between uploads when publishing a batch.
const PUBLISH_PACING_SECS: u64 = 30;

/// Per-job options.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub policy: DurationPolicy,
    pub layout_mode: LayoutMode,
    pub title_language: TitleLanguage,
}

/// Runs one job at a time against the capability seams.
pub struct Pipeline<'a> {
    transcriber: &'a dyn Transcriber,
    generator: &'a dyn TextGenerator,
    config: &'a WorkerConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        transcriber: &'a dyn Transcriber,
        generator: &'a dyn TextGenerator,
        config: &'a WorkerConfig,
    ) -> Self {
        Self {
            transcriber,
            generator,
            config,
        }
    }

    /// Run one job end to end, returning metadata for every rendered short.
    ///
    /// Stages run sequentially. Failures while rendering one moment are
    /// isolated: the moment is logged and skipped so its siblings still
    /// produce output. Failures before rendering fail the whole job.
    pub async fn run(
        &self,
        job_id: &str,
        input: &Path,
        options: &PipelineOptions,
    ) -> WorkerResult<Vec<RenderedShort>> {
        let logger = JobLogger::new(job_id, "process_video");
        let span = logger.create_span();
        self.run_job(&logger, job_id, input, options)
            .instrument(span)
            .await
    }

    async fn run_job(
        &self,
        logger: &JobLogger,
        job_id: &str,
        input: &Path,
        options: &PipelineOptions,
    ) -> WorkerResult<Vec<RenderedShort>> {
        logger.log_start(&format!("processing {}", input.display()));

        let info = shortgen_media::probe_video(input).await?;
        if info.width == 0 || info.height == 0 {
            return Err(WorkerError::job_failed("Source has no usable video stream"));
        }

        // Audio is transient: extracted for transcription, removed after.
        let audio_path = shortgen_media::audio::extract_audio(input, &self.config.work_dir).await?;
        let transcript_result =
            transcribe_audio(self.transcriber, &audio_path, info.duration).await;
        if let Err(e) = tokio::fs::remove_file(&audio_path).await {
            logger.log_warning(&format!(
                "Failed to remove extracted audio {}: {e}",
                audio_path.display()
            ));
        }
        let transcript = transcript_result?;
        if transcript.is_empty() {
            return Err(WorkerError::transcription_failed(
                "Transcript came back empty",
            ));
        }
        logger.log_progress(&format!(
            "transcribed {} segments",
            transcript.segments.len()
        ));

        let analyzer = MomentAnalyzer::new(self.generator).with_token_budget(self.config.token_budget);
        let moments = analyzer
            .find_viral_moments(&transcript, info.duration, options.policy)
            .await?;
        logger.log_progress(&format!("rendering {} shorts", moments.len()));

        let watermark = match &self.config.watermark_path {
            Some(path) => WatermarkConfig::default().with_image_path(path),
            None => WatermarkConfig::default(),
        };
        tokio::fs::create_dir_all(&self.config.output_dir).await?;

        let mut shorts = Vec::new();
        for (i, moment) in moments.iter().enumerate() {
            let index = (i + 1) as u32;
            match self
                .render_moment(
                    job_id,
                    index,
                    input,
                    (info.width, info.height),
                    moment,
                    &transcript,
                    options,
                    &watermark,
                )
                .await
            {
                Ok(short) => shorts.push(short),
                Err(e) => logger.log_error(&format!("Short {index} failed, skipping: {e}")),
            }
        }

        logger.log_completion(&format!("{} shorts generated", shorts.len()));
        Ok(shorts)
    }

    #[allow(clippy::too_many_arguments)]
    async fn render_moment(
        &self,
        job_id: &str,
        index: u32,
        input: &Path,
        source_size: (u32, u32),
        moment: &Moment,
        transcript: &Transcript,
        options: &PipelineOptions,
        watermark: &WatermarkConfig,
    ) -> WorkerResult<RenderedShort> {
        let cues = window_subtitles(transcript, moment.start_time, moment.end_time);

        // On-screen title: generated from the spoken text, falling back to
        // the primary key phrase, then the moment title.
        let viral_text = match extract_segment_text(transcript, moment.start_time, moment.end_time)
        {
            Some(text) => {
                generate_viral_title(self.generator, &text, options.title_language).await
            }
            None => None,
        }
        .or_else(|| moment.key_phrases.first().cloned())
        .or_else(|| {
            if moment.title.is_empty() {
                None
            } else {
                Some(moment.title.clone())
            }
        });

        let plan = LayoutPlan::build(
            source_size.0,
            source_size.1,
            options.layout_mode,
            viral_text.as_deref(),
            watermark,
        );

        let filename = RenderedShort::output_filename(job_id, index);
        let output = self.config.output_dir.join(&filename);
        let encoding = EncodingConfig::default();

        shortgen_media::render::render_short(
            input,
            &output,
            moment.start_time,
            moment.end_time,
            &cues,
            &plan,
            &encoding,
        )
        .await?;

        if let Err(e) = generate_thumbnail(&output, output.with_extension("jpg")).await {
            warn!(short = index, error = %e, "Thumbnail generation failed");
        }

        Ok(RenderedShort {
            index,
            filename,
            title: moment.title.clone(),
            description: moment.description.clone(),
            start_time: moment.start_time,
            end_time: moment.end_time,
            duration: moment.duration(),
            score: moment.score,
            social_copy: moment.social_copy.clone().unwrap_or_default(),
            published: false,
            created_at: Utc::now(),
        })
    }

    /// Publish rendered shorts through the collaborator, pacing uploads.
    ///
    /// Upload failures are per-short: logged, the short stays unpublished
    /// and the batch continues.
    pub async fn publish_shorts(
        &self,
        publisher: &dyn Publisher,
        shorts: &mut [RenderedShort],
    ) -> WorkerResult<usize> {
        let mut published = 0;
        for (i, short) in shorts.iter_mut().enumerate() {
            if i > 0 {
                tokio::time::sleep(Duration::from_secs(PUBLISH_PACING_SECS)).await;
            }
            let video_path = self.config.output_dir.join(&short.filename);
            let hashtags = collect_hashtags(&short.social_copy);
            match publisher.publish(&video_path, &short.title, &hashtags).await {
                Ok(true) => {
                    short.published = true;
                    published += 1;
                }
                Ok(false) => {
                    warn!(short = short.index, "Publisher declined the upload");
                }
                Err(e) => {
                    warn!(short = short.index, error = %e, "Publishing failed, continuing");
                }
            }
        }
        Ok(published)
    }
}

//! Pause and filler removal job.
//!
//! Loads the transcript, plans the edit against the probed source duration,
//! writes the removal record and report, assembles the edited artifact and,
//! when a chapters file is supplied, remaps and embeds the chapters.

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::Instrument;
use vclean_media::fs_utils::write_atomic;
use vclean_media::pause_removal::{plan_edit, RemapPolicy, TimestampRemapper};
use vclean_media::{MediaAssembler, MediaError};
use vclean_models::{CutMode, EncodingConfig, RemovalRecord, Transcript};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::layout::{ChapterLayout, OutputLayout};
use crate::logging::{JobLogger, Operation};
use crate::remap_job::{load_chapters, publish_chapters, ChapterOutcome};
use crate::report::render_report;

/// Measured and planned durations may differ by this much before a warning.
const DURATION_DRIFT_WARN_SECS: f64 = 0.5;

/// Inputs of a clean job.
#[derive(Debug, Clone)]
pub struct CleanRequest {
    pub media: PathBuf,
    /// Transcript path (default `<stem> - transcript.json` next to the media)
    pub transcript: Option<PathBuf>,
    /// Edited artifact path (default `<stem> - edited<ext>`)
    pub output: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Plan and report only; no media is written
    pub preview: bool,
    pub cut_mode: CutMode,
    pub encoding: EncodingConfig,
    /// Chapters to remap onto the edited timeline
    pub chapters: Option<PathBuf>,
    pub embed_chapters: bool,
    pub remap_policy: RemapPolicy,
}

impl CleanRequest {
    pub fn new(media: impl Into<PathBuf>) -> Self {
        Self {
            media: media.into(),
            transcript: None,
            output: None,
            output_dir: None,
            preview: false,
            cut_mode: CutMode::default(),
            encoding: EncodingConfig::default(),
            chapters: None,
            embed_chapters: true,
            remap_policy: RemapPolicy::default(),
        }
    }
}

/// What a clean job produced.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub layout: OutputLayout,
    pub original_duration: f64,
    /// Sum of keep segments
    pub planned_duration: f64,
    /// Probed duration of the artifact, when it could be measured
    pub measured_duration: Option<f64>,
    pub segments: usize,
    pub dropped_segments: usize,
    pub report: String,
    /// Edited artifact; `None` in preview mode
    pub edited: Option<PathBuf>,
    pub chapters: Option<ChapterOutcome>,
}

/// Runs clean requests.
#[derive(Debug, Clone)]
pub struct CleanJob {
    config: WorkerConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl CleanJob {
    pub fn new(config: WorkerConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub async fn run(&self, request: &CleanRequest) -> WorkerResult<CleanOutcome> {
        let logger = JobLogger::new(Operation::Clean);
        let result = self.run_inner(request, &logger).instrument(logger.span()).await;
        if let Err(e) = &result {
            logger.failed(e);
        }
        result
    }

    async fn run_inner(&self, request: &CleanRequest, logger: &JobLogger) -> WorkerResult<CleanOutcome> {
        logger.started(&request.media);
        self.config.validate()?;

        if !request.media.exists() {
            return Err(MediaError::FileNotFound(request.media.clone()).into());
        }

        let layout = OutputLayout::new(
            &request.media,
            request.transcript.as_deref(),
            request.output.as_deref(),
            request.output_dir.as_deref(),
        );
        if layout.edited == request.media {
            return Err(WorkerError::invalid_input(
                "output path must differ from the source media",
            ));
        }

        let transcript = load_transcript(&layout.transcript).await?;
        // Chapters are parsed up front so a bad file fails before any output.
        let chapters = match &request.chapters {
            Some(path) => Some(load_chapters(path).await?),
            None => None,
        };

        let info = self.config.prober().probe(&request.media).await?;
        let speech_end = transcript.speech_end();
        if speech_end > info.duration {
            logger.speech_past_end(speech_end, info.duration);
        }

        let edit_config = self.config.edit_config();
        let edit = plan_edit(&transcript.words, info.duration, &edit_config)?;
        logger.planned(edit.merged.len(), &edit.plan.stats);

        let record = RemovalRecord::new(
            request.media.display().to_string(),
            Some(layout.transcript.display().to_string()),
            edit_config.pause_threshold,
            &edit.candidates,
            &edit.merged,
        );
        write_atomic(&layout.record, serde_json::to_string_pretty(&record)?).await?;

        let report = render_report(&record, &edit.plan.segments, info.duration);
        write_atomic(&layout.report, &report).await?;
        logger.wrote_record(&layout.record, &layout.report);

        let planned_duration = edit.plan.edited_duration();
        let mut outcome = CleanOutcome {
            layout,
            original_duration: info.duration,
            planned_duration,
            measured_duration: None,
            segments: edit.plan.segments.len(),
            dropped_segments: edit.plan.dropped.len(),
            report,
            edited: None,
            chapters: None,
        };

        if request.preview {
            logger.preview_only(&outcome.layout.record);
            return Ok(outcome);
        }

        let runner = self.config.runner(self.cancel.clone());
        let assembler = MediaAssembler::new(
            runner.clone(),
            self.config
                .assemble_options(request.cut_mode, request.encoding.clone()),
        );
        let assembled = assembler
            .assemble(
                &request.media,
                &outcome.layout.edited,
                &edit.plan.segments,
                info.has_video,
            )
            .await?;
        logger.assembled(&assembled);

        outcome.measured_duration = self.measure(&outcome.layout.edited, planned_duration, logger).await;
        outcome.edited = Some(outcome.layout.edited.clone());

        if let (Some(path), Some(chapters)) = (&request.chapters, chapters) {
            let remapper =
                TimestampRemapper::with_policy(edit.merged.iter().copied(), request.remap_policy);
            let chapter_layout = ChapterLayout::new(path, None, request.output_dir.as_deref());
            let embed = request
                .embed_chapters
                .then(|| (outcome.layout.edited.as_path(), outcome.layout.with_chapters.as_path()));
            let video_name = outcome
                .layout
                .media
                .file_stem()
                .map(|s| s.to_string_lossy().to_string());

            let chapter_outcome = publish_chapters(
                logger,
                &runner,
                &chapters,
                remapper,
                &outcome.layout.record.display().to_string(),
                chapter_layout,
                Some(outcome.measured_duration.unwrap_or(planned_duration)),
                embed,
                video_name.as_deref(),
            )
            .await?;
            outcome.chapters = Some(chapter_outcome);
        }

        logger.cleaned(&outcome.layout.edited, outcome.original_duration, planned_duration);
        Ok(outcome)
    }

    /// Probe the artifact and compare against the plan.
    ///
    /// Drift and probe failures are logged, not returned.
    async fn measure(&self, edited: &Path, planned: f64, logger: &JobLogger) -> Option<f64> {
        match self.config.prober().duration(edited).await {
            Ok(measured) => {
                if (measured - planned).abs() > DURATION_DRIFT_WARN_SECS {
                    logger.duration_drift(planned, measured);
                }
                Some(measured)
            }
            Err(e) => {
                logger.measure_failed(&e);
                None
            }
        }
    }
}

/// Read and validate a word-level transcript.
pub async fn load_transcript(path: &Path) -> WorkerResult<Transcript> {
    if !path.exists() {
        return Err(WorkerError::invalid_input(format!(
            "transcript not found: {}",
            path.display()
        )));
    }
    let json = tokio::fs::read_to_string(path).await?;
    let transcript = Transcript::from_json_str(&json)?;
    transcript.validate()?;
    Ok(transcript)
}

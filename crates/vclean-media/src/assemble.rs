//! Cut keep segments out of the source and concatenate them.
//!
//! # Strategy
//!
//! 1. Cut each keep segment to its own clip in a temporary directory, up to
//!    `max_parallel` FFmpeg processes at a time.
//! 2. Concatenate the clips with the concat demuxer and stream copy into a
//!    temporary sibling of the output.
//! 3. Rename the sibling onto the output path.
//!
//! The first failing cut aborts the whole job: the remaining cut futures are
//! dropped, which kills their FFmpeg processes, and nothing is written to the
//! output path.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use tempfile::TempDir;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};
use vclean_models::{CutMode, EncodingConfig, KeepSegment};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{concat_list, filter_skip_indicator};
use crate::fs_utils::{ensure_parent, move_file, partial_path, remove_if_exists};

/// Assembly settings.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub cut_mode: CutMode,
    pub encoding: EncodingConfig,
    /// Show the skip caption after pauses at least this long; `0` disables.
    pub skip_indicator_secs: f64,
    /// Maximum concurrent cut processes.
    pub max_parallel: usize,
    /// Keep the clip directory after the job for debugging.
    pub keep_temp: bool,
    /// Parent for the clip directory (system temp dir when unset).
    pub work_dir: Option<PathBuf>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            cut_mode: CutMode::default(),
            encoding: EncodingConfig::default(),
            skip_indicator_secs: 5.0,
            max_parallel: 4,
            keep_temp: false,
            work_dir: None,
        }
    }
}

/// What an assembly run produced.
#[derive(Debug, Clone)]
pub struct AssembleOutput {
    pub output: PathBuf,
    pub clip_count: usize,
    /// Clips that received the skip caption.
    pub overlay_count: usize,
    /// Clip directory, when retained.
    pub kept_temp_dir: Option<PathBuf>,
}

/// Drives FFmpeg to build the edited artifact.
#[derive(Debug, Clone)]
pub struct MediaAssembler {
    runner: FfmpegRunner,
    options: AssembleOptions,
}

impl MediaAssembler {
    pub fn new(runner: FfmpegRunner, options: AssembleOptions) -> Self {
        Self { runner, options }
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    /// Whether the clip for `segment` gets the skip caption.
    pub fn needs_overlay(&self, segment: &KeepSegment, has_video: bool) -> bool {
        has_video
            && self.options.cut_mode == CutMode::Reencode
            && self.options.skip_indicator_secs > 0.0
            && segment.preceding_removed >= self.options.skip_indicator_secs
    }

    /// Clip file extension for a given source.
    fn clip_extension(&self, input: &Path, has_video: bool) -> String {
        let source_ext = input
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| "mkv".to_string());
        match (self.options.cut_mode, has_video) {
            (CutMode::Reencode, true) => "mp4".to_string(),
            _ => source_ext,
        }
    }

    /// Build the FFmpeg command cutting `segment` into `clip`.
    pub fn cut_command(
        &self,
        input: &Path,
        clip: &Path,
        segment: &KeepSegment,
        has_video: bool,
    ) -> FfmpegCommand {
        let duration = segment.duration();
        let cmd = FfmpegCommand::new(input, clip);

        let cmd = match self.options.cut_mode {
            CutMode::StreamCopy => cmd.seek(segment.start).duration(duration).codec_copy(),
            CutMode::Reencode if has_video => {
                let mut cmd = cmd.accurate_seek(segment.start).duration(duration);
                if self.needs_overlay(segment, has_video) {
                    cmd = cmd.video_filter(filter_skip_indicator(segment.preceding_removed, duration));
                }
                cmd.output_args(self.options.encoding.video_args())
                    .output_args(self.options.encoding.audio_args())
            }
            // Audio-only: let the container pick its default encoder.
            CutMode::Reencode => cmd.accurate_seek(segment.start).duration(duration).no_video(),
        };

        cmd.zero_timestamps()
    }

    /// Cut every segment and concatenate the clips into `output`.
    ///
    /// # Errors
    /// `EmptyTimeline` when `segments` is empty; any cut or concat failure is
    /// returned as is and leaves `output` untouched.
    pub async fn assemble(
        &self,
        input: &Path,
        output: &Path,
        segments: &[KeepSegment],
        has_video: bool,
    ) -> MediaResult<AssembleOutput> {
        if segments.is_empty() {
            return Err(MediaError::EmptyTimeline("no keep segments to assemble".to_string()));
        }
        if !input.exists() {
            return Err(MediaError::FileNotFound(input.to_path_buf()));
        }

        let temp_dir = match &self.options.work_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                tempfile::Builder::new().prefix("vclean-").tempdir_in(dir)?
            }
            None => tempfile::Builder::new().prefix("vclean-").tempdir()?,
        };

        let result = self
            .assemble_in(&temp_dir, input, output, segments, has_video)
            .await;

        let kept_temp_dir = if self.options.keep_temp {
            let path = temp_dir.keep();
            info!(dir = %path.display(), "Keeping temporary clips");
            Some(path)
        } else {
            None
        };

        let overlay_count = segments
            .iter()
            .filter(|s| self.needs_overlay(s, has_video))
            .count();

        result.map(|()| AssembleOutput {
            output: output.to_path_buf(),
            clip_count: segments.len(),
            overlay_count,
            kept_temp_dir,
        })
    }

    async fn assemble_in(
        &self,
        temp_dir: &TempDir,
        input: &Path,
        output: &Path,
        segments: &[KeepSegment],
        has_video: bool,
    ) -> MediaResult<()> {
        info!(
            input = %input.display(),
            segments = segments.len(),
            max_parallel = self.options.max_parallel,
            cut_mode = ?self.options.cut_mode,
            "Cutting keep segments"
        );

        let ext = self.clip_extension(input, has_video);
        let semaphore = Semaphore::new(self.options.max_parallel.max(1));
        let semaphore = &semaphore;

        let cuts = segments.iter().enumerate().map(|(i, seg)| {
            let clip = temp_dir.path().join(format!("clip_{:04}.{}", i, ext));
            let cmd = self.cut_command(input, &clip, seg, has_video);
            let overlay = self.needs_overlay(seg, has_video);
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| MediaError::internal("cut semaphore closed"))?;

                debug!(
                    segment = i,
                    start_sec = seg.start,
                    end_sec = seg.end,
                    overlay = overlay,
                    "Cutting segment"
                );

                if let Err(e) = self.runner.run(&cmd).await {
                    error!(segment = i, start_sec = seg.start, error = %e, "Segment cut failed");
                    return Err(e);
                }
                Ok::<_, MediaError>(clip)
            }
        });

        let clips = try_join_all(cuts).await?;

        let list_path = temp_dir.path().join("concat_list.txt");
        tokio::fs::write(&list_path, concat_list(&clips)).await?;

        ensure_parent(output).await?;
        let partial = partial_path(output);

        let mut concat = FfmpegCommand::new(&list_path, &partial)
            .concat_list()
            .codec_copy();
        if is_mp4_family(output) {
            concat = concat.output_args(["-movflags", "+faststart"]);
        }

        info!(clips = clips.len(), "Concatenating clips");
        if let Err(e) = self.runner.run(&concat).await {
            error!(error = %e, "Concat failed");
            let _ = remove_if_exists(&partial).await;
            return Err(e);
        }

        if let Err(e) = move_file(&partial, output).await {
            let _ = remove_if_exists(&partial).await;
            return Err(e);
        }

        info!(output = %output.display(), "Edited media written");
        Ok(())
    }
}

fn is_mp4_family(path: &Path) -> bool {
    path.extension()
        .map(|e| {
            let e = e.to_string_lossy().to_ascii_lowercase();
            matches!(e.as_str(), "mp4" | "mov" | "m4a" | "m4v")
        })
        .unwrap_or(false)
}

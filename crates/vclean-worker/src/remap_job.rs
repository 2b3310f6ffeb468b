//! Chapter remap job.
//!
//! Re-anchors an external chapters file onto the edited timeline using the
//! removal record a clean job wrote, then writes the JSON, listing and
//! FFMETADATA variants and optionally muxes the chapters into the artifact.

use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tracing::Instrument;
use vclean_media::chapters::{embed_chapters, ChapterRemapWriter, RemappedChapters};
use vclean_media::fs_utils::write_atomic;
use vclean_media::pause_removal::{RemapPolicy, TimestampRemapper};
use vclean_media::FfmpegRunner;
use vclean_models::{parse_chapters, ChapterMarker, RemovalRecord};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::layout::ChapterLayout;
use crate::logging::{JobLogger, Operation};

/// Inputs of a remap job.
#[derive(Debug, Clone)]
pub struct RemapRequest {
    pub chapters: PathBuf,
    /// Removal record written by `clean`
    pub record: PathBuf,
    /// Remapped JSON path (default `<chapters stem>_remapped.json`)
    pub output: Option<PathBuf>,
    /// Edited artifact; gives the last chapter's end and is the embed target
    pub media: Option<PathBuf>,
    pub embed: bool,
    pub policy: RemapPolicy,
    /// Name used in the listing header
    pub video_name: Option<String>,
}

impl RemapRequest {
    pub fn new(chapters: impl Into<PathBuf>, record: impl Into<PathBuf>) -> Self {
        Self {
            chapters: chapters.into(),
            record: record.into(),
            output: None,
            media: None,
            embed: false,
            policy: RemapPolicy::default(),
            video_name: None,
        }
    }
}

/// What a remap produced.
#[derive(Debug, Clone)]
pub struct ChapterOutcome {
    pub layout: ChapterLayout,
    pub remapped: RemappedChapters,
    /// Artifact with embedded chapters, when muxed
    pub embedded: Option<PathBuf>,
}

/// Read and parse a chapters file.
pub async fn load_chapters(path: &Path) -> WorkerResult<Vec<ChapterMarker>> {
    if !path.exists() {
        return Err(WorkerError::invalid_input(format!(
            "chapters file not found: {}",
            path.display()
        )));
    }
    let json = tokio::fs::read_to_string(path).await?;
    Ok(parse_chapters(&json)?)
}

/// Read a removal record.
pub async fn load_record(path: &Path) -> WorkerResult<RemovalRecord> {
    if !path.exists() {
        return Err(WorkerError::invalid_input(format!(
            "removal record not found: {}",
            path.display()
        )));
    }
    let json = tokio::fs::read_to_string(path).await?;
    serde_json::from_str(&json).map_err(|e| {
        WorkerError::invalid_input(format!("malformed removal record {}: {}", path.display(), e))
    })
}

/// Write the remapped JSON, the listing and the FFMETADATA block.
pub async fn write_chapter_outputs(
    remapped: &RemappedChapters,
    layout: &ChapterLayout,
    video_name: Option<&str>,
) -> WorkerResult<()> {
    write_atomic(&layout.remapped_json, remapped.to_json()?).await?;
    write_atomic(&layout.youtube, remapped.youtube_listing(video_name)).await?;
    write_atomic(&layout.ffmetadata, remapped.ffmetadata()).await?;
    Ok(())
}

/// Remap, write, and optionally embed in one step.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn publish_chapters(
    logger: &JobLogger,
    runner: &FfmpegRunner,
    chapters: &[ChapterMarker],
    remapper: TimestampRemapper,
    source: &str,
    layout: ChapterLayout,
    artifact_end: Option<f64>,
    embed: Option<(&Path, &Path)>,
    video_name: Option<&str>,
) -> WorkerResult<ChapterOutcome> {
    if remapper.removal_count() == 0 {
        logger.no_removals(source);
    }

    let remapped = ChapterRemapWriter::new(remapper, source).remap(chapters, artifact_end);
    write_chapter_outputs(&remapped, &layout, video_name).await?;
    logger.chapters_written(
        remapped.chapters.len(),
        remapped.snapped_count,
        &layout.remapped_json,
    );

    let embedded = match embed {
        Some((media, output)) => {
            embed_chapters(runner, media, &layout.ffmetadata, output).await?;
            logger.chapters_embedded(output);
            Some(output.to_path_buf())
        }
        None => None,
    };

    Ok(ChapterOutcome {
        layout,
        remapped,
        embedded,
    })
}

/// Runs chapter remap requests.
#[derive(Debug, Clone)]
pub struct RemapJob {
    config: WorkerConfig,
    cancel: Option<watch::Receiver<bool>>,
}

impl RemapJob {
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

    pub async fn run(&self, request: &RemapRequest) -> WorkerResult<ChapterOutcome> {
        let logger = JobLogger::new(Operation::Remap);
        let result = self.run_inner(request, &logger).instrument(logger.span()).await;
        if let Err(e) = &result {
            logger.failed(e);
        }
        result
    }

    async fn run_inner(&self, request: &RemapRequest, logger: &JobLogger) -> WorkerResult<ChapterOutcome> {
        logger.started(&request.chapters);
        self.config.validate()?;

        if request.embed && request.media.is_none() {
            return Err(WorkerError::invalid_input(
                "embedding chapters needs the edited media path",
            ));
        }

        let chapters = load_chapters(&request.chapters).await?;
        let record = load_record(&request.record).await?;
        let remapper = TimestampRemapper::with_policy(record.merged_intervals(), request.policy);

        let artifact_end = match &request.media {
            Some(media) => Some(self.config.prober().duration(media).await?),
            None => None,
        };

        let layout = ChapterLayout::new(&request.chapters, request.output.as_deref(), None);
        let embed_target = request.media.as_ref().map(|m| with_chapters_path(m));
        let embed = match (&request.media, &embed_target) {
            (Some(media), Some(target)) if request.embed => Some((media.as_path(), target.as_path())),
            _ => None,
        };

        let video_name = request.video_name.clone().or_else(|| {
            request
                .media
                .as_ref()
                .and_then(|m| m.file_stem())
                .map(|s| s.to_string_lossy().to_string())
        });

        let runner = self.config.runner(self.cancel.clone());
        let outcome = publish_chapters(
            logger,
            &runner,
            &chapters,
            remapper,
            &request.record.display().to_string(),
            layout,
            artifact_end,
            embed,
            video_name.as_deref(),
        )
        .await?;

        logger.remapped(outcome.remapped.chapters.len(), outcome.remapped.total_removed);
        Ok(outcome)
    }
}

/// `<stem> - chapters<ext>` next to `media`.
fn with_chapters_path(media: &Path) -> PathBuf {
    let stem = media
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = media
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    media.with_file_name(format!("{} - chapters{}", stem, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_chapters_path() {
        assert_eq!(
            with_chapters_path(Path::new("/v/talk - edited.mp4")),
            Path::new("/v/talk - edited - chapters.mp4")
        );
    }

    #[tokio::test]
    async fn test_remap_writes_all_outputs() {
        let dir = TempDir::new().unwrap();
        let chapters = dir.path().join("talk - chapters.json");
        let record = dir.path().join("talk - pauses.json");
        tokio::fs::write(
            &chapters,
            r#"{"chapters": [
                {"start": 0, "title": "Intro"},
                {"start": "00:12", "title": "Setup"},
                {"start": 50, "title": "Main", "description": "core"}
            ]}"#,
        )
        .await
        .unwrap();
        tokio::fs::write(
            &record,
            r#"{"source_media": "talk.mp4", "pause_threshold": 1.0,
                "intervals": [{"start": 10, "end": 15, "duration": 5, "magnitude": 5, "kind": "pause"}]}"#,
        )
        .await
        .unwrap();

        let outcome = RemapJob::new(WorkerConfig::default())
            .run(&RemapRequest::new(&chapters, &record))
            .await
            .unwrap();

        let starts: Vec<f64> = outcome.remapped.chapters.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0.0, 10.0, 45.0]);
        assert!(outcome.embedded.is_none());

        let json = tokio::fs::read_to_string(dir.path().join("talk - chapters_remapped.json"))
            .await
            .unwrap();
        let parsed: RemappedChapters = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.chapters[2].original_start, 50.0);
        assert_eq!(parsed.total_removed, 5.0);

        let listing = tokio::fs::read_to_string(&outcome.layout.youtube).await.unwrap();
        assert!(listing.contains("00:45 Main"));
        let meta = tokio::fs::read_to_string(&outcome.layout.ffmetadata).await.unwrap();
        assert!(meta.contains("START=10000"));

        // Remapping the remapped file again does not shift twice.
        let again = RemapJob::new(WorkerConfig::default())
            .run(&RemapRequest::new(&outcome.layout.remapped_json, &record))
            .await
            .unwrap();
        let starts: Vec<f64> = again.remapped.chapters.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0.0, 10.0, 45.0]);
    }

    #[tokio::test]
    async fn test_embed_without_media_is_input_error() {
        let mut request = RemapRequest::new("c.json", "p.json");
        request.embed = true;
        let err = RemapJob::new(WorkerConfig::default())
            .run(&request)
            .await
            .unwrap_err();
        assert!(err.is_input_error());
    }

    #[tokio::test]
    async fn test_malformed_chapters_is_input_error() {
        let dir = TempDir::new().unwrap();
        let chapters = dir.path().join("c.json");
        tokio::fs::write(&chapters, r#"{"nothing": []}"#).await.unwrap();
        let err = load_chapters(&chapters).await.unwrap_err();
        assert!(matches!(err, WorkerError::Chapters(_)));
        assert!(err.is_input_error());
    }
}

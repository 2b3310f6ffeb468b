//! Structured job events.
//!
//! Each step of a clean or remap job has its own event with typed fields, so
//! JSON logs can be filtered on `segments`, `removals`, `snapped` and so on
//! instead of parsing messages. Every event carries `job_id` and `operation`.

use std::fmt;
use std::path::Path;

use tracing::{error, info, warn, Span};
use vclean_media::pause_removal::PlanStats;
use vclean_media::{AssembleOutput, MediaError};
use vclean_models::JobId;

use crate::error::WorkerError;

/// Which job is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Clean,
    Remap,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Clean => "clean",
            Operation::Remap => "remap",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emits the events of one job.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: JobId,
    operation: Operation,
}

impl JobLogger {
    /// Logger for a new job with a fresh id.
    pub fn new(operation: Operation) -> Self {
        Self {
            job_id: JobId::new(),
            operation,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Tracing span wrapping the whole job.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }

    pub fn started(&self, input: &Path) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            input = %input.display(),
            "Job started"
        );
    }

    /// The transcript runs past the probed media end.
    pub fn speech_past_end(&self, speech_end: f64, media_duration: f64) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            speech_end_sec = speech_end,
            media_duration_sec = media_duration,
            "Transcript extends past the media duration, clamping removals"
        );
    }

    pub fn planned(&self, removals: usize, stats: &PlanStats) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            removals,
            segments = stats.kept_count,
            dropped = stats.dropped_count,
            kept_sec = stats.kept_duration,
            removed_sec = stats.removed_duration,
            total_sec = stats.total_duration,
            keep_ratio = stats.keep_ratio,
            "Edit planned"
        );
    }

    pub fn wrote_record(&self, record: &Path, report: &Path) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            record = %record.display(),
            report = %report.display(),
            "Removal record and report written"
        );
    }

    pub fn preview_only(&self, record: &Path) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            record = %record.display(),
            "Preview only, no media written"
        );
    }

    pub fn assembled(&self, output: &AssembleOutput) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            output = %output.output.display(),
            clips = output.clip_count,
            overlays = output.overlay_count,
            "Edited media assembled"
        );
        if let Some(dir) = &output.kept_temp_dir {
            info!(
                job_id = %self.job_id,
                operation = %self.operation,
                dir = %dir.display(),
                "Temporary clips kept"
            );
        }
    }

    /// Measured artifact duration differs from the plan.
    pub fn duration_drift(&self, planned: f64, measured: f64) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            planned_sec = planned,
            measured_sec = measured,
            drift_sec = (measured - planned).abs(),
            "Edited duration differs from plan"
        );
    }

    pub fn measure_failed(&self, err: &MediaError) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            error = %err,
            "Could not measure edited duration"
        );
    }

    /// The removal set is empty, so chapter times pass through unchanged.
    pub fn no_removals(&self, source: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            source,
            "No removal intervals, chapter times are unchanged"
        );
    }

    pub fn chapters_written(&self, chapters: usize, snapped: usize, output: &Path) {
        if snapped > 0 {
            warn!(
                job_id = %self.job_id,
                operation = %self.operation,
                snapped,
                "Chapters started inside removed time and were snapped"
            );
        }
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            chapters,
            snapped,
            output = %output.display(),
            "Remapped chapters written"
        );
    }

    pub fn chapters_embedded(&self, output: &Path) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            output = %output.display(),
            "Chapters embedded"
        );
    }

    pub fn cleaned(&self, edited: &Path, original: f64, planned: f64) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            output = %edited.display(),
            original_sec = original,
            edited_sec = planned,
            saved_sec = original - planned,
            "Job completed"
        );
    }

    pub fn remapped(&self, chapters: usize, total_removed: f64) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            chapters,
            total_removed_sec = total_removed,
            "Job completed"
        );
    }

    pub fn failed(&self, err: &WorkerError) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            kind = err.kind(),
            error = %err,
            "Job failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_identity() {
        let clean = JobLogger::new(Operation::Clean);
        let remap = JobLogger::new(Operation::Remap);

        assert_eq!(clean.operation().as_str(), "clean");
        assert_eq!(remap.operation().to_string(), "remap");
        assert_ne!(clean.job_id(), remap.job_id());
    }

    #[test]
    fn test_events_without_subscriber() {
        let logger = JobLogger::new(Operation::Remap);
        let _guard = logger.span().entered();
        logger.no_removals("talk - pauses.json");
        logger.chapters_written(3, 1, Path::new("c_remapped.json"));
        logger.failed(&WorkerError::invalid_input("bad"));
    }
}

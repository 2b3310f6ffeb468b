//! Removal record written by the clean step.
//!
//! The record is the hand-off between cleaning and chapter remapping: a
//! later `remap` run rebuilds the timestamp map from the merged intervals
//! stored here without re-reading the transcript.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::interval::{MergedInterval, RemovalInterval, RemovalKind};

/// One merged interval as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RemovalRecordEntry {
    pub start: f64,
    pub end: f64,
    /// Length of the deleted span
    pub duration: f64,
    /// Magnitude used by the timestamp map
    pub magnitude: f64,
    pub kind: RemovalKind,
}

impl From<&MergedInterval> for RemovalRecordEntry {
    fn from(m: &MergedInterval) -> Self {
        Self {
            start: m.start,
            end: m.end,
            duration: m.span(),
            magnitude: m.magnitude,
            kind: m.kind,
        }
    }
}

impl From<&RemovalRecordEntry> for MergedInterval {
    fn from(e: &RemovalRecordEntry) -> Self {
        MergedInterval::new(e.start, e.end, e.kind, e.magnitude)
    }
}

/// A raw pause candidate as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PauseEntry {
    pub start: f64,
    pub end: f64,
    pub duration: f64,
}

/// A detected filler token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FillerHit {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Everything a later chapter remap needs to know about one clean run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RemovalRecord {
    #[serde(alias = "source_video")]
    pub source_media: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub pause_threshold: f64,
    #[serde(default)]
    pub intervals: Vec<RemovalRecordEntry>,
    #[serde(default)]
    pub pauses: Vec<PauseEntry>,
    #[serde(default)]
    pub fillers: Vec<FillerHit>,
    #[serde(default)]
    pub total_pause_time: f64,
    #[serde(default)]
    pub total_filler_count: usize,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

impl RemovalRecord {
    /// Build a record from raw candidates and the merged plan input.
    pub fn new(
        source_media: impl Into<String>,
        transcript: Option<String>,
        pause_threshold: f64,
        candidates: &[RemovalInterval],
        merged: &[MergedInterval],
    ) -> Self {
        let mut pauses: Vec<PauseEntry> = candidates
            .iter()
            .filter(|c| c.kind == RemovalKind::Pause)
            .map(|c| PauseEntry {
                start: c.start,
                end: c.end,
                duration: c.magnitude,
            })
            .collect();
        pauses.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut fillers: Vec<FillerHit> = candidates
            .iter()
            .filter(|c| c.kind == RemovalKind::Filler)
            .map(|c| FillerHit {
                word: c.token.clone().unwrap_or_default(),
                start: c.start,
                end: c.end,
            })
            .collect();
        fillers.sort_by(|a, b| a.start.total_cmp(&b.start));

        Self {
            source_media: source_media.into(),
            transcript,
            pause_threshold,
            intervals: merged.iter().map(RemovalRecordEntry::from).collect(),
            total_pause_time: pauses.iter().map(|p| p.duration).sum(),
            total_filler_count: fillers.len(),
            pauses,
            fillers,
            generated_at: Utc::now(),
        }
    }

    /// Merged intervals for building a timestamp map.
    ///
    /// Records written without merged intervals fall back to their raw
    /// pauses, which are disjoint by construction.
    pub fn merged_intervals(&self) -> Vec<MergedInterval> {
        let mut intervals: Vec<MergedInterval> = if self.intervals.is_empty() {
            self.pauses
                .iter()
                .map(|p| MergedInterval::new(p.start, p.end, RemovalKind::Pause, p.duration))
                .collect()
        } else {
            self.intervals.iter().map(MergedInterval::from).collect()
        };
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));
        intervals
    }
}

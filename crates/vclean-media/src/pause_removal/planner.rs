//! Keep-segment planning.
//!
//! The keep list is the complement of the merged removal set over
//! `[0, total_duration)`:
//!
//! ```text
//!  original  |==== keep ====|~~ pause ~~|==== keep ====|~ filler ~|== keep ==|
//!  segments  [cursor, r.start + tail)    [r.end + padding, ...)
//! ```
//!
//! A pause cut keeps `tail_buffer` seconds past its start; a filler cut keeps
//! none. Every cut skips `padding` seconds after its end.

use serde::Serialize;
use tracing::{debug, warn};
use vclean_models::{KeepSegment, MergedInterval, RemovalKind};

use super::config::EditConfig;
use crate::error::{MediaError, MediaResult};

/// Statistics about a keep plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanStats {
    /// Source duration in seconds.
    pub total_duration: f64,
    /// Sum of kept segment durations.
    pub kept_duration: f64,
    /// Everything not kept (removals, padding, dropped segments).
    pub removed_duration: f64,
    /// Ratio of kept content (0.0 to 1.0).
    pub keep_ratio: f64,
    pub kept_count: usize,
    pub dropped_count: usize,
}

/// Result of planning.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentPlan {
    /// Ordered, non-overlapping keep segments.
    pub segments: Vec<KeepSegment>,
    /// Segments dropped for being shorter than the minimum.
    pub dropped: Vec<KeepSegment>,
    pub stats: PlanStats,
}

impl SegmentPlan {
    /// Planned duration of the edited artifact.
    pub fn edited_duration(&self) -> f64 {
        self.stats.kept_duration
    }
}

/// Turns merged removal intervals into keep segments.
#[derive(Debug, Clone)]
pub struct SegmentPlanner {
    padding: f64,
    tail_buffer: f64,
    min_segment: f64,
}

impl SegmentPlanner {
    pub fn new(padding: f64, tail_buffer: f64, min_segment: f64) -> Self {
        Self {
            padding: padding.max(0.0),
            tail_buffer: tail_buffer.max(0.0),
            min_segment: min_segment.max(0.0),
        }
    }

    pub fn from_config(config: &EditConfig) -> Self {
        Self::new(config.padding, config.tail_buffer, config.min_segment)
    }

    /// Plan keep segments for `merged` (sorted, disjoint) over
    /// `[0, total_duration)`.
    ///
    /// # Errors
    /// `InvalidInput` for a non-positive duration, `EmptyTimeline` when no
    /// segment survives.
    pub fn plan(&self, merged: &[MergedInterval], total_duration: f64) -> MediaResult<SegmentPlan> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(MediaError::invalid_input(format!(
                "media duration must be positive, got {}",
                total_duration
            )));
        }

        let mut candidates = Vec::with_capacity(merged.len() + 1);
        let mut cursor = 0.0_f64;
        let mut preceding_removed = 0.0_f64;

        for r in merged {
            if cursor < r.start {
                let tail = match r.kind {
                    RemovalKind::Pause => self.tail_buffer,
                    RemovalKind::Filler => 0.0,
                };
                // The tail buffer never reaches past the removed span.
                let end = (r.start + tail).min(r.end).min(total_duration);
                candidates.push(KeepSegment::new(cursor, end, preceding_removed));
            }

            preceding_removed = match r.kind {
                RemovalKind::Pause => r.magnitude,
                RemovalKind::Filler => 0.0,
            };
            cursor = cursor.max(r.end + self.padding);
        }

        if cursor < total_duration {
            candidates.push(KeepSegment::new(cursor, total_duration, preceding_removed));
        }

        let (segments, dropped): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .partition(|s| s.duration() >= self.min_segment && s.end > s.start);

        for seg in &dropped {
            warn!(
                start_sec = seg.start,
                end_sec = seg.end,
                duration_sec = seg.duration(),
                min_segment_sec = self.min_segment,
                "Dropping degenerate keep segment"
            );
        }

        if segments.is_empty() {
            return Err(MediaError::EmptyTimeline(format!(
                "no keep segment of at least {:.3}s remains ({} dropped)",
                self.min_segment,
                dropped.len()
            )));
        }

        let kept_duration: f64 = segments.iter().map(KeepSegment::duration).sum();
        let stats = PlanStats {
            total_duration,
            kept_duration,
            removed_duration: (total_duration - kept_duration).max(0.0),
            keep_ratio: kept_duration / total_duration,
            kept_count: segments.len(),
            dropped_count: dropped.len(),
        };

        debug!(
            kept = stats.kept_count,
            dropped = stats.dropped_count,
            keep_ratio = format!("{:.1}%", stats.keep_ratio * 100.0),
            "Planned keep segments"
        );

        Ok(SegmentPlan {
            segments,
            dropped,
            stats,
        })
    }
}

//! Original-to-edited timestamp mapping.

use serde::{Deserialize, Serialize};
use vclean_models::MergedInterval;

/// How much edited-timeline time each removal interval accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemapPolicy {
    /// Subtract the interval's magnitude (the pause gap; `0` for filler cuts).
    #[default]
    Magnitude,
    /// Subtract the full removed span, fillers included.
    RemovedSpan,
}

/// Result of a single lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemapLookup {
    /// Position on the edited timeline.
    pub time: f64,
    /// The interval the query fell strictly inside, if any.
    pub snapped_by: Option<MergedInterval>,
}

impl RemapLookup {
    pub fn snapped(&self) -> bool {
        self.snapped_by.is_some()
    }
}

/// Monotonic map from the original timeline to the edited timeline.
#[derive(Debug, Clone)]
pub struct TimestampRemapper {
    intervals: Vec<MergedInterval>,
    /// `removed_before[i]`: total weight of `intervals[..i]`
    removed_before: Vec<f64>,
    policy: RemapPolicy,
}

impl TimestampRemapper {
    /// Build from merged intervals (sorted here; must be disjoint).
    pub fn new(intervals: impl IntoIterator<Item = MergedInterval>) -> Self {
        Self::with_policy(intervals, RemapPolicy::default())
    }

    pub fn with_policy(intervals: impl IntoIterator<Item = MergedInterval>, policy: RemapPolicy) -> Self {
        let mut intervals: Vec<MergedInterval> = intervals.into_iter().collect();
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut removed_before = Vec::with_capacity(intervals.len() + 1);
        let mut total = 0.0;
        removed_before.push(total);
        for r in &intervals {
            total += weight(r, policy);
            removed_before.push(total);
        }

        Self {
            intervals,
            removed_before,
            policy,
        }
    }

    pub fn policy(&self) -> RemapPolicy {
        self.policy
    }

    /// Number of removal intervals.
    pub fn removal_count(&self) -> usize {
        self.intervals.len()
    }

    /// Total time subtracted once past the last interval.
    pub fn total_removed(&self) -> f64 {
        self.removed_before.last().copied().unwrap_or(0.0)
    }

    /// Map an original timestamp onto the edited timeline.
    pub fn map(&self, t: f64) -> f64 {
        self.lookup(t).time
    }

    /// Map `t` and report the interval it was snapped out of.
    ///
    /// A time strictly inside a removal interval snaps forward to the cut
    /// boundary: the part of the interval before `t` counts as removed.
    pub fn lookup(&self, t: f64) -> RemapLookup {
        let idx = self.intervals.partition_point(|r| r.end <= t);
        let mut removed = self.removed_before[idx];

        let snapped_by = self
            .intervals
            .get(idx)
            .filter(|r| r.contains_strictly(t))
            .copied();
        if let Some(r) = snapped_by {
            removed += t - r.start;
        }

        RemapLookup {
            time: (t - removed).max(0.0),
            snapped_by,
        }
    }
}

fn weight(r: &MergedInterval, policy: RemapPolicy) -> f64 {
    match policy {
        RemapPolicy::Magnitude => r.magnitude.clamp(0.0, r.span()),
        RemapPolicy::RemovedSpan => r.span(),
    }
}

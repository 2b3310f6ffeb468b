//! Transcript-driven pause and filler removal.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ Word timeline│───►│ Detector     │───►│ Merger       │───►│ Planner      │──► keep segments
//! │ (transcript) │    │ (candidates) │    │ (disjoint)   │    │ (complement) │
//! └──────────────┘    └──────────────┘    └──────┬───────┘    └──────────────┘
//!                                                │
//!                                                ▼
//!                                         ┌──────────────┐
//!                                         │ Remapper     │──► chapter timestamps
//!                                         └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use vclean_media::pause_removal::{plan_edit, EditConfig};
//!
//! let edit = plan_edit(&transcript.words, duration, &EditConfig::default())?;
//! let remapper = edit.remapper();
//! ```

mod config;
mod detect;
mod merge;
mod planner;
mod remap;

pub use config::{EditConfig, DEFAULT_FILLERS};
pub use detect::{normalize_token, RemovalDetector};
pub use merge::{merge_intervals, FILLER_OVERRIDES_PAUSE};
pub use planner::{PlanStats, SegmentPlan, SegmentPlanner};
pub use remap::{RemapLookup, RemapPolicy, TimestampRemapper};

use tracing::debug;
use vclean_models::{MergedInterval, RemovalInterval, Word};

use crate::error::MediaResult;

/// Everything computed for one edit job before any media is touched.
#[derive(Debug, Clone)]
pub struct EditPlan {
    /// Unmerged detector output
    pub candidates: Vec<RemovalInterval>,
    /// Disjoint, sorted removal intervals
    pub merged: Vec<MergedInterval>,
    pub plan: SegmentPlan,
}

impl EditPlan {
    /// Timestamp map for this plan.
    pub fn remapper(&self) -> TimestampRemapper {
        TimestampRemapper::new(self.merged.iter().copied())
    }
}

/// Detect, merge and plan in one pass.
pub fn plan_edit(words: &[Word], total_duration: f64, config: &EditConfig) -> MediaResult<EditPlan> {
    let candidates = RemovalDetector::from_config(config).detect(words);
    let merged = merge_intervals(&candidates, total_duration);
    debug!(
        candidates = candidates.len(),
        merged = merged.len(),
        "Merged removal candidates"
    );
    let plan = SegmentPlanner::from_config(config).plan(&merged, total_duration)?;

    Ok(EditPlan {
        candidates,
        merged,
        plan,
    })
}

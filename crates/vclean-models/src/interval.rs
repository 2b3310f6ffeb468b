//! Removal intervals and keep segments.
//!
//! All times are seconds on the original (unedited) timeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of content a removal interval deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RemovalKind {
    /// Silence between two consecutive words
    Pause,
    /// A filler token (verbal tic)
    Filler,
}

impl RemovalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalKind::Pause => "pause",
            RemovalKind::Filler => "filler",
        }
    }
}

impl fmt::Display for RemovalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single unmerged removal candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RemovalInterval {
    pub start: f64,
    pub end: f64,
    pub kind: RemovalKind,
    /// Gap duration for pauses, `0` for fillers
    pub magnitude: f64,
    /// Matched filler token (normalized), fillers only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl RemovalInterval {
    /// Create a pause candidate spanning `[start, end)`.
    pub fn pause(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            kind: RemovalKind::Pause,
            magnitude: end - start,
            token: None,
        }
    }

    /// Create a filler candidate for a matched token.
    pub fn filler(start: f64, end: f64, token: impl Into<String>) -> Self {
        Self {
            start,
            end,
            kind: RemovalKind::Filler,
            magnitude: 0.0,
            token: Some(token.into()),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// A disjoint removal interval produced by the merger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MergedInterval {
    pub start: f64,
    pub end: f64,
    pub kind: RemovalKind,
    /// Largest pause magnitude among participants for pauses, `0` for fillers
    pub magnitude: f64,
}

impl MergedInterval {
    pub fn new(start: f64, end: f64, kind: RemovalKind, magnitude: f64) -> Self {
        Self {
            start,
            end,
            kind,
            magnitude,
        }
    }

    /// Length of the deleted span.
    pub fn span(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether `t` lies strictly inside the interval.
    pub fn contains_strictly(&self, t: f64) -> bool {
        self.start < t && t < self.end
    }
}

/// A contiguous range of the original timeline retained in the output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeepSegment {
    pub start: f64,
    pub end: f64,
    /// Length of the pause skipped right before this segment (`0` after a filler cut)
    pub preceding_removed: f64,
}

impl KeepSegment {
    pub fn new(start: f64, end: f64, preceding_removed: f64) -> Self {
        Self {
            start,
            end,
            preceding_removed,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

//! Configuration for pause and filler removal.

use serde::{Deserialize, Serialize};

/// Korean filler tokens that are unambiguous on their own.
pub const DEFAULT_FILLERS: &[&str] = &["어", "음", "아", "이", "오", "저"];

/// Detection and planning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditConfig {
    /// Minimum inter-word gap treated as a pause (seconds).
    pub pause_threshold: f64,

    /// Time skipped right after every cut (seconds).
    ///
    /// Swallows residual sound at the end of the removed span.
    pub padding: f64,

    /// Time retained before a pause cut (seconds).
    ///
    /// Never applied before a filler cut, which would bring the filler back.
    pub tail_buffer: f64,

    /// Keep segments shorter than this are dropped (seconds).
    pub min_segment: f64,

    /// Whether filler tokens are removed at all.
    pub remove_fillers: bool,

    /// Filler tokens, compared after normalization.
    pub fillers: Vec<String>,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            pause_threshold: 1.0,
            padding: 0.1,
            tail_buffer: 0.15,
            min_segment: 0.1,
            remove_fillers: true,
            fillers: DEFAULT_FILLERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EditConfig {
    /// Builder-style setter for the pause threshold.
    pub fn with_pause_threshold(mut self, secs: f64) -> Self {
        self.pause_threshold = secs.max(0.0);
        self
    }

    /// Builder-style setter for post-cut padding.
    pub fn with_padding(mut self, secs: f64) -> Self {
        self.padding = secs.max(0.0);
        self
    }

    /// Builder-style setter for the pre-pause tail buffer.
    pub fn with_tail_buffer(mut self, secs: f64) -> Self {
        self.tail_buffer = secs.max(0.0);
        self
    }

    pub fn with_min_segment(mut self, secs: f64) -> Self {
        self.min_segment = secs.max(0.0);
        self
    }

    /// Replace the filler set.
    pub fn with_fillers<I, S>(mut self, fillers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fillers = fillers.into_iter().map(Into::into).collect();
        self
    }

    /// Only remove pauses.
    pub fn without_fillers(mut self) -> Self {
        self.remove_fillers = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditConfig::default();
        assert_eq!(config.pause_threshold, 1.0);
        assert_eq!(config.padding, 0.1);
        assert_eq!(config.tail_buffer, 0.15);
        assert_eq!(config.min_segment, 0.1);
        assert_eq!(config.fillers.len(), 6);
        assert!(config.remove_fillers);
    }

    #[test]
    fn test_builder_clamps_negative() {
        let config = EditConfig::default()
            .with_padding(-1.0)
            .with_pause_threshold(2.5)
            .without_fillers();
        assert_eq!(config.padding, 0.0);
        assert_eq!(config.pause_threshold, 2.5);
        assert!(!config.remove_fillers);
    }
}

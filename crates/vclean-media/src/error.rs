//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while planning or assembling an edit.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    /// An external tool exited with a non-zero status.
    #[error("{tool} failed: {message}")]
    ToolFailed {
        tool: String,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    /// An external tool exceeded its wall-clock budget and was killed.
    #[error("{tool} timed out after {secs} seconds")]
    Timeout { tool: String, secs: u64 },

    #[error("Operation cancelled")]
    Cancelled,

    /// Every planned keep segment was dropped or nothing was left to keep.
    #[error("Edit plan is empty: {0}")]
    EmptyTimeline(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid media file: {0}")]
    InvalidMedia(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a tool failure error.
    pub fn tool_failed(
        tool: impl Into<String>,
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this is an external tool invocation failure (non-zero exit,
    /// timeout, or missing binary).
    pub fn is_tool_invocation(&self) -> bool {
        matches!(
            self,
            MediaError::ToolFailed { .. } | MediaError::Timeout { .. } | MediaError::ToolNotFound(_)
        )
    }

    /// Whether this error stems from bad caller input.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MediaError::InvalidInput(_) | MediaError::FileNotFound(_) | MediaError::InvalidMedia(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_tool_invocation() {
        let err = MediaError::Timeout {
            tool: "ffmpeg".to_string(),
            secs: 5,
        };
        assert!(err.is_tool_invocation());
        assert_eq!(err.to_string(), "ffmpeg timed out after 5 seconds");
    }

    #[test]
    fn test_input_error_classification() {
        assert!(MediaError::FileNotFound(PathBuf::from("x.mp4")).is_input_error());
        assert!(!MediaError::EmptyTimeline("no segments".into()).is_input_error());
    }
}

//! Worker error types.

use thiserror::Error;
use vclean_media::MediaError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transcript error: {0}")]
    Transcript(#[from] vclean_models::TranscriptError),

    #[error("Chapters error: {0}")]
    Chapters(#[from] vclean_models::ChapterError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Bad transcript, media path or chapters file.
    pub fn is_input_error(&self) -> bool {
        match self {
            WorkerError::InvalidInput(_)
            | WorkerError::Transcript(_)
            | WorkerError::Chapters(_) => true,
            WorkerError::Media(e) => e.is_input_error(),
            _ => false,
        }
    }

    /// An external tool failed, timed out, or is missing.
    pub fn is_tool_invocation(&self) -> bool {
        matches!(self, WorkerError::Media(e) if e.is_tool_invocation())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkerError::Media(MediaError::Cancelled))
    }

    /// Short category for logs.
    pub fn kind(&self) -> &'static str {
        if self.is_input_error() {
            "input"
        } else if self.is_tool_invocation() {
            "tool_invocation"
        } else if self.is_cancelled() {
            "cancelled"
        } else if matches!(self, WorkerError::ConfigError(_)) {
            "config"
        } else if matches!(self, WorkerError::Media(MediaError::EmptyTimeline(_))) {
            "empty_timeline"
        } else {
            "internal"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            WorkerError::from(vclean_models::TranscriptError::Empty).kind(),
            "input"
        );
        assert_eq!(
            WorkerError::from(MediaError::FileNotFound(PathBuf::from("a.mp4"))).kind(),
            "input"
        );
        assert_eq!(
            WorkerError::from(MediaError::Timeout {
                tool: "ffmpeg".into(),
                secs: 1
            })
            .kind(),
            "tool_invocation"
        );
        assert_eq!(
            WorkerError::from(MediaError::EmptyTimeline("x".into())).kind(),
            "empty_timeline"
        );
        assert!(WorkerError::from(MediaError::Cancelled).is_cancelled());
        assert_eq!(WorkerError::config_error("bad").kind(), "config");
    }
}

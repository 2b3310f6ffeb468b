//! Word-level transcript model.
//!
//! The transcript is produced by an external transcription step and is
//! read-only here. Words are expected in playback order.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single transcribed word with its time span in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Word {
    /// Word text as transcribed (may carry surrounding whitespace)
    #[serde(rename = "word", alias = "text")]
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Duration of the word in seconds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Transcript validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscriptError {
    #[error("Transcript contains no words")]
    Empty,

    #[error("Word {index} has a non-finite timestamp")]
    NonFinite { index: usize },

    #[error("Word {index} has a negative start ({start:.3}s)")]
    NegativeStart { index: usize, start: f64 },

    #[error("Word {index} ends before it starts ({start:.3}s > {end:.3}s)")]
    EndBeforeStart { index: usize, start: f64, end: f64 },

    #[error("Word {index} starts at {start:.3}s, before the previous word at {previous:.3}s")]
    NonMonotonic {
        index: usize,
        previous: f64,
        start: f64,
    },

    #[error("Invalid transcript JSON: {0}")]
    Json(String),
}

/// A word-level transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Transcript {
    /// Words in playback order
    #[serde(default)]
    pub words: Vec<Word>,
    /// Transcript language, when the transcriber reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptShape {
    Document(Transcript),
    Words(Vec<Word>),
}

impl Transcript {
    pub fn new(words: Vec<Word>) -> Self {
        Self {
            words,
            language: None,
        }
    }

    /// Parse a transcript from JSON.
    ///
    /// Accepts either `{"words": [...]}` or a bare array of words.
    pub fn from_json_str(json: &str) -> Result<Self, TranscriptError> {
        let shape: TranscriptShape =
            serde_json::from_str(json).map_err(|e| TranscriptError::Json(e.to_string()))?;
        Ok(match shape {
            TranscriptShape::Document(t) => t,
            TranscriptShape::Words(words) => Self::new(words),
        })
    }

    /// Check the ordering contract: non-empty, finite, `end >= start`,
    /// and `start` non-decreasing.
    pub fn validate(&self) -> Result<(), TranscriptError> {
        if self.words.is_empty() {
            return Err(TranscriptError::Empty);
        }

        let mut previous: Option<f64> = None;
        for (index, word) in self.words.iter().enumerate() {
            if !word.start.is_finite() || !word.end.is_finite() {
                return Err(TranscriptError::NonFinite { index });
            }
            if word.start < 0.0 {
                return Err(TranscriptError::NegativeStart {
                    index,
                    start: word.start,
                });
            }
            if word.end < word.start {
                return Err(TranscriptError::EndBeforeStart {
                    index,
                    start: word.start,
                    end: word.end,
                });
            }
            if let Some(prev) = previous {
                if word.start < prev {
                    return Err(TranscriptError::NonMonotonic {
                        index,
                        previous: prev,
                        start: word.start,
                    });
                }
            }
            previous = Some(word.start);
        }
        Ok(())
    }

    /// Latest word end on the timeline.
    pub fn speech_end(&self) -> f64 {
        self.words.iter().map(|w| w.end).fold(0.0, f64::max)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_and_bare_array() {
        let doc = r#"{"words": [{"word": " hello", "start": 0.0, "end": 0.5}], "language": "ko"}"#;
        let t = Transcript::from_json_str(doc).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.words[0].text, " hello");
        assert_eq!(t.language.as_deref(), Some("ko"));

        let bare = r#"[{"text": "a", "start": 1.0, "end": 1.2}]"#;
        let t = Transcript::from_json_str(bare).unwrap();
        assert_eq!(t.words[0].text, "a");
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(Transcript::default().validate(), Err(TranscriptError::Empty));
    }

    #[test]
    fn test_validate_non_monotonic() {
        let t = Transcript::new(vec![Word::new("a", 2.0, 2.5), Word::new("b", 1.0, 1.5)]);
        assert!(matches!(
            t.validate(),
            Err(TranscriptError::NonMonotonic { index: 1, .. })
        ));
    }

    #[test]
    fn test_validate_end_before_start() {
        let t = Transcript::new(vec![Word::new("a", 2.0, 1.5)]);
        assert!(matches!(
            t.validate(),
            Err(TranscriptError::EndBeforeStart { index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_accepts_equal_starts() {
        let t = Transcript::new(vec![Word::new("a", 1.0, 1.2), Word::new("b", 1.0, 1.4)]);
        assert!(t.validate().is_ok());
        assert!((t.speech_end() - 1.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Transcript::from_json_str("{not json"),
            Err(TranscriptError::Json(_))
        ));
    }
}

//! Chapter markers.
//!
//! Chapter files come from an external chapter-suggestion step and show up
//! in a few shapes: a bare list, or an object with `chapters` or
//! `suggestions`; each entry is either an object (`start` or `timestamp`,
//! `title`, `description`) or a `[start, title, description]` tuple. Start
//! times may be seconds or clock strings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::timestamp::{parse_timestamp, TimestampError};

/// Chapter file errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChapterError {
    #[error("Invalid chapters JSON: {0}")]
    Json(String),

    #[error("Chapters document has no chapter list")]
    MissingList,

    #[error("Chapter {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error("Chapter {index}: {source}")]
    Timestamp {
        index: usize,
        #[source]
        source: TimestampError,
    },
}

/// A chapter marker on the original timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChapterMarker {
    pub original_start: f64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Unrecognized fields from the source entry, carried through untouched
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: Map<String, Value>,
}

impl ChapterMarker {
    pub fn new(original_start: f64, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            original_start,
            title: title.into(),
            description: description.into(),
            extra: Map::new(),
        }
    }
}

/// A chapter marker after remapping onto the edited timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RemappedChapter {
    /// Start on the edited timeline
    pub start: f64,
    /// End on the edited timeline (next chapter's start, or artifact end)
    pub end: f64,
    /// Start on the original timeline, kept for audit
    pub original_start: f64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Whether the original start fell inside a removed interval
    #[serde(default)]
    pub snapped: bool,
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: Map<String, Value>,
}

/// Parse a chapters document in any of the supported shapes.
pub fn parse_chapters(json: &str) -> Result<Vec<ChapterMarker>, ChapterError> {
    let value: Value = serde_json::from_str(json).map_err(|e| ChapterError::Json(e.to_string()))?;

    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj
            .remove("chapters")
            .or_else(|| obj.remove("suggestions"))
        {
            Some(Value::Array(items)) => items,
            _ => return Err(ChapterError::MissingList),
        },
        _ => return Err(ChapterError::MissingList),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| parse_entry(index, entry))
        .collect()
}

fn parse_entry(index: usize, entry: Value) -> Result<ChapterMarker, ChapterError> {
    match entry {
        Value::Array(items) => {
            let mut items = items.into_iter();
            let start = items.next().ok_or_else(|| ChapterError::InvalidEntry {
                index,
                reason: "empty tuple".to_string(),
            })?;
            let original_start = parse_start(index, &start)?;
            let title = items
                .next()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| default_title(index));
            let description = items
                .next()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            Ok(ChapterMarker::new(original_start, title, description))
        }
        Value::Object(mut obj) => {
            // A previously remapped list is re-anchored from its source time.
            let remapped_from = obj.remove("original_start");
            let start = obj.remove("start").or_else(|| obj.remove("timestamp"));
            let start = remapped_from
                .or(start)
                .ok_or_else(|| ChapterError::InvalidEntry {
                    index,
                    reason: "missing start".to_string(),
                })?;
            let original_start = parse_start(index, &start)?;
            let title = match obj.remove("title") {
                Some(Value::String(s)) => s,
                _ => default_title(index),
            };
            let description = match obj.remove("description") {
                Some(Value::String(s)) => s,
                _ => String::new(),
            };
            // Recomputed on every remap.
            obj.remove("end");
            obj.remove("snapped");

            Ok(ChapterMarker {
                original_start,
                title,
                description,
                extra: obj,
            })
        }
        other => Err(ChapterError::InvalidEntry {
            index,
            reason: format!("unsupported entry: {}", other),
        }),
    }
}

fn parse_start(index: usize, value: &Value) -> Result<f64, ChapterError> {
    match value {
        Value::Number(n) => {
            let secs = n.as_f64().ok_or_else(|| ChapterError::InvalidEntry {
                index,
                reason: format!("start is not a number: {}", n),
            })?;
            if secs < 0.0 {
                return Err(ChapterError::Timestamp {
                    index,
                    source: TimestampError::Negative,
                });
            }
            Ok(secs)
        }
        Value::String(s) => {
            parse_timestamp(s).map_err(|source| ChapterError::Timestamp { index, source })
        }
        other => Err(ChapterError::InvalidEntry {
            index,
            reason: format!("unsupported start value: {}", other),
        }),
    }
}

fn default_title(index: usize) -> String {
    format!("Chapter {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_list() {
        let json = r#"{"chapters": [
            {"start": 0, "title": "Intro", "description": "hello"},
            {"timestamp": "01:30", "title": "Main", "confidence": 0.9}
        ]}"#;
        let chapters = parse_chapters(json).unwrap();
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Intro");
        assert_eq!(chapters[1].original_start, 90.0);
        assert_eq!(chapters[1].description, "");
        assert!(chapters[1].extra.contains_key("confidence"));
    }

    #[test]
    fn test_parse_suggestions_and_tuples() {
        let json = r#"{"suggestions": [[12.5, "Setup", "desc"], [30]]}"#;
        let chapters = parse_chapters(json).unwrap();
        assert_eq!(chapters[0].original_start, 12.5);
        assert_eq!(chapters[0].description, "desc");
        assert_eq!(chapters[1].title, "Chapter 2");
    }

    #[test]
    fn test_parse_bare_list() {
        let chapters = parse_chapters(r#"[{"start": 5, "title": "A"}]"#).unwrap();
        assert_eq!(chapters.len(), 1);
    }

    #[test]
    fn test_missing_start_is_error() {
        let err = parse_chapters(r#"[{"title": "A"}]"#).unwrap_err();
        assert!(matches!(err, ChapterError::InvalidEntry { index: 0, .. }));
    }

    #[test]
    fn test_missing_list_is_error() {
        assert_eq!(parse_chapters(r#"{"foo": 1}"#), Err(ChapterError::MissingList));
    }

    #[test]
    fn test_remapped_output_reparses_with_original_start() {
        let json = r#"[{"start": 45, "end": 60, "original_start": 50, "title": "A", "snapped": false}]"#;
        let chapters = parse_chapters(json).unwrap();
        assert_eq!(chapters[0].original_start, 50.0);
        assert!(chapters[0].extra.is_empty());
    }

    #[test]
    fn test_remapped_output_with_timestamp_key() {
        let json = r#"[{"timestamp": "00:45", "original_start": "00:50", "title": "A"}]"#;
        let chapters = parse_chapters(json).unwrap();
        assert_eq!(chapters[0].original_start, 50.0);
        assert!(!chapters[0].extra.contains_key("timestamp"));
    }
}

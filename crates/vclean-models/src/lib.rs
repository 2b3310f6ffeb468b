//! Shared data models for the vclean timeline editor.
//!
//! This crate provides Serde-serializable types for:
//! - Word-level transcripts (input contract from transcription)
//! - Removal intervals, merged intervals and keep segments
//! - Chapter markers before and after remapping
//! - The removal record written for later chapter remapping
//! - Encoding configuration and job identifiers

pub mod chapter;
pub mod encoding;
pub mod interval;
pub mod job;
pub mod record;
pub mod timestamp;
pub mod transcript;

pub use chapter::{parse_chapters, ChapterError, ChapterMarker, RemappedChapter};
pub use encoding::{CutMode, EncodingConfig};
pub use interval::{KeepSegment, MergedInterval, RemovalInterval, RemovalKind};
pub use job::JobId;
pub use record::{FillerHit, PauseEntry, RemovalRecord, RemovalRecordEntry};
pub use timestamp::{format_chapter_timestamp, format_clock, parse_timestamp, TimestampError};
pub use transcript::{Transcript, TranscriptError, Word};

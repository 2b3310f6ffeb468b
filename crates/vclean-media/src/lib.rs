#![deny(unreachable_patterns)]
//! Timeline cut planning and FFmpeg CLI wrapper.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeout and cancellation
//! - FFprobe media probing
//! - Pause and filler detection, interval merging, keep-segment planning
//! - The original-to-edited timestamp map
//! - Parallel segment cutting and lossless concatenation
//! - Chapter remapping and embedding

pub mod assemble;
pub mod chapters;
pub mod command;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod pause_removal;
pub mod probe;

pub use assemble::{AssembleOptions, AssembleOutput, MediaAssembler};
pub use chapters::{embed_chapters, ChapterRemapWriter, RemappedChapters};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use pause_removal::{
    merge_intervals, plan_edit, EditConfig, EditPlan, RemapPolicy, RemovalDetector, SegmentPlan,
    SegmentPlanner, TimestampRemapper,
};
pub use probe::{MediaInfo, Prober};

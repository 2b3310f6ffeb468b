//! Edit jobs for the vclean command line.
//!
//! This crate wires the timeline pipeline from `vclean-media` into two jobs:
//! - `clean`: transcript in, edited artifact, removal record and report out
//! - `remap`: chapters plus a removal record in, remapped chapter files out

pub mod clean_job;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod remap_job;
pub mod report;

pub use clean_job::{load_transcript, CleanJob, CleanOutcome, CleanRequest};
pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use layout::{ChapterLayout, OutputLayout};
pub use logging::{JobLogger, Operation};
pub use remap_job::{load_chapters, load_record, ChapterOutcome, RemapJob, RemapRequest};
pub use report::render_report;

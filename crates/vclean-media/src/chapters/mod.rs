//! Chapter markers through an edit: remap onto the edited timeline, render
//! the JSON, listing and FFMETADATA variants, and mux them into the artifact.

mod embed;
mod writer;

pub use embed::{embed_chapters, embed_command};
pub use writer::{ChapterRemapWriter, RemappedChapters, LAST_CHAPTER_FALLBACK_SECS};

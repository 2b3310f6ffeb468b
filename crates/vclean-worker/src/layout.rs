//! Deterministic input and output paths for a job.
//!
//! Every path a job reads or writes is derived here, once, from the media
//! path and the caller's overrides.

use std::path::{Path, PathBuf};

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

/// Extension with its leading dot, or empty.
fn dotted_ext(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

fn parent_of(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Paths for one clean job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub media: PathBuf,
    /// Word-level transcript input
    pub transcript: PathBuf,
    /// Edited artifact
    pub edited: PathBuf,
    /// Removal record for later chapter remapping
    pub record: PathBuf,
    /// Human-readable edit report
    pub report: PathBuf,
    /// Edited artifact with embedded chapters
    pub with_chapters: PathBuf,
}

impl OutputLayout {
    /// Build the layout for `media`.
    ///
    /// Outputs go next to the media unless `output_dir` is given; an explicit
    /// `edited` path wins over both and also anchors the report.
    pub fn new(
        media: &Path,
        transcript: Option<&Path>,
        edited: Option<&Path>,
        output_dir: Option<&Path>,
    ) -> Self {
        let media_dir = parent_of(media);
        let stem = stem_of(media);
        let ext = dotted_ext(media);
        let out_dir = output_dir.map(Path::to_path_buf).unwrap_or_else(|| media_dir.clone());

        let transcript = transcript
            .map(Path::to_path_buf)
            .unwrap_or_else(|| media_dir.join(format!("{} - transcript.json", stem)));
        let edited = edited
            .map(Path::to_path_buf)
            .unwrap_or_else(|| out_dir.join(format!("{} - edited{}", stem, ext)));
        let report = parent_of(&edited).join(format!("{}_edit_report.txt", stem_of(&edited)));

        Self {
            media: media.to_path_buf(),
            transcript,
            record: out_dir.join(format!("{} - pauses.json", stem)),
            with_chapters: out_dir.join(format!("{} - chapters{}", stem, dotted_ext(&edited))),
            edited,
            report,
        }
    }
}

/// Paths for the chapter outputs derived from one chapters file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLayout {
    pub chapters: PathBuf,
    pub remapped_json: PathBuf,
    pub youtube: PathBuf,
    pub ffmetadata: PathBuf,
}

impl ChapterLayout {
    /// `remapped_json` overrides the default `<chapters stem>_remapped.json`;
    /// the listing and metadata files are named after it.
    pub fn new(chapters: &Path, remapped_json: Option<&Path>, output_dir: Option<&Path>) -> Self {
        let out_dir = output_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| parent_of(chapters));
        let remapped_json = remapped_json
            .map(Path::to_path_buf)
            .unwrap_or_else(|| out_dir.join(format!("{}_remapped.json", stem_of(chapters))));
        let dir = parent_of(&remapped_json);
        let stem = stem_of(&remapped_json);

        Self {
            chapters: chapters.to_path_buf(),
            youtube: dir.join(format!("{}_youtube.txt", stem)),
            ffmetadata: dir.join(format!("{}_ffmetadata.txt", stem)),
            remapped_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let layout = OutputLayout::new(Path::new("/videos/talk.mov"), None, None, None);
        assert_eq!(layout.transcript, Path::new("/videos/talk - transcript.json"));
        assert_eq!(layout.edited, Path::new("/videos/talk - edited.mov"));
        assert_eq!(layout.record, Path::new("/videos/talk - pauses.json"));
        assert_eq!(layout.report, Path::new("/videos/talk - edited_edit_report.txt"));
        assert_eq!(layout.with_chapters, Path::new("/videos/talk - chapters.mov"));
    }

    #[test]
    fn test_output_dir_and_explicit_output() {
        let layout = OutputLayout::new(
            Path::new("/videos/talk.mp4"),
            Some(Path::new("/t/words.json")),
            Some(Path::new("/final/cut.mkv")),
            Some(Path::new("/out")),
        );
        assert_eq!(layout.transcript, Path::new("/t/words.json"));
        assert_eq!(layout.edited, Path::new("/final/cut.mkv"));
        assert_eq!(layout.report, Path::new("/final/cut_edit_report.txt"));
        assert_eq!(layout.record, Path::new("/out/talk - pauses.json"));
        assert_eq!(layout.with_chapters, Path::new("/out/talk - chapters.mkv"));
    }

    #[test]
    fn test_relative_media() {
        let layout = OutputLayout::new(Path::new("talk.mp4"), None, None, None);
        assert_eq!(layout.edited, Path::new("./talk - edited.mp4"));
    }

    #[test]
    fn test_chapter_layout() {
        let layout = ChapterLayout::new(Path::new("/v/talk - chapters.json"), None, None);
        assert_eq!(layout.remapped_json, Path::new("/v/talk - chapters_remapped.json"));
        assert_eq!(layout.youtube, Path::new("/v/talk - chapters_remapped_youtube.txt"));
        assert_eq!(layout.ffmetadata, Path::new("/v/talk - chapters_remapped_ffmetadata.txt"));

        let custom = ChapterLayout::new(
            Path::new("/v/c.json"),
            Some(Path::new("/o/new.json")),
            None,
        );
        assert_eq!(custom.youtube, Path::new("/o/new_youtube.txt"));
    }
}

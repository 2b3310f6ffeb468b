//! Chapter remapping and serialization.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vclean_models::{format_chapter_timestamp, ChapterMarker, RemappedChapter};

use crate::pause_removal::{RemapPolicy, TimestampRemapper};

/// Length given to the last chapter when the edited artifact's duration is
/// unknown.
pub const LAST_CHAPTER_FALLBACK_SECS: f64 = 3600.0;

/// A remapped chapter list with its removal summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemappedChapters {
    pub chapters: Vec<RemappedChapter>,
    /// Seconds subtracted past the last removal interval
    pub total_removed: f64,
    pub removal_count: usize,
    /// Where the removal intervals came from
    pub source: String,
    pub policy: RemapPolicy,
    /// Chapters whose start fell inside a removed interval
    #[serde(default)]
    pub snapped_count: usize,
}

/// Applies a timestamp map to chapter markers.
#[derive(Debug, Clone)]
pub struct ChapterRemapWriter {
    remapper: TimestampRemapper,
    source: String,
}

impl ChapterRemapWriter {
    pub fn new(remapper: TimestampRemapper, source: impl Into<String>) -> Self {
        Self {
            remapper,
            source: source.into(),
        }
    }

    /// Remap `chapters` in order.
    ///
    /// Each chapter ends where the next one starts; the last ends at
    /// `artifact_end` (or a fixed hour past its start when unknown). A start
    /// that lands inside a removed interval is snapped to the cut boundary
    /// and logged, never dropped.
    pub fn remap(&self, chapters: &[ChapterMarker], artifact_end: Option<f64>) -> RemappedChapters {
        let mut snapped_count = 0;
        let starts: Vec<(f64, bool)> = chapters
            .iter()
            .enumerate()
            .map(|(i, ch)| {
                let lookup = self.remapper.lookup(ch.original_start);
                if let Some(r) = lookup.snapped_by {
                    snapped_count += 1;
                    warn!(
                        chapter = i,
                        title = %ch.title,
                        original_start_sec = ch.original_start,
                        removed_start_sec = r.start,
                        removed_end_sec = r.end,
                        kind = %r.kind,
                        new_start_sec = lookup.time,
                        "Chapter start falls inside a removed interval, snapping to cut boundary"
                    );
                }
                (lookup.time, lookup.snapped())
            })
            .collect();

        let remapped = chapters
            .iter()
            .zip(&starts)
            .enumerate()
            .map(|(i, (ch, &(start, snapped)))| {
                let end = match starts.get(i + 1) {
                    Some(&(next, _)) => next.max(start),
                    None => artifact_end
                        .map(|e| e.max(start))
                        .unwrap_or(start + LAST_CHAPTER_FALLBACK_SECS),
                };
                RemappedChapter {
                    start,
                    end,
                    original_start: ch.original_start,
                    title: ch.title.clone(),
                    description: ch.description.clone(),
                    snapped,
                    extra: ch.extra.clone(),
                }
            })
            .collect();

        info!(
            chapters = chapters.len(),
            snapped = snapped_count,
            total_removed_sec = self.remapper.total_removed(),
            "Remapped chapters"
        );

        RemappedChapters {
            chapters: remapped,
            total_removed: self.remapper.total_removed(),
            removal_count: self.remapper.removal_count(),
            source: self.source.clone(),
            policy: self.remapper.policy(),
            snapped_count,
        }
    }
}

impl RemappedChapters {
    /// Pretty JSON for the remapped chapter file.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// "timestamp title" listing for a platform description.
    pub fn youtube_listing(&self, video_name: Option<&str>) -> String {
        let mut lines = vec![
            match video_name {
                Some(name) if !name.is_empty() => format!("# YouTube Chapters for {}", name),
                _ => "# YouTube Chapters".to_string(),
            },
            String::new(),
            "Copy the following to your YouTube video description:".to_string(),
            String::new(),
            "---".to_string(),
            String::new(),
        ];
        for ch in &self.chapters {
            lines.push(format!("{} {}", format_chapter_timestamp(ch.start), ch.title));
        }
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());
        lines.join("\n")
    }

    /// FFmpeg metadata block with one `[CHAPTER]` per chapter.
    pub fn ffmetadata(&self) -> String {
        let mut out = String::from(";FFMETADATA1\n\n");
        for ch in &self.chapters {
            let start_ms = (ch.start * 1000.0).round() as u64;
            let end_ms = ((ch.end * 1000.0).round() as u64).max(start_ms);
            out.push_str("[CHAPTER]\nTIMEBASE=1/1000\n");
            out.push_str(&format!("START={}\nEND={}\n", start_ms, end_ms));
            out.push_str(&format!("title={}\n\n", escape_ffmetadata(&ch.title)));
        }
        out
    }
}

/// Escape the characters FFmpeg's metadata format treats specially.
fn escape_ffmetadata(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_models::{MergedInterval, RemovalKind};

    fn writer() -> ChapterRemapWriter {
        let remapper =
            TimestampRemapper::new([MergedInterval::new(10.0, 15.0, RemovalKind::Pause, 5.0)]);
        ChapterRemapWriter::new(remapper, "talk - pauses.json")
    }

    fn markers() -> Vec<ChapterMarker> {
        vec![
            ChapterMarker::new(0.0, "Intro", ""),
            ChapterMarker::new(12.0, "Setup", "inside the pause"),
            ChapterMarker::new(50.0, "Main", ""),
        ]
    }

    #[test]
    fn test_remap_starts_and_ends() {
        let out = writer().remap(&markers(), Some(80.0));
        let starts: Vec<f64> = out.chapters.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0.0, 10.0, 45.0]);
        assert_eq!(out.chapters[0].end, 10.0);
        assert_eq!(out.chapters[1].end, 45.0);
        assert_eq!(out.chapters[2].end, 80.0);
        assert_eq!(out.chapters[2].original_start, 50.0);
        assert!(out.chapters[1].snapped);
        assert_eq!(out.snapped_count, 1);
        assert_eq!(out.total_removed, 5.0);
        assert_eq!(out.removal_count, 1);
    }

    #[test]
    fn test_unknown_artifact_end() {
        let out = writer().remap(&markers(), None);
        assert_eq!(out.chapters[2].end, 45.0 + LAST_CHAPTER_FALLBACK_SECS);
    }

    #[test]
    fn test_ffmetadata_block() {
        let out = writer().remap(&markers(), Some(80.0));
        let meta = out.ffmetadata();
        assert!(meta.starts_with(";FFMETADATA1\n"));
        assert_eq!(meta.matches("[CHAPTER]").count(), 3);
        assert!(meta.contains("START=45000\nEND=80000\ntitle=Main"));
        assert!(meta.contains("START=0\nEND=10000\n"));
    }

    #[test]
    fn test_youtube_listing() {
        let out = writer().remap(&markers(), Some(80.0));
        let text = out.youtube_listing(Some("talk"));
        assert!(text.starts_with("# YouTube Chapters for talk"));
        assert!(text.contains("00:00 Intro\n00:10 Setup\n00:45 Main"));
    }

    #[test]
    fn test_escape_ffmetadata() {
        assert_eq!(escape_ffmetadata("Q&A; part=2 #1"), "Q&A\\; part\\=2 \\#1");
    }

    #[test]
    fn test_json_round_trip_keeps_summary() {
        let out = writer().remap(&markers(), Some(80.0));
        let json = out.to_json().unwrap();
        let back: RemappedChapters = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chapters.len(), 3);
        assert_eq!(back.source, "talk - pauses.json");
        assert_eq!(back.policy, RemapPolicy::Magnitude);
    }
}

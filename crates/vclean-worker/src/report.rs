//! Human-readable edit report.

use std::fmt::Write as _;

use vclean_models::{format_clock, KeepSegment, RemovalRecord};

const RULE_WIDTH: usize = 60;
const TOP_PAUSES: usize = 10;
const SAMPLE_EDITS: usize = 5;

/// Render the edit report for a planned job.
///
/// `original_duration` is the probed source duration; the edited duration is
/// the planned sum of keep segments.
pub fn render_report(record: &RemovalRecord, segments: &[KeepSegment], original_duration: f64) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let edited_duration: f64 = segments.iter().map(KeepSegment::duration).sum();
    let time_saved = (original_duration - edited_duration).max(0.0);
    let saved_pct = if original_duration > 0.0 {
        time_saved / original_duration * 100.0
    } else {
        0.0
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out, "EDIT REPORT");
    let _ = writeln!(out, "{}", heavy);
    let _ = writeln!(out);

    let _ = writeln!(out, "SUMMARY");
    let _ = writeln!(out, "{}", light);
    let _ = writeln!(out, "Source:             {}", record.source_media);
    let _ = writeln!(out, "Original Duration:  {}", format_clock(original_duration));
    let _ = writeln!(out, "Edited Duration:    {}", format_clock(edited_duration));
    let _ = writeln!(
        out,
        "Time Saved:         {} ({:.1}%)",
        format_clock(time_saved),
        saved_pct
    );
    let _ = writeln!(out, "Segments Kept:      {}", segments.len());
    let _ = writeln!(out);

    let _ = writeln!(out, "PAUSES REMOVED");
    let _ = writeln!(out, "{}", light);
    let _ = writeln!(out, "Total Pauses:       {}", record.pauses.len());
    let _ = writeln!(out, "Total Pause Time:   {:.2} seconds", record.total_pause_time);
    let _ = writeln!(out);

    if !record.pauses.is_empty() {
        let _ = writeln!(out, "Top {} Longest Pauses:", TOP_PAUSES);
        let mut longest: Vec<_> = record.pauses.iter().collect();
        longest.sort_by(|a, b| b.duration.total_cmp(&a.duration));
        for (i, p) in longest.iter().take(TOP_PAUSES).enumerate() {
            let _ = writeln!(
                out,
                "  {:2}. {:5.2}s at {}",
                i + 1,
                p.duration,
                format_clock(p.start)
            );
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "FILLER WORDS REMOVED");
    let _ = writeln!(out, "{}", light);
    let _ = writeln!(out, "Total Fillers:      {}", record.fillers.len());

    // Count per token, first-seen order, then most frequent first.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for f in &record.fillers {
        match counts.iter_mut().find(|(w, _)| *w == f.word) {
            Some((_, n)) => *n += 1,
            None => counts.push((f.word.as_str(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    if !counts.is_empty() {
        let _ = writeln!(out, "Breakdown:");
        for (word, count) in &counts {
            let _ = writeln!(out, "  {:6}: {:3} occurrences", word, count);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "SAMPLE EDITS (First {})", SAMPLE_EDITS);
    let _ = writeln!(out, "{}", light);
    let mut samples: Vec<(f64, String)> = record
        .pauses
        .iter()
        .take(SAMPLE_EDITS)
        .map(|p| (p.start, format!("Pause ({:.2}s) at {}", p.duration, format_clock(p.start))))
        .chain(record.fillers.iter().take(SAMPLE_EDITS).map(|f| {
            (
                f.start,
                format!(
                    "Filler '{}' ({:.2}s) at {}",
                    f.word,
                    f.end - f.start,
                    format_clock(f.start)
                ),
            )
        }))
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (i, (_, line)) in samples.iter().take(SAMPLE_EDITS).enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, line);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", heavy);
    out
}

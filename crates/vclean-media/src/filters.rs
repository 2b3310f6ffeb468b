//! FFmpeg filter and list-file fragments.

use std::path::Path;

/// Longest time the skip caption stays on screen.
pub const SKIP_CAPTION_SECS: f64 = 2.0;

/// Caption text shown at the start of a clip that follows a long pause.
pub fn skip_caption_text(skipped_secs: f64) -> String {
    format!("[Skipping {} secs...]", skipped_secs.max(0.0).trunc() as u64)
}

/// Escape a value for use inside a single-quoted drawtext option.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace(':', "\\:")
        .replace('%', "\\%")
}

/// Build the drawtext filter for the skip caption.
///
/// Yellow text with a black border in the bottom-right corner, enabled only
/// for the first `min(2s, clip_duration)` of the clip.
pub fn filter_skip_indicator(skipped_secs: f64, clip_duration: f64) -> String {
    let visible = SKIP_CAPTION_SECS.min(clip_duration.max(0.0));
    format!(
        "drawtext=text='{}':fontsize=48:fontcolor=yellow:borderw=2:bordercolor=black:\
         x=w-tw-20:y=h-th-20:enable='lt(t,{:.3})'",
        escape_drawtext(&skip_caption_text(skipped_secs)),
        visible
    )
}

/// Build the concat demuxer list for `clips`, in order.
pub fn concat_list(clips: &[impl AsRef<Path>]) -> String {
    clips
        .iter()
        .map(|p| {
            let path = p.as_ref().to_string_lossy().replace('\'', "'\\''");
            format!("file '{}'\n", path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_truncates_seconds() {
        assert_eq!(skip_caption_text(7.9), "[Skipping 7 secs...]");
    }

    #[test]
    fn test_skip_indicator_window() {
        let filter = filter_skip_indicator(12.4, 10.0);
        assert!(filter.starts_with("drawtext=text='[Skipping 12 secs...]'"));
        assert!(filter.contains("enable='lt(t,2.000)'"));

        let short = filter_skip_indicator(6.0, 0.8);
        assert!(short.contains("enable='lt(t,0.800)'"));
    }

    #[test]
    fn test_concat_list_quotes_paths() {
        let list = concat_list(&["/tmp/a/clip_0000.mp4", "/tmp/it's/clip_0001.mp4"]);
        assert_eq!(
            list,
            "file '/tmp/a/clip_0000.mp4'\nfile '/tmp/it'\\''s/clip_0001.mp4'\n"
        );
    }
}

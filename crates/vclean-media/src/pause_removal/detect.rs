//! Pause and filler detection over a word timeline.

use std::collections::HashSet;

use vclean_models::{RemovalInterval, Word};

use super::config::EditConfig;

/// Normalize a token for filler comparison: trim, strip leading and trailing
/// punctuation, lowercase.
pub fn normalize_token(text: &str) -> String {
    text.trim()
        .trim_matches(|c: char| c.is_ascii_punctuation() || is_unicode_punct(c))
        .to_lowercase()
}

fn is_unicode_punct(c: char) -> bool {
    matches!(
        c,
        '…' | '“' | '”' | '‘' | '’' | '「' | '」' | '『' | '』' | '。' | '、' | '！' | '？' | '，' | '～' | '·'
    )
}

/// Scans a word timeline for removal candidates.
#[derive(Debug, Clone)]
pub struct RemovalDetector {
    pause_threshold: f64,
    fillers: HashSet<String>,
}

impl RemovalDetector {
    /// Build a detector; the filler set is normalized once here.
    pub fn new<I, S>(pause_threshold: f64, fillers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            pause_threshold,
            fillers: fillers
                .into_iter()
                .map(|f| normalize_token(f.as_ref()))
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &EditConfig) -> Self {
        if config.remove_fillers {
            Self::new(config.pause_threshold, &config.fillers)
        } else {
            Self::new(config.pause_threshold, std::iter::empty::<&str>())
        }
    }

    /// Pause candidates: every adjacent gap of at least the threshold.
    pub fn detect_pauses(&self, words: &[Word]) -> Vec<RemovalInterval> {
        words
            .windows(2)
            .filter_map(|pair| {
                let gap = pair[1].start - pair[0].end;
                (gap >= self.pause_threshold && gap > 0.0)
                    .then(|| RemovalInterval::pause(pair[0].end, pair[1].start))
            })
            .collect()
    }

    /// Filler candidates: every word whose normalized text is a filler.
    pub fn detect_fillers(&self, words: &[Word]) -> Vec<RemovalInterval> {
        if self.fillers.is_empty() {
            return Vec::new();
        }
        words
            .iter()
            .filter_map(|w| {
                let token = normalize_token(&w.text);
                self.fillers
                    .contains(&token)
                    .then(|| RemovalInterval::filler(w.start, w.end, token))
            })
            .collect()
    }

    /// All candidates, pauses first.
    pub fn detect(&self, words: &[Word]) -> Vec<RemovalInterval> {
        let mut candidates = self.detect_pauses(words);
        candidates.extend(self.detect_fillers(words));
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vclean_models::RemovalKind;

    fn words(items: &[(&str, f64, f64)]) -> Vec<Word> {
        items.iter().map(|(t, s, e)| Word::new(*t, *s, *e)).collect()
    }

    #[test]
    fn test_single_pause() {
        let detector = RemovalDetector::new(1.0, ["어"]);
        let found = detector.detect(&words(&[("a", 0.0, 1.0), ("b", 4.5, 5.0)]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, RemovalKind::Pause);
        assert_eq!((found[0].start, found[0].end), (1.0, 4.5));
        assert!((found[0].magnitude - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_gap_equal_to_threshold_is_pause() {
        let detector = RemovalDetector::new(1.0, Vec::<String>::new());
        let found = detector.detect_pauses(&words(&[("a", 0.0, 1.0), ("b", 2.0, 2.5)]));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_short_gap_ignored() {
        let detector = RemovalDetector::new(1.0, Vec::<String>::new());
        let found = detector.detect_pauses(&words(&[("a", 0.0, 1.0), ("b", 1.9, 2.5)]));
        assert!(found.is_empty());
    }

    #[test]
    fn test_filler_normalization() {
        let detector = RemovalDetector::new(10.0, [" UM ", "어"]);
        let found = detector.detect_fillers(&words(&[
            ("Um,", 0.0, 0.3),
            ("hello", 0.3, 0.8),
            ("어...", 1.0, 1.2),
            ("어제", 1.3, 1.6),
        ]));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].token.as_deref(), Some("um"));
        assert_eq!(found[1].token.as_deref(), Some("어"));
        assert!(found.iter().all(|f| f.magnitude == 0.0));
    }

    #[test]
    fn test_fillers_disabled() {
        let config = EditConfig::default().without_fillers();
        let detector = RemovalDetector::from_config(&config);
        assert!(detector
            .detect(&words(&[("어", 0.0, 0.2), ("b", 0.3, 0.5)]))
            .is_empty());
    }
}

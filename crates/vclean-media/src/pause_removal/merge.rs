//! Coalescing of overlapping removal candidates.

use vclean_models::{MergedInterval, RemovalInterval, RemovalKind};

/// When a filler and a pause overlap, the merged interval is a filler.
///
/// A pause cut gets a tail buffer before it; a merged interval that contains
/// filler audio must not, or the buffer would bring the filler sound back.
pub const FILLER_OVERRIDES_PAUSE: bool = true;

/// Interval under construction during the merge walk.
struct OpenInterval {
    start: f64,
    end: f64,
    has_filler: bool,
    has_pause: bool,
    pause_magnitude: f64,
}

impl OpenInterval {
    fn from_candidate(c: &RemovalInterval) -> Self {
        let mut open = Self {
            start: c.start,
            end: c.end,
            has_filler: false,
            has_pause: false,
            pause_magnitude: 0.0,
        };
        open.absorb(c);
        open
    }

    fn absorb(&mut self, c: &RemovalInterval) {
        self.end = self.end.max(c.end);
        match c.kind {
            RemovalKind::Filler => self.has_filler = true,
            RemovalKind::Pause => {
                self.has_pause = true;
                self.pause_magnitude = self.pause_magnitude.max(c.magnitude);
            }
        }
    }

    fn close(self) -> MergedInterval {
        let kind = resolve_kind(self.has_filler, self.has_pause);
        let magnitude = match kind {
            RemovalKind::Pause => self.pause_magnitude,
            RemovalKind::Filler => 0.0,
        };
        MergedInterval::new(self.start, self.end, kind, magnitude)
    }
}

fn resolve_kind(has_filler: bool, has_pause: bool) -> RemovalKind {
    match (has_filler, has_pause) {
        (true, true) if FILLER_OVERRIDES_PAUSE => RemovalKind::Filler,
        (_, true) => RemovalKind::Pause,
        _ => RemovalKind::Filler,
    }
}

/// Clamp a candidate to `[0, total_duration]`.
///
/// Returns `None` for candidates that start at or after the end, or that are
/// empty after clamping. A clamped pause keeps at most its clamped length
/// as magnitude.
fn clamp(c: &RemovalInterval, total_duration: f64) -> Option<RemovalInterval> {
    if !c.start.is_finite() || !c.end.is_finite() || c.start >= total_duration {
        return None;
    }
    let start = c.start.max(0.0);
    let end = c.end.min(total_duration);
    if end <= start {
        return None;
    }
    let mut clamped = c.clone();
    clamped.start = start;
    clamped.end = end;
    if clamped.kind == RemovalKind::Pause {
        clamped.magnitude = clamped.magnitude.min(end - start);
    }
    Some(clamped)
}

/// Sort and merge removal candidates into disjoint intervals.
///
/// A candidate is merged into the open interval when it starts at or before
/// the open interval's end, so touching intervals coalesce too.
pub fn merge_intervals(candidates: &[RemovalInterval], total_duration: f64) -> Vec<MergedInterval> {
    let mut sorted: Vec<RemovalInterval> = candidates
        .iter()
        .filter_map(|c| clamp(c, total_duration))
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));

    let mut merged = Vec::with_capacity(sorted.len());
    let mut open: Option<OpenInterval> = None;

    for c in &sorted {
        match open.as_mut() {
            Some(o) if c.start <= o.end => o.absorb(c),
            _ => {
                if let Some(done) = open.replace(OpenInterval::from_candidate(c)) {
                    merged.push(done.close());
                }
            }
        }
    }
    if let Some(done) = open {
        merged.push(done.close());
    }

    merged
}

//! Randomized checks of the planner and timestamp map over many interval sets.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vclean_media::pause_removal::{
    merge_intervals, RemapPolicy, SegmentPlanner, TimestampRemapper,
};
use vclean_models::{MergedInterval, RemovalInterval, RemovalKind};

const CASES: usize = 500;
const TOLERANCE: f64 = 1e-3;

/// Disjoint pause intervals over `[0, duration)`, each separated from the
/// next by at least `min_gap` seconds of kept time.
fn random_pauses(rng: &mut StdRng, duration: f64, min_gap: f64) -> Vec<MergedInterval> {
    let mut intervals = Vec::new();
    let mut t = rng.random_range(min_gap..min_gap * 4.0);
    while t < duration - min_gap {
        let len = rng.random_range(0.05..6.0);
        let end = (t + len).min(duration - min_gap);
        if end > t {
            intervals.push(MergedInterval::new(t, end, RemovalKind::Pause, end - t));
        }
        t = end + rng.random_range(min_gap..min_gap * 10.0);
    }
    intervals
}

fn random_candidates(rng: &mut StdRng, duration: f64) -> Vec<RemovalInterval> {
    let count = rng.random_range(0..40);
    (0..count)
        .map(|_| {
            let start = rng.random_range(0.0..duration);
            let end = start + rng.random_range(0.01..4.0);
            if rng.random_bool(0.3) {
                RemovalInterval::filler(start, end, "어")
            } else {
                RemovalInterval::pause(start, end)
            }
        })
        .collect()
}

#[test]
fn merged_intervals_are_disjoint_and_sorted() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..CASES {
        let duration = rng.random_range(5.0..600.0);
        let merged = merge_intervals(&random_candidates(&mut rng, duration), duration);
        for w in merged.windows(2) {
            assert!(w[0].end < w[1].start, "overlap: {:?}", w);
        }
        for m in &merged {
            assert!(m.start >= 0.0 && m.end <= duration && m.start < m.end);
            assert!(m.magnitude <= m.span() + 1e-9);
            if m.kind == RemovalKind::Filler {
                assert_eq!(m.magnitude, 0.0);
            }
        }
    }
}

#[test]
fn segments_tile_timeline_minus_removals_and_padding() {
    let mut rng = StdRng::seed_from_u64(42);
    let padding = 0.1;
    // Keep-gaps wider than padding + min segment, so nothing is dropped.
    let min_gap = 0.5;

    for _ in 0..CASES {
        let duration = rng.random_range(10.0..900.0);
        let merged = random_pauses(&mut rng, duration, min_gap);
        let plan = SegmentPlanner::new(padding, 0.0, 0.1)
            .plan(&merged, duration)
            .unwrap();

        assert!(plan.dropped.is_empty());
        for w in plan.segments.windows(2) {
            assert!(w[0].end <= w[1].start, "segments overlap: {:?}", w);
            assert!(w[0].start < w[1].start);
        }

        let kept: f64 = plan.segments.iter().map(|s| s.duration()).sum();
        let removed: f64 = merged.iter().map(|m| m.magnitude).sum();
        let total_padding = padding * merged.len() as f64;
        assert!(
            (kept - (duration - removed - total_padding)).abs() < TOLERANCE,
            "kept {} vs expected {}",
            kept,
            duration - removed - total_padding
        );
        assert!((plan.stats.kept_duration - kept).abs() < 1e-9);
    }
}

#[test]
fn segments_never_overlap_with_tail_buffer_and_fillers() {
    let mut rng = StdRng::seed_from_u64(1234);
    for _ in 0..CASES {
        let duration = rng.random_range(5.0..300.0);
        let merged = merge_intervals(&random_candidates(&mut rng, duration), duration);
        let Ok(plan) = SegmentPlanner::new(0.1, 0.15, 0.1).plan(&merged, duration) else {
            continue;
        };
        for w in plan.segments.windows(2) {
            assert!(w[0].end <= w[1].start + 1e-9, "segments overlap: {:?}", w);
        }
        for s in &plan.segments {
            assert!(s.duration() >= 0.1);
            assert!(s.start >= 0.0 && s.end <= duration);
        }
    }
}

#[test]
fn remap_is_monotonic_and_anchored() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..CASES {
        let duration = rng.random_range(10.0..900.0);
        let merged = merge_intervals(&random_candidates(&mut rng, duration), duration);
        for policy in [RemapPolicy::Magnitude, RemapPolicy::RemovedSpan] {
            let remapper = TimestampRemapper::with_policy(merged.iter().copied(), policy);
            assert_eq!(remapper.map(0.0), 0.0);

            let first_start = merged.first().map(|m| m.start).unwrap_or(duration);
            let mut prev = 0.0;
            let steps = 400;
            for i in 0..=steps {
                let t = duration * i as f64 / steps as f64;
                let mapped = remapper.map(t);
                assert!(mapped + 1e-9 >= prev, "not monotonic at {}: {} < {}", t, mapped, prev);
                if t <= first_start {
                    assert!((mapped - t).abs() < 1e-9);
                }
                prev = mapped;
            }
        }
    }
}

#[test]
fn remap_with_no_removals_is_identity() {
    let mut rng = StdRng::seed_from_u64(5);
    let remapper = TimestampRemapper::new(Vec::new());
    for _ in 0..CASES {
        let t = rng.random_range(0.0..10_000.0);
        assert_eq!(remapper.map(t), t);
    }
}

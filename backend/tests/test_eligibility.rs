//! Eligibility classifier tests
//!
//! The comparison is strict: the boundary itself is on time, one millisecond
//! before it is early.

use proptest::prelude::*;
use registration_drill_core::core::time::{parse_civil, BoundaryConfig, ManualWallClock, SyntheticClock};
use registration_drill_core::eligibility::{capture, classify, Eligibility};
use std::sync::Arc;

const BOUNDARY: &str = "2026-02-05T10:00:00";

#[test]
fn test_boundary_edges() {
    let b = parse_civil(BOUNDARY).unwrap();
    assert_eq!(classify(b - 1, b), Eligibility::Early);
    assert_eq!(classify(b, b), Eligibility::OnTime);
    assert_eq!(classify(b + 1, b), Eligibility::OnTime);
}

#[test]
fn test_capture_of_anchored_clock() {
    let boundary = BoundaryConfig::new(parse_civil(BOUNDARY).unwrap(), 10).unwrap();
    let wall = ManualWallClock::new(500);
    let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary);
    clock.start().unwrap();

    wall.advance(9_999);
    let early = capture(&clock);
    assert!(early.anchored);
    assert_eq!(early.real_click_ms, 10_499);
    assert_eq!(early.classify(&boundary), Eligibility::Early);

    wall.advance(1);
    assert_eq!(capture(&clock).classify(&boundary), Eligibility::OnTime);
}

#[test]
fn test_capture_without_anchor_is_early() {
    let boundary = BoundaryConfig::new(parse_civil(BOUNDARY).unwrap(), 3).unwrap();
    let clock = SyntheticClock::new(Arc::new(ManualWallClock::new(0)), boundary);
    let captured = capture(&clock);
    assert!(!captured.anchored);
    assert_eq!(captured.sim_click_ms, boundary.boundary_ms - 3_000);
    assert!(captured.classify(&boundary).is_early());
}

#[test]
fn test_verdict_not_reevaluated_after_delay() {
    let boundary = BoundaryConfig::new(parse_civil(BOUNDARY).unwrap(), 10).unwrap();
    let wall = ManualWallClock::new(0);
    let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary);
    clock.start().unwrap();
    wall.advance(9_000);

    let captured = capture(&clock);
    // A 5 s delay carries the clock past the boundary.
    wall.advance(5_000);
    assert!(clock.now() > boundary.boundary_ms);
    assert_eq!(captured.classify(&boundary), Eligibility::Early);
}

proptest! {
    #[test]
    fn prop_early_iff_strictly_before(sim in i64::MIN / 2..i64::MAX / 2, boundary in i64::MIN / 2..i64::MAX / 2) {
        prop_assert_eq!(classify(sim, boundary).is_early(), sim < boundary);
    }
}

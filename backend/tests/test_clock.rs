//! Synthetic clock tests
//!
//! Critical invariants tested:
//! - now() at T0+Δ equals boundary - L*1000 + Δ for every supported lead
//! - the mapping does not depend on how often it is read
//! - an un-anchored clock falls back to boundary - lead, never failing

use proptest::prelude::*;
use registration_drill_core::core::time::{
    parse_civil, synthetic_at, BoundaryConfig, ClockAnchor, ClockError, ClockReading,
    ManualWallClock, SyntheticClock, LEAD_OPTIONS,
};
use registration_drill_core::core::DisplayTicker;
use std::sync::Arc;
use std::time::Duration;

fn boundary(lead: u32) -> BoundaryConfig {
    BoundaryConfig::new(parse_civil("2026-02-05T10:00:00").unwrap(), lead).unwrap()
}

#[test]
fn test_anchor_maps_to_lead_before_boundary() {
    let wall = ManualWallClock::new(1_000_000);
    let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary(10));
    let anchor = clock.start().unwrap();

    assert_eq!(anchor.real_anchor_ms, 1_000_000);
    assert_eq!(anchor.sim_anchor_ms, parse_civil("2026-02-05T09:59:50").unwrap());
    assert_eq!(clock.now(), anchor.sim_anchor_ms);

    wall.advance(9_000);
    assert_eq!(clock.now(), parse_civil("2026-02-05T09:59:59").unwrap());
}

#[test]
fn test_reading_frequency_does_not_matter() {
    let wall = ManualWallClock::new(0);
    let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary(5));
    clock.start().unwrap();

    // Read every millisecond on one path, never on the other.
    for _ in 0..2_500 {
        wall.advance(1);
        let _ = clock.now();
    }
    let frequent = clock.now();

    let other_wall = ManualWallClock::new(0);
    let mut other = SyntheticClock::new(Arc::new(other_wall.clone()), boundary(5));
    other.start().unwrap();
    other_wall.advance(2_500);

    assert_eq!(frequent, other.now());
}

#[test]
fn test_unanchored_clock_uses_fallback() {
    let clock = SyntheticClock::new(Arc::new(ManualWallClock::new(42)), boundary(30));
    assert!(!clock.is_anchored());
    assert_eq!(clock.now(), boundary(30).boundary_ms - 30_000);
    assert_eq!(synthetic_at(None, &boundary(30), 99_999), boundary(30).boundary_ms - 30_000);
}

#[test]
fn test_restart_after_stop() {
    let wall = ManualWallClock::new(0);
    let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary(3));
    clock.start().unwrap();
    assert_eq!(clock.start().unwrap_err(), ClockError::AlreadyAnchored);

    wall.advance(60_000);
    clock.stop();
    let anchor = clock.start().unwrap();
    assert_eq!(anchor.real_anchor_ms, 60_000);
    assert_eq!(clock.now(), boundary(3).boundary_ms - 3_000);
}

#[test]
fn test_ticker_reflects_clock() {
    let wall = ManualWallClock::new(0);
    let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary(10));
    clock.start().unwrap();
    wall.advance(9_870);

    let mut ticker = DisplayTicker::spawn(clock.reader(), Duration::from_millis(5));
    let reading = ticker.readings().recv_timeout(Duration::from_secs(2)).unwrap();
    assert_eq!(reading.to_string(), "09:59:59.87");
    ticker.stop();
}

#[test]
fn test_reading_at_boundary() {
    let reading = ClockReading::from_millis(parse_civil("2026-02-05T10:00:00").unwrap());
    assert_eq!(reading.to_string(), "10:00:00.00");
}

proptest! {
    #[test]
    fn prop_now_is_boundary_minus_lead_plus_elapsed(
        lead_idx in 0usize..LEAD_OPTIONS.len(),
        t0 in 0i64..10_000_000_000,
        delta in 0i64..3_600_000,
    ) {
        let lead = LEAD_OPTIONS[lead_idx];
        let wall = ManualWallClock::new(t0);
        let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary(lead));
        clock.start().unwrap();
        wall.advance(delta);
        prop_assert_eq!(clock.now(), boundary(lead).boundary_ms - lead as i64 * 1000 + delta);
    }

    #[test]
    fn prop_anchor_map_is_linear(real_anchor in -1_000_000i64..1_000_000, a in 0i64..1_000_000, b in 0i64..1_000_000) {
        let anchor = ClockAnchor::for_boundary(real_anchor, &boundary(60));
        prop_assert_eq!(
            anchor.map(real_anchor + a) - anchor.map(real_anchor + b),
            a - b
        );
    }
}

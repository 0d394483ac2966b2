//! Synthetic clock for the drill
//!
//! The drill never shows the host's real time. It shows a fabricated
//! "server time" that starts `lead_seconds` before the boundary instant at the
//! moment the login phase begins and then advances in lockstep with wall time.
//!
//! All timestamps are milliseconds on the *civil timeline*: the local calendar
//! date-time read as if it were UTC. A boundary written as
//! `2026-02-05T10:00:00` therefore maps to one number on every host, and the
//! display fields are read straight off it.
//!
//! # Example
//! ```
//! use registration_drill_core::core::time::{
//!     parse_civil, BoundaryConfig, ManualWallClock, SyntheticClock,
//! };
//! use std::sync::Arc;
//!
//! let boundary = BoundaryConfig::new(parse_civil("2026-02-05T10:00:00").unwrap(), 10).unwrap();
//! let wall = ManualWallClock::new(1_000);
//! let mut clock = SyntheticClock::new(Arc::new(wall.clone()), boundary);
//!
//! clock.start().unwrap();
//! wall.advance(2_500);
//! assert_eq!(clock.now(), boundary.boundary_ms - 10_000 + 2_500);
//! ```

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Milliseconds on the civil timeline.
pub type Millis = i64;

/// Accepted boundary input format (seconds precision).
pub const BOUNDARY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Format used when stamping applied courses.
pub const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lead times offered by the setup screen, in seconds.
pub const LEAD_OPTIONS: [u32; 5] = [3, 5, 10, 30, 60];

pub const DEFAULT_LEAD_SECONDS: u32 = 10;

pub const DEFAULT_BOUNDARY: &str = "2026-02-05T10:00:00";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClockError {
    #[error("clock anchor already established for this phase")]
    AlreadyAnchored,

    #[error("invalid instant '{input}': {reason}")]
    InvalidInstant { input: String, reason: String },

    #[error("lead time {lead}s is not one of {options:?}")]
    UnsupportedLead { lead: u32, options: Vec<u32> },
}

/// Parse a `YYYY-MM-DDTHH:MM:SS` string onto the civil timeline.
pub fn parse_civil(text: &str) -> Result<Millis, ClockError> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), BOUNDARY_FORMAT).map_err(|e| {
        ClockError::InvalidInstant {
            input: text.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(naive.and_utc().timestamp_millis())
}

/// Calendar view of a civil timestamp, `None` when out of chrono's range.
pub fn civil_datetime(ms: Millis) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}

/// Render a civil timestamp as `YYYY-MM-DD HH:MM:SS`.
pub fn format_civil(ms: Millis) -> String {
    match civil_datetime(ms) {
        Some(dt) => dt.format(STAMP_FORMAT).to_string(),
        None => ms.to_string(),
    }
}

// ============================================================================
// Wall clocks
// ============================================================================

/// Source of real ("wall") time.
pub trait WallClock: Send + Sync {
    fn now_ms(&self) -> Millis;
}

/// Host local time projected onto the civil timeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now_ms(&self) -> Millis {
        Local::now().naive_local().and_utc().timestamp_millis()
    }
}

/// Settable wall clock shared between clones.
///
/// Used by tests and scripted drills to place a click at an exact instant.
#[derive(Debug, Clone, Default)]
pub struct ManualWallClock {
    now: Arc<AtomicI64>,
}

impl ManualWallClock {
    pub fn new(start_ms: Millis) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: Millis) {
        self.now.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: Millis) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl WallClock for ManualWallClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Boundary and anchor
// ============================================================================

/// The instant separating early from on-time actions, plus the lead time.
///
/// Immutable once the login phase starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryConfig {
    pub boundary_ms: Millis,
    pub lead_seconds: u32,
}

impl BoundaryConfig {
    /// Build a boundary, rejecting lead times outside [`LEAD_OPTIONS`].
    pub fn new(boundary_ms: Millis, lead_seconds: u32) -> Result<Self, ClockError> {
        if !LEAD_OPTIONS.contains(&lead_seconds) {
            return Err(ClockError::UnsupportedLead {
                lead: lead_seconds,
                options: LEAD_OPTIONS.to_vec(),
            });
        }
        Ok(Self {
            boundary_ms,
            lead_seconds,
        })
    }

    /// Synthetic time at which the display starts.
    pub fn sim_start_ms(&self) -> Millis {
        self.boundary_ms - i64::from(self.lead_seconds) * 1000
    }
}

/// Pairing of a real instant with the synthetic instant it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockAnchor {
    pub real_anchor_ms: Millis,
    pub sim_anchor_ms: Millis,
}

impl ClockAnchor {
    pub fn for_boundary(real_now_ms: Millis, boundary: &BoundaryConfig) -> Self {
        Self {
            real_anchor_ms: real_now_ms,
            sim_anchor_ms: boundary.sim_start_ms(),
        }
    }

    /// Map a real instant onto synthetic time.
    pub fn map(&self, real_ms: Millis) -> Millis {
        self.sim_anchor_ms + (real_ms - self.real_anchor_ms)
    }
}

/// Synthetic time for `real_ms`.
///
/// Without an anchor this is the boundary minus the lead, the reading an
/// anchor taken at this very instant would give. It is not derived from the
/// wall clock (`wall - lead`): an unanchored click on a host whose clock is
/// already past the boundary would otherwise classify as on time.
pub fn synthetic_at(anchor: Option<&ClockAnchor>, boundary: &BoundaryConfig, real_ms: Millis) -> Millis {
    match anchor {
        Some(anchor) => anchor.map(real_ms),
        None => boundary.sim_start_ms(),
    }
}

// ============================================================================
// Synthetic clock
// ============================================================================

/// Offset-anchored fake clock.
///
/// The anchor is set once per phase by [`SyntheticClock::start`] and cleared
/// by [`SyntheticClock::stop`].
#[derive(Clone)]
pub struct SyntheticClock {
    wall: Arc<dyn WallClock>,
    boundary: BoundaryConfig,
    anchor: Option<ClockAnchor>,
}

impl fmt::Debug for SyntheticClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticClock")
            .field("boundary", &self.boundary)
            .field("anchor", &self.anchor)
            .finish()
    }
}

impl SyntheticClock {
    pub fn new(wall: Arc<dyn WallClock>, boundary: BoundaryConfig) -> Self {
        Self {
            wall,
            boundary,
            anchor: None,
        }
    }

    /// Establish the anchor at the current wall instant.
    pub fn start(&mut self) -> Result<ClockAnchor, ClockError> {
        if self.anchor.is_some() {
            return Err(ClockError::AlreadyAnchored);
        }
        let anchor = ClockAnchor::for_boundary(self.wall.now_ms(), &self.boundary);
        self.anchor = Some(anchor);
        tracing::debug!(
            real_anchor_ms = anchor.real_anchor_ms,
            sim_anchor_ms = anchor.sim_anchor_ms,
            "clock anchored"
        );
        Ok(anchor)
    }

    /// Clear the anchor at the end of a phase.
    pub fn stop(&mut self) {
        self.anchor = None;
    }

    pub fn anchor(&self) -> Option<ClockAnchor> {
        self.anchor
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn boundary(&self) -> &BoundaryConfig {
        &self.boundary
    }

    /// Fresh synthetic time.
    pub fn now(&self) -> Millis {
        self.sample().1
    }

    /// `(real, synthetic)` taken from a single wall sample.
    pub fn sample(&self) -> (Millis, Millis) {
        let real = self.wall.now_ms();
        (real, synthetic_at(self.anchor.as_ref(), &self.boundary, real))
    }

    /// Detached read-only view for the display thread.
    pub fn reader(&self) -> ClockReader {
        ClockReader {
            wall: Arc::clone(&self.wall),
            boundary: self.boundary,
            anchor: self.anchor,
        }
    }
}

/// Read-only copy of a clock's mapping, safe to move to another thread.
#[derive(Clone)]
pub struct ClockReader {
    wall: Arc<dyn WallClock>,
    boundary: BoundaryConfig,
    anchor: Option<ClockAnchor>,
}

impl ClockReader {
    pub fn now(&self) -> Millis {
        synthetic_at(self.anchor.as_ref(), &self.boundary, self.wall.now_ms())
    }
}

// ============================================================================
// Display
// ============================================================================

/// Hours/minutes/seconds/hundredths shown on the "server time" panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockReading {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub hundredths: u32,
}

impl ClockReading {
    pub fn from_millis(ms: Millis) -> Self {
        let ms_of_day = ms.rem_euclid(86_400_000);
        match civil_datetime(ms) {
            Some(dt) => Self {
                hours: dt.hour(),
                minutes: dt.minute(),
                seconds: dt.second(),
                hundredths: (dt.nanosecond() / 10_000_000).min(99),
            },
            None => Self {
                hours: (ms_of_day / 3_600_000) as u32,
                minutes: (ms_of_day / 60_000 % 60) as u32,
                seconds: (ms_of_day / 1000 % 60) as u32,
                hundredths: (ms_of_day % 1000 / 10) as u32,
            },
        }
    }
}

impl fmt::Display for ClockReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:02}",
            self.hours, self.minutes, self.seconds, self.hundredths
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary() -> BoundaryConfig {
        BoundaryConfig::new(parse_civil(DEFAULT_BOUNDARY).unwrap(), 10).unwrap()
    }

    #[test]
    fn test_parse_civil_is_zone_free() {
        let ms = parse_civil("1970-01-01T00:00:01").unwrap();
        assert_eq!(ms, 1000);
    }

    #[test]
    fn test_parse_civil_rejects_garbage() {
        assert!(matches!(
            parse_civil("tomorrow at ten"),
            Err(ClockError::InvalidInstant { .. })
        ));
    }

    #[test]
    fn test_unsupported_lead_rejected() {
        let err = BoundaryConfig::new(0, 7).unwrap_err();
        assert_eq!(
            err,
            ClockError::UnsupportedLead {
                lead: 7,
                options: LEAD_OPTIONS.to_vec()
            }
        );
    }

    #[test]
    fn test_start_twice_rejected() {
        let mut clock = SyntheticClock::new(Arc::new(ManualWallClock::new(0)), boundary());
        clock.start().unwrap();
        assert_eq!(clock.start(), Err(ClockError::AlreadyAnchored));

        clock.stop();
        assert!(clock.start().is_ok());
    }

    #[test]
    fn test_fallback_before_anchor() {
        let wall = ManualWallClock::new(123_456);
        let clock = SyntheticClock::new(Arc::new(wall.clone()), boundary());
        assert_eq!(clock.now(), boundary().boundary_ms - 10_000);

        wall.advance(50_000);
        assert_eq!(clock.now(), boundary().boundary_ms - 10_000);
    }

    #[test]
    fn test_reading_fields() {
        let ms = parse_civil("2026-02-05T09:59:59").unwrap() + 870;
        let reading = ClockReading::from_millis(ms);
        assert_eq!(
            reading,
            ClockReading {
                hours: 9,
                minutes: 59,
                seconds: 59,
                hundredths: 87
            }
        );
        assert_eq!(reading.to_string(), "09:59:59.87");
    }

    #[test]
    fn test_format_civil() {
        let ms = parse_civil("2026-02-05T10:00:01").unwrap();
        assert_eq!(format_civil(ms), "2026-02-05 10:00:01");
    }
}

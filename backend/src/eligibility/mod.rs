//! Eligibility classification
//!
//! Decides whether a gated action happened before the boundary instant.
//! The verdict is computed once, from a capture taken at the exact instant of
//! the action, and never re-evaluated: a processing delay that runs past the
//! boundary does not change it.

use crate::core::time::{BoundaryConfig, Millis, SyntheticClock};
use serde::{Deserialize, Serialize};

/// Outcome of classifying a gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eligibility {
    /// Strictly before the boundary (early-bird).
    Early,
    /// At or after the boundary.
    OnTime,
}

impl Eligibility {
    pub fn is_early(self) -> bool {
        matches!(self, Eligibility::Early)
    }
}

/// Strict comparison: one millisecond before is early, the boundary itself is not.
pub fn classify(sim_click_ms: Millis, boundary_ms: Millis) -> Eligibility {
    if sim_click_ms < boundary_ms {
        Eligibility::Early
    } else {
        Eligibility::OnTime
    }
}

/// Real and synthetic time at the instant of a gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCapture {
    pub real_click_ms: Millis,
    pub sim_click_ms: Millis,
    /// False when the clock had no anchor and the fallback value was used.
    pub anchored: bool,
}

impl ActionCapture {
    pub fn classify(&self, boundary: &BoundaryConfig) -> Eligibility {
        classify(self.sim_click_ms, boundary.boundary_ms)
    }
}

/// Capture the clock now. Never fails, anchored or not.
pub fn capture(clock: &SyntheticClock) -> ActionCapture {
    let (real_click_ms, sim_click_ms) = clock.sample();
    ActionCapture {
        real_click_ms,
        sim_click_ms,
        anchored: clock.is_anchored(),
    }
}

//! Latency simulation
//!
//! Every gated action waits behind an artificial processing delay. The delay
//! policy depends on what kind of action it is:
//!
//! | kind                 | default policy          |
//! |----------------------|-------------------------|
//! | early login          | fixed 5 000 ms          |
//! | on-time login        | uniform [5 000, 40 000] |
//! | navigation           | uniform [300, 1 200]    |
//! | registration submit  | uniform [1 500, 8 000]  |
//! | cancellation         | uniform [300, 1 200]    |
//!
//! Uniform bounds are inclusive at both ends.
//!
//! # Example
//! ```
//! use registration_drill_core::latency::{LatencyConfig, LatencyKind, LatencySimulator};
//!
//! let mut sim = LatencySimulator::new(LatencyConfig::default(), 7).unwrap();
//! assert_eq!(sim.simulate(LatencyKind::EarlyLogin), 5_000);
//! let d = sim.simulate(LatencyKind::Login);
//! assert!((5_000..=40_000).contains(&d));
//! ```

pub mod gate;

pub use gate::{GateError, GateState, InstantSleeper, ProcessingGate, Sleeper, ThreadSleeper};

use crate::eligibility::Eligibility;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which gated action a delay is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LatencyKind {
    EarlyLogin,
    Login,
    Navigation,
    RegistrationSubmit,
    Cancellation,
}

impl LatencyKind {
    /// Login kind selected by the verdict.
    pub fn for_login(eligibility: Eligibility) -> Self {
        if eligibility.is_early() {
            LatencyKind::EarlyLogin
        } else {
            LatencyKind::Login
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LatencyKind::EarlyLogin => "early login",
            LatencyKind::Login => "login",
            LatencyKind::Navigation => "navigation",
            LatencyKind::RegistrationSubmit => "registration submit",
            LatencyKind::Cancellation => "cancellation",
        }
    }
}

impl fmt::Display for LatencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Largest delay a policy may produce; the sampler works in `i64` and needs
/// `max + 1` to fit.
pub const MAX_DELAY_MS: u64 = i64::MAX as u64 - 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LatencyError {
    #[error("{kind} latency bounds inverted: min {min} ms > max {max} ms")]
    InvertedBounds { kind: LatencyKind, min: u64, max: u64 },

    #[error("{kind} latency bound {max} ms exceeds the {limit} ms limit")]
    OutOfRange { kind: LatencyKind, max: u64, limit: u64 },
}

/// How long one kind of action takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LatencyPolicy {
    Fixed { ms: u64 },
    /// Inclusive range.
    Uniform { min: u64, max: u64 },
}

impl LatencyPolicy {
    /// Inclusive `(min, max)` this policy can produce.
    pub fn bounds(&self) -> (u64, u64) {
        match *self {
            LatencyPolicy::Fixed { ms } => (ms, ms),
            LatencyPolicy::Uniform { min, max } => (min, max),
        }
    }

    fn validate(&self, kind: LatencyKind) -> Result<(), LatencyError> {
        let (min, max) = self.bounds();
        if min > max {
            return Err(LatencyError::InvertedBounds { kind, min, max });
        }
        if max > MAX_DELAY_MS {
            return Err(LatencyError::OutOfRange {
                kind,
                max,
                limit: MAX_DELAY_MS,
            });
        }
        Ok(())
    }

    fn sample(&self, rng: &mut RngManager) -> u64 {
        match *self {
            LatencyPolicy::Fixed { ms } => ms,
            LatencyPolicy::Uniform { min, max } => {
                rng.range_inclusive(min as i64, max as i64) as u64
            }
        }
    }
}

/// Delay policy per action kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub early_login: LatencyPolicy,
    pub login: LatencyPolicy,
    pub navigation: LatencyPolicy,
    pub registration_submit: LatencyPolicy,
    pub cancellation: LatencyPolicy,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            early_login: LatencyPolicy::Fixed { ms: 5_000 },
            login: LatencyPolicy::Uniform {
                min: 5_000,
                max: 40_000,
            },
            navigation: LatencyPolicy::Uniform { min: 300, max: 1_200 },
            registration_submit: LatencyPolicy::Uniform {
                min: 1_500,
                max: 8_000,
            },
            cancellation: LatencyPolicy::Uniform { min: 300, max: 1_200 },
        }
    }
}

impl LatencyConfig {
    pub fn policy_for(&self, kind: LatencyKind) -> LatencyPolicy {
        match kind {
            LatencyKind::EarlyLogin => self.early_login,
            LatencyKind::Login => self.login,
            LatencyKind::Navigation => self.navigation,
            LatencyKind::RegistrationSubmit => self.registration_submit,
            LatencyKind::Cancellation => self.cancellation,
        }
    }

    pub fn validate(&self) -> Result<(), LatencyError> {
        for kind in [
            LatencyKind::EarlyLogin,
            LatencyKind::Login,
            LatencyKind::Navigation,
            LatencyKind::RegistrationSubmit,
            LatencyKind::Cancellation,
        ] {
            self.policy_for(kind).validate(kind)?;
        }
        Ok(())
    }

    /// Longest delay any login can take.
    pub fn max_login_ms(&self) -> u64 {
        self.early_login.bounds().1.max(self.login.bounds().1)
    }

    /// Longest delay a registration submit can take.
    pub fn max_submit_ms(&self) -> u64 {
        self.registration_submit.bounds().1
    }
}

/// Samples processing delays from a seeded RNG.
#[derive(Debug, Clone)]
pub struct LatencySimulator {
    config: LatencyConfig,
    rng: RngManager,
}

impl LatencySimulator {
    pub fn new(config: LatencyConfig, seed: u64) -> Result<Self, LatencyError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: RngManager::new(seed),
        })
    }

    pub fn config(&self) -> &LatencyConfig {
        &self.config
    }

    /// Delay in milliseconds for one action of `kind`.
    pub fn simulate(&mut self, kind: LatencyKind) -> u64 {
        let delay = self.config.policy_for(kind).sample(&mut self.rng);
        tracing::debug!(kind = kind.label(), delay_ms = delay, "latency sampled");
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_login_follows_verdict() {
        assert_eq!(LatencyKind::for_login(Eligibility::Early), LatencyKind::EarlyLogin);
        assert_eq!(LatencyKind::for_login(Eligibility::OnTime), LatencyKind::Login);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let config = LatencyConfig {
            navigation: LatencyPolicy::Uniform { min: 10, max: 5 },
            ..LatencyConfig::default()
        };
        assert_eq!(
            LatencySimulator::new(config, 1).unwrap_err(),
            LatencyError::InvertedBounds {
                kind: LatencyKind::Navigation,
                min: 10,
                max: 5
            }
        );
    }

    #[test]
    fn test_bounds_beyond_sampler_range_rejected() {
        let config = LatencyConfig {
            navigation: LatencyPolicy::Uniform {
                min: 0,
                max: u64::MAX,
            },
            ..LatencyConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(LatencyError::OutOfRange {
                kind: LatencyKind::Navigation,
                max: u64::MAX,
                limit: MAX_DELAY_MS,
            })
        );

        let fixed = LatencyConfig {
            early_login: LatencyPolicy::Fixed { ms: i64::MAX as u64 },
            ..LatencyConfig::default()
        };
        assert!(matches!(
            LatencySimulator::new(fixed, 1),
            Err(LatencyError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_largest_allowed_bound_samples() {
        let config = LatencyConfig {
            navigation: LatencyPolicy::Uniform {
                min: MAX_DELAY_MS - 1,
                max: MAX_DELAY_MS,
            },
            ..LatencyConfig::default()
        };
        let mut sim = LatencySimulator::new(config, 5).unwrap();
        for _ in 0..32 {
            let d = sim.simulate(LatencyKind::Navigation);
            assert!((MAX_DELAY_MS - 1..=MAX_DELAY_MS).contains(&d));
        }
    }

    #[test]
    fn test_policy_serde_shape() {
        let json = serde_json::to_string(&LatencyPolicy::Uniform { min: 1, max: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"Uniform","min":1,"max":2}"#);
    }

    #[test]
    fn test_max_login_and_submit() {
        assert_eq!(LatencyConfig::default().max_login_ms(), 40_000);
        assert_eq!(LatencyConfig::default().max_submit_ms(), 8_000);
    }
}

//! Drill configuration
//!
//! Loaded from JSON (every field optional, defaults below) and validated once
//! before a portal is built.
//!
//! ```json
//! {
//!   "boundary": "2026-02-05T10:00:00",
//!   "lead_seconds": 10,
//!   "tick_interval_ms": 30,
//!   "seed": 42,
//!   "latency": {
//!     "early_login": { "type": "Fixed", "ms": 5000 },
//!     "login": { "type": "Uniform", "min": 5000, "max": 40000 }
//!   }
//! }
//! ```

use crate::core::time::{parse_civil, BoundaryConfig, ClockError, DEFAULT_BOUNDARY, DEFAULT_LEAD_SECONDS};
use crate::latency::{LatencyConfig, LatencyError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Latency(#[from] LatencyError),

    #[error("tick interval must be positive")]
    ZeroTickInterval,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    /// Default boundary offered by the setup form (`YYYY-MM-DDTHH:MM:SS`).
    pub boundary: String,

    /// Default lead time offered by the setup form.
    pub lead_seconds: u32,

    pub latency: LatencyConfig,

    /// Display ticker cadence.
    pub tick_interval_ms: u64,

    /// RNG seed for latencies and cart shuffles; `None` derives one from the wall clock.
    pub seed: Option<u64>,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            boundary: DEFAULT_BOUNDARY.to_string(),
            lead_seconds: DEFAULT_LEAD_SECONDS,
            latency: LatencyConfig::default(),
            tick_interval_ms: 30,
            seed: None,
        }
    }
}

impl DrillConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check every field; returns the default boundary on success.
    pub fn validate(&self) -> Result<BoundaryConfig, ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        self.latency.validate()?;
        Ok(BoundaryConfig::new(parse_civil(&self.boundary)?, self.lead_seconds)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Configured seed, or one derived from `wall_ms`.
    pub fn seed_or(&self, wall_ms: i64) -> u64 {
        self.seed.unwrap_or(wall_ms as u64)
    }
}

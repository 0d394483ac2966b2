//! Processing gate
//!
//! Explicit Idle → Processing → Idle state machine guarding a gated action.
//! While Processing, any new action is refused with [`GateError::Busy`]; the
//! renderer reads [`ProcessingGate::is_processing`] to hide retrigger
//! affordances. There is no cancel: an outstanding delay always runs out.

use super::LatencyKind;
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Processing { kind: LatencyKind, delay_ms: u64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("{active} still processing, {requested} refused")]
    Busy {
        active: LatencyKind,
        requested: LatencyKind,
    },

    #[error("no action is processing")]
    NotProcessing,
}

/// Waits out a processing delay.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration);
}

/// Blocks the calling thread for the full delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration) {
        thread::sleep(delay);
    }
}

/// Returns immediately. For tests and scripted drills.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _delay: Duration) {}
}

#[derive(Debug, Clone)]
pub struct ProcessingGate {
    state: GateState,
}

impl Default for ProcessingGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, GateState::Processing { .. })
    }

    /// Idle → Processing.
    pub fn begin(&mut self, kind: LatencyKind, delay_ms: u64) -> Result<(), GateError> {
        if let GateState::Processing { kind: active, .. } = self.state {
            tracing::warn!(active = active.label(), requested = kind.label(), "gate busy");
            return Err(GateError::Busy {
                active,
                requested: kind,
            });
        }
        self.state = GateState::Processing { kind, delay_ms };
        tracing::debug!(kind = kind.label(), delay_ms, "processing started");
        Ok(())
    }

    /// Processing → Idle, returning the kind that finished.
    pub fn finish(&mut self) -> Result<LatencyKind, GateError> {
        match self.state {
            GateState::Processing { kind, .. } => {
                self.state = GateState::Idle;
                tracing::debug!(kind = kind.label(), "processing finished");
                Ok(kind)
            }
            GateState::Idle => Err(GateError::NotProcessing),
        }
    }

    /// Begin, wait out the delay, apply `effect`, finish.
    ///
    /// The effect runs after the delay and before the gate reopens, so callers
    /// never observe an open gate with the effect unapplied.
    pub fn run<T>(
        &mut self,
        kind: LatencyKind,
        delay_ms: u64,
        sleeper: &dyn Sleeper,
        effect: impl FnOnce() -> T,
    ) -> Result<T, GateError> {
        self.begin(kind, delay_ms)?;
        sleeper.sleep(Duration::from_millis(delay_ms));
        let out = effect();
        self.finish()?;
        Ok(out)
    }
}

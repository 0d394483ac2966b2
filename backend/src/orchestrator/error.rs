use crate::cart::{FilterError, RegistrationError};
use crate::config::ConfigError;
use crate::core::time::ClockError;
use crate::latency::{GateError, LatencyError};
use crate::orchestrator::handoff::SessionError;
use crate::orchestrator::portal::Phase;
use crate::orchestrator::setup::SetupError;
use thiserror::Error;

/// Any failure of a portal or browser operation.
///
/// Each one is terminal to the attempted operation only; the drill itself
/// stays usable.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("operation needs phase {expected:?}, drill is in {actual:?}")]
    WrongPhase { expected: Phase, actual: Phase },

    #[error("setup invalid: {0}")]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Latency(#[from] LatencyError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("registration refused: {0}")]
    Registration(#[from] RegistrationError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("config invalid: {0}")]
    Config(#[from] ConfigError),
}

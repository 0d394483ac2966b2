//! Time keeping: the synthetic clock and its display ticker

pub mod ticker;
pub mod time;

pub use ticker::DisplayTicker;
pub use time::{
    BoundaryConfig, ClockAnchor, ClockError, ClockReader, ClockReading, ManualWallClock, Millis,
    SyntheticClock, SystemWallClock, WallClock,
};

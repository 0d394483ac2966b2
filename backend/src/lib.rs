//! Registration Drill Core
//!
//! Timing-and-eligibility engine for a course-registration practice portal.
//!
//! # Architecture
//!
//! - **core**: Synthetic clock and display ticker
//! - **eligibility**: Early / on-time verdict for a gated action
//! - **latency**: Artificial processing delays and the processing gate
//! - **models**: Domain types (Course, Catalog, SessionRecord, Event)
//! - **cart**: Default cart, view filters, applied-course list
//! - **orchestrator**: Portal (login phase) and catalog browser (browse phase)
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All timestamps are i64 milliseconds on the civil timeline
//! 2. All randomness is deterministic (seeded RNG)
//! 3. A verdict is fixed at the instant of the action and never re-evaluated

// Module declarations
pub mod cart;
pub mod config;
pub mod core;
pub mod eligibility;
pub mod latency;
pub mod models;
pub mod orchestrator;
pub mod rng;

// Re-exports for convenience
pub use cart::{AppliedCourse, CancelOutcome, RegistrationError, ViewMode};
pub use config::{ConfigError, DrillConfig};
pub use crate::core::time::{BoundaryConfig, SyntheticClock};
pub use eligibility::{classify, ActionCapture, Eligibility};
pub use latency::{LatencyKind, LatencySimulator};
pub use models::{Catalog, Course, Event, EventLog, Identity, SessionRecord};
pub use orchestrator::{CatalogBrowser, DrillError, DrillRuntime, Phase, Portal};
pub use rng::RngManager;

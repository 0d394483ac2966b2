//! Orchestrator - drives a drill from setup to logout
//!
//! - [`setup`]: the setup form and its validation
//! - [`portal`]: login phase (clock anchor, capture, classification, delay)
//! - [`handoff`]: session record commit/load between the two phases
//! - [`browser`]: browse phase (cart, views, registrations)

pub mod browser;
mod error;
pub mod handoff;
pub mod portal;
pub mod setup;

pub use browser::{BrowserAction, BrowserOutcome, CatalogBrowser, CourseRow, PendingAction, RegisterAffordance};
pub use error::DrillError;
pub use handoff::{FileSessionStore, InMemorySessionStore, SessionError, SessionStore};
pub use portal::{DrillRuntime, LoginOutcome, PendingLogin, Phase, Portal};
pub use setup::{SetupError, SetupField, SetupForm, ValidatedSetup};

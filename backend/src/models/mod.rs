//! Domain models for the registration drill

pub mod course;
pub mod event;
pub mod session;

// Re-exports
pub use course::{Catalog, CatalogError, Category, Course, CourseId};
pub use event::{Event, EventLog};
pub use session::{Identity, SessionRecord};

//! Session record handed from the login phase to the catalog browser.

use crate::core::time::BoundaryConfig;
use crate::eligibility::{ActionCapture, Eligibility};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who the user declared themselves to be on the setup screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub college: String,
    pub department: String,
    /// 1..=4
    pub year: u8,
    pub name: String,
    pub student_id: String,
}

impl Identity {
    pub fn year_label(&self) -> String {
        format!("{}학년", self.year)
    }
}

/// Everything the browse phase needs from the login phase.
///
/// Created once when the login completes, destroyed on logout or restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub identity: Identity,
    pub boundary: BoundaryConfig,
    /// Boundary as the user entered it.
    pub boundary_text: String,
    pub capture: ActionCapture,
    pub eligibility: Eligibility,
    pub login_delay_ms: u64,
    /// SHA-256 of the canonical boundary config.
    pub config_hash: String,
}

impl SessionRecord {
    pub fn is_early(&self) -> bool {
        self.eligibility.is_early()
    }
}

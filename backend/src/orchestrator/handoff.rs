//! Session hand-off - Save/Load the login outcome
//!
//! The login phase writes one serialized [`SessionRecord`]; the browse phase
//! reads it back once. Storage is session-scoped: the in-memory store lives as
//! long as the drill, the file store as long as its session directory.
//!
//! # Critical Invariants
//!
//! - **Fail closed**: a missing, unreadable or inconsistent record loads as
//!   `None`, never as an error the browser has to handle
//! - **Config matching**: the record's `config_hash` must match its boundary
//! - **Lead options**: the stored lead must be one the setup form offers
//! - **Verdict integrity**: the stored verdict must agree with the stored capture

use crate::core::time::{BoundaryConfig, LEAD_OPTIONS};
use crate::eligibility::{ActionCapture, Eligibility};
use crate::models::{Identity, SessionRecord};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

pub const SESSION_FILE: &str = "session.json";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session serialization failed: {0}")]
    Serialization(String),

    #[error("session storage {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("session record invalid: {0}")]
    Invalid(String),
}

// ============================================================================
// Storage
// ============================================================================

/// Session-scoped storage holding at most one serialized record.
pub trait SessionStore {
    fn save(&mut self, payload: String) -> Result<(), SessionError>;

    /// `Ok(None)` when nothing is stored.
    fn load_raw(&self) -> Result<Option<String>, SessionError>;

    fn clear(&mut self) -> Result<(), SessionError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    slot: Option<String>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&mut self, payload: String) -> Result<(), SessionError> {
        self.slot = Some(payload);
        Ok(())
    }

    fn load_raw(&self) -> Result<Option<String>, SessionError> {
        Ok(self.slot.clone())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.slot = None;
        Ok(())
    }
}

/// `session.json` inside a per-drill session directory.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(session_dir: impl AsRef<Path>) -> Self {
        Self {
            path: session_dir.as_ref().join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&mut self, payload: String) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, payload).map_err(|e| self.io_error(e))
    }

    fn load_raw(&self) -> Result<Option<String>, SessionError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Deterministic SHA-256 of `config` over canonical (key-sorted) JSON.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SessionError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| SessionError::Serialization(format!("config: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| SessionError::Serialization(format!("config: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Commit / Load
// ============================================================================

/// Assemble the record for a completed login.
pub fn commit(
    identity: Identity,
    boundary: BoundaryConfig,
    boundary_text: String,
    capture: ActionCapture,
    eligibility: Eligibility,
    login_delay_ms: u64,
) -> Result<SessionRecord, SessionError> {
    Ok(SessionRecord {
        session_id: Uuid::new_v4(),
        identity,
        boundary,
        boundary_text,
        capture,
        eligibility,
        login_delay_ms,
        config_hash: compute_config_hash(&boundary)?,
    })
}

/// Check a record's invariants.
pub fn validate_record(record: &SessionRecord) -> Result<(), SessionError> {
    if !LEAD_OPTIONS.contains(&record.boundary.lead_seconds) {
        return Err(SessionError::Invalid(format!(
            "lead {}s is not one of {:?}",
            record.boundary.lead_seconds, LEAD_OPTIONS
        )));
    }
    let expected = compute_config_hash(&record.boundary)?;
    if record.config_hash != expected {
        return Err(SessionError::Invalid(format!(
            "config hash mismatch: stored {}, computed {}",
            record.config_hash, expected
        )));
    }
    if record.capture.classify(&record.boundary) != record.eligibility {
        return Err(SessionError::Invalid(format!(
            "verdict {:?} disagrees with capture at {}",
            record.eligibility, record.capture.sim_click_ms
        )));
    }
    Ok(())
}

pub fn persist(store: &mut dyn SessionStore, record: &SessionRecord) -> Result<(), SessionError> {
    let payload = serde_json::to_string(record)
        .map_err(|e| SessionError::Serialization(format!("record: {}", e)))?;
    store.save(payload)?;
    tracing::info!(session_id = %record.session_id, early = record.is_early(), "session committed");
    Ok(())
}

/// Read the record back, or `None` if there is no usable one.
pub fn load(store: &dyn SessionStore) -> Option<SessionRecord> {
    let payload = match store.load_raw() {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            tracing::debug!("no session stored");
            return None;
        }
        Err(e) => {
            tracing::warn!(error = %e, "session storage unreadable");
            return None;
        }
    };

    let record: SessionRecord = match serde_json::from_str(&payload) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(error = %e, "session payload unparsable");
            return None;
        }
    };

    if let Err(e) = validate_record(&record) {
        tracing::warn!(error = %e, "session record rejected");
        return None;
    }
    Some(record)
}

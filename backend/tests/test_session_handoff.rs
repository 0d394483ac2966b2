//! Session Hand-off Tests - Commit/Load the login outcome
//!
//! Critical invariants tested:
//! - Fail closed: nothing stored, garbage stored or a tampered record all load as None
//! - Config matching: a record whose boundary no longer matches its hash is rejected
//! - Lead options: a stored lead the setup form never offers is rejected
//! - Logout destroys the record

use registration_drill_core::core::time::{parse_civil, BoundaryConfig};
use registration_drill_core::eligibility::{ActionCapture, Eligibility};
use registration_drill_core::models::{Identity, SessionRecord};
use registration_drill_core::orchestrator::handoff::{
    self, compute_config_hash, FileSessionStore, InMemorySessionStore, SessionStore, SESSION_FILE,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn boundary() -> BoundaryConfig {
    BoundaryConfig::new(parse_civil("2026-02-05T10:00:00").unwrap(), 10).unwrap()
}

fn record(sim_click: &str) -> SessionRecord {
    let capture = ActionCapture {
        real_click_ms: 1_234,
        sim_click_ms: parse_civil(sim_click).unwrap(),
        anchored: true,
    };
    handoff::commit(
        Identity {
            college: "인문사회과학대학".to_string(),
            department: "인문사회과학대학 영어영문학과".to_string(),
            year: 3,
            name: "수뭉이".to_string(),
            student_id: "202612345".to_string(),
        },
        boundary(),
        "2026-02-05T10:00:00".to_string(),
        capture,
        capture.classify(&boundary()),
        12_345,
    )
    .unwrap()
}

fn temp_session_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("regdrill-test-{}", uuid::Uuid::new_v4()))
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_in_memory_roundtrip() {
    let rec = record("2026-02-05T10:00:01");
    let mut store = InMemorySessionStore::new();
    handoff::persist(&mut store, &rec).unwrap();

    let loaded = handoff::load(&store).unwrap();
    assert_eq!(loaded, rec);
    assert_eq!(loaded.eligibility, Eligibility::OnTime);
    assert_eq!(loaded.login_delay_ms, 12_345);
}

#[test]
fn test_file_roundtrip_and_clear() {
    let dir = temp_session_dir();
    let mut store = FileSessionStore::new(&dir);
    assert_eq!(store.path(), dir.join(SESSION_FILE).as_path());
    assert!(handoff::load(&store).is_none());

    let rec = record("2026-02-05T09:59:59");
    handoff::persist(&mut store, &rec).unwrap();

    // A second handle on the same directory sees the same session.
    let reopened = FileSessionStore::new(&dir);
    assert_eq!(handoff::load(&reopened), Some(rec));

    store.clear().unwrap();
    assert!(handoff::load(&reopened).is_none());
    // Clearing twice is fine.
    store.clear().unwrap();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_session_ids_unique() {
    assert_ne!(record("2026-02-05T10:00:01").session_id, record("2026-02-05T10:00:01").session_id);
}

// ============================================================================
// Fail closed
// ============================================================================

#[test]
fn test_empty_store_is_absent() {
    assert!(handoff::load(&InMemorySessionStore::new()).is_none());
}

#[test]
fn test_garbage_is_absent() {
    let mut store = InMemorySessionStore::new();
    store.save("{not json".to_string()).unwrap();
    assert!(handoff::load(&store).is_none());
}

#[test]
fn test_tampered_boundary_rejected() {
    let mut rec = record("2026-02-05T10:00:01");
    rec.boundary = BoundaryConfig::new(rec.boundary.boundary_ms, 60).unwrap();

    let mut store = InMemorySessionStore::new();
    store.save(serde_json::to_string(&rec).unwrap()).unwrap();
    assert!(handoff::load(&store).is_none());
}

#[test]
fn test_unoffered_lead_rejected_even_with_matching_hash() {
    let mut rec = record("2026-02-05T10:00:01");
    rec.boundary = BoundaryConfig {
        boundary_ms: rec.boundary.boundary_ms,
        lead_seconds: 7,
    };
    rec.config_hash = compute_config_hash(&rec.boundary).unwrap();
    assert!(handoff::validate_record(&rec).is_err());

    let mut store = InMemorySessionStore::new();
    store.save(serde_json::to_string(&rec).unwrap()).unwrap();
    assert!(handoff::load(&store).is_none());
}

#[test]
fn test_flipped_verdict_rejected() {
    let mut rec = record("2026-02-05T09:59:59");
    rec.eligibility = Eligibility::OnTime;

    let mut store = InMemorySessionStore::new();
    store.save(serde_json::to_string(&rec).unwrap()).unwrap();
    assert!(handoff::load(&store).is_none());
}

#[test]
fn test_hash_matches_boundary() {
    let rec = record("2026-02-05T10:00:01");
    assert_eq!(rec.config_hash, compute_config_hash(&boundary()).unwrap());
    assert_eq!(rec.config_hash.len(), 64);
}

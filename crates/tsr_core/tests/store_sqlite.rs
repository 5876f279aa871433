use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use tsr_core::chain;
use tsr_core::db;
use tsr_core::demo::{demo_incidents, seed_demo};
use tsr_core::domain::{AuditLogEntry, EvidenceFile, Incident, IncidentStatus};
use tsr_core::store::{IncidentStore, SqliteStore};

fn open_store(path: &Path) -> SqliteStore {
    let mut conn = db::open(path).expect("open");
    db::migrate(&mut conn).expect("migrate");
    SqliteStore::new(conn)
}

fn incident_with_children() -> Incident {
    let mut incident = demo_incidents().remove(1); // demo-001, anchored
    incident.id = "inc-sql".to_string();
    incident.files = vec![
        EvidenceFile {
            id: "f-a".to_string(),
            name: "a.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 10,
            content_hash: chain::hash_bytes(b"a"),
            preview: Some("data:image/jpeg;base64,AAAA".to_string()),
        },
        EvidenceFile {
            id: "f-b".to_string(),
            name: "b.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            size_bytes: 20,
            content_hash: chain::hash_bytes(b"b"),
            preview: None,
        },
        EvidenceFile {
            id: "f-c".to_string(),
            name: "c.txt".to_string(),
            mime_type: "text/plain".to_string(),
            size_bytes: 30,
            content_hash: chain::hash_bytes(b"c"),
            preview: None,
        },
    ];
    incident
}

#[test]
fn round_trips_the_full_record() {
    let tmp = tempdir().unwrap();
    let mut store = open_store(&tmp.path().join("tsr.sqlite"));

    let incident = incident_with_children();
    store.save_incident(&incident).expect("save");

    let reloaded = store.get_incident("inc-sql").expect("get");
    assert_eq!(reloaded, incident);
}

#[test]
fn file_and_audit_order_survive_reload() {
    let tmp = tempdir().unwrap();
    let mut store = open_store(&tmp.path().join("tsr.sqlite"));

    let incident = incident_with_children();
    store.save_incident(&incident).expect("save");

    let reloaded = store.get_incident("inc-sql").expect("get");
    let names: Vec<&str> = reloaded.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.jpg", "b.mp4", "c.txt"]);

    let actions: Vec<&str> = reloaded
        .audit_log
        .iter()
        .map(|e| e.action.as_str())
        .collect();
    assert_eq!(actions, vec!["Incident Reported", "Evidence Anchored"]);
}

#[test]
fn save_twice_keeps_one_row_and_no_duplicate_audit_entries() {
    let tmp = tempdir().unwrap();
    let mut store = open_store(&tmp.path().join("tsr.sqlite"));

    let incident = incident_with_children();
    store.save_incident(&incident).expect("first save");
    store.save_incident(&incident).expect("second save");

    let incidents = store.list_incidents().expect("list");
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].audit_log.len(), incident.audit_log.len());
    assert_eq!(incidents[0].files.len(), incident.files.len());
}

#[test]
fn appended_audit_entries_accumulate_without_rewriting_history() {
    let tmp = tempdir().unwrap();
    let mut store = open_store(&tmp.path().join("tsr.sqlite"));

    let mut incident = incident_with_children();
    store.save_incident(&incident).expect("save");

    incident.audit_log.push(AuditLogEntry {
        id: "audit-new".to_string(),
        timestamp: "2026-01-01T09:00:00Z".to_string(),
        action: "Incident Acknowledged".to_string(),
        actor: "Ops".to_string(),
        details: None,
    });
    store.save_incident(&incident).expect("save again");

    let reloaded = store.get_incident("inc-sql").expect("get");
    assert_eq!(reloaded.audit_log.len(), 3);
    assert_eq!(reloaded.audit_log[2].id, "audit-new");
}

#[test]
fn list_orders_newest_first() {
    let tmp = tempdir().unwrap();
    let mut store = open_store(&tmp.path().join("tsr.sqlite"));
    seed_demo(&mut store).expect("seed");

    let incidents = store.list_incidents().expect("list");
    assert_eq!(incidents.len(), 2);
    assert_eq!(incidents[0].id, "demo-002", "reported later, listed first");
    assert_eq!(incidents[1].id, "demo-001");
}

#[test]
fn updates_replace_fields_in_place() {
    let tmp = tempdir().unwrap();
    let mut store = open_store(&tmp.path().join("tsr.sqlite"));

    let mut incident = incident_with_children();
    store.save_incident(&incident).expect("save");

    incident.status = IncidentStatus::Resolved;
    incident.resolved_at = Some("2026-01-01T10:00:00Z".to_string());
    incident.notes = "Recovered at lost and found.".to_string();
    store.save_incident(&incident).expect("update");

    let reloaded = store.get_incident("inc-sql").expect("get");
    assert_eq!(reloaded.status, IncidentStatus::Resolved);
    assert_eq!(reloaded.notes, "Recovered at lost and found.");
    assert_eq!(store.list_incidents().expect("list").len(), 1);
}

#[test]
fn missing_incident_is_not_found() {
    let tmp = tempdir().unwrap();
    let mut store = open_store(&tmp.path().join("tsr.sqlite"));

    let err = store.get_incident("missing").expect_err("not found");
    assert_eq!(err.code, "NOT_FOUND");
}

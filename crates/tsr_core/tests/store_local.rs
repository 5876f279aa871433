use std::fs;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use tsr_core::demo::{demo_incidents, seed_demo};
use tsr_core::domain::{AnchorStatus, IncidentStatus};
use tsr_core::store::{IncidentStore, LocalStore};

#[test]
fn first_read_serves_the_seeded_demo_set() {
    let tmp = tempdir().unwrap();
    let mut store = LocalStore::new(tmp.path());

    let incidents = store.list_incidents().expect("list");
    assert_eq!(incidents.len(), 2);

    assert_eq!(incidents[0].id, "demo-002");
    assert_eq!(incidents[0].severity, 9);
    assert_eq!(incidents[0].status, IncidentStatus::Pending);

    assert_eq!(incidents[1].id, "demo-001");
    assert_eq!(incidents[1].severity, 7);
    assert_eq!(incidents[1].status, IncidentStatus::Acknowledged);
    assert_eq!(incidents[1].anchor_status, AnchorStatus::Anchored);
}

#[test]
fn corrupted_store_degrades_to_the_demo_set() {
    let tmp = tempdir().unwrap();
    let mut store = LocalStore::new(tmp.path());
    fs::write(store.path(), b"{definitely not json").expect("write garbage");

    let incidents = store.list_incidents().expect("list must not fail");
    assert_eq!(incidents.len(), 2);
    assert_eq!(incidents[0].id, "demo-002");
}

#[test]
fn save_is_an_idempotent_upsert() {
    let tmp = tempdir().unwrap();
    let mut store = LocalStore::new(tmp.path());
    seed_demo(&mut store).expect("seed");

    let incident = store.get_incident("demo-001").expect("get");
    store.save_incident(&incident).expect("first save");
    store.save_incident(&incident).expect("second save");

    let incidents = store.list_incidents().expect("list");
    assert_eq!(incidents.len(), 2, "no duplicate rows for one id");

    let reloaded = store.get_incident("demo-001").expect("get");
    assert_eq!(reloaded.audit_log.len(), incident.audit_log.len());
    assert_eq!(reloaded, incident);
}

#[test]
fn new_incidents_insert_at_the_front() {
    let tmp = tempdir().unwrap();
    let mut store = LocalStore::new(tmp.path());
    seed_demo(&mut store).expect("seed");

    let mut fresh = demo_incidents().remove(0);
    fresh.id = "inc-front".to_string();
    fresh.reported_at = "2026-01-02T00:00:00Z".to_string();
    store.save_incident(&fresh).expect("save");

    let incidents = store.list_incidents().expect("list");
    assert_eq!(incidents.len(), 3);
    assert_eq!(incidents[0].id, "inc-front");
}

#[test]
fn updates_replace_the_record_in_place() {
    let tmp = tempdir().unwrap();
    let mut store = LocalStore::new(tmp.path());
    seed_demo(&mut store).expect("seed");

    let mut incident = store.get_incident("demo-002").expect("get");
    incident.status = IncidentStatus::Acknowledged;
    incident.acknowledged_at = Some("2026-01-01T08:00:00Z".to_string());
    store.save_incident(&incident).expect("save");

    let incidents = store.list_incidents().expect("list");
    assert_eq!(incidents.len(), 2);
    assert_eq!(incidents[0].id, "demo-002", "position is preserved on update");
    assert_eq!(incidents[0].status, IncidentStatus::Acknowledged);
}

#[test]
fn get_unknown_id_is_not_found() {
    let tmp = tempdir().unwrap();
    let mut store = LocalStore::new(tmp.path());

    let err = store.get_incident("missing").expect_err("not found");
    assert_eq!(err.code, "NOT_FOUND");
}

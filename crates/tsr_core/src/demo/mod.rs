use crate::domain::{
    AnchorStatus, AuditLogEntry, Incident, IncidentLocation, IncidentStatus, IncidentType,
    VerificationStatus,
};
use crate::error::AppError;
use crate::store::IncidentStore;

const DEMO_TX_ID: &str =
    "0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef";
const DEMO_CHAIN_HASH: &str =
    "a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4e5f6a1b2c3d4e5f6a1b2";

/// Two illustrative incidents so dashboards are never empty on first run.
/// Timestamps are deterministic absolute instants, which keeps seeding
/// reproducible. Newest first, matching the store ordering.
pub fn demo_incidents() -> Vec<Incident> {
    vec![
        Incident {
            id: "demo-002".to_string(),
            reporter_name: None,
            incident_type: IncidentType::Medical,
            severity: 9,
            location: IncidentLocation {
                lat: 40.7589,
                lng: -73.9851,
                address: Some("Central Park, NYC".to_string()),
            },
            notes: "Tourist collapsed during jogging. Appears to be heat exhaustion."
                .to_string(),
            files: Vec::new(),
            status: IncidentStatus::Pending,
            anchor_status: AnchorStatus::NotAnchored,
            verification_status: VerificationStatus::Pending,
            chain_tx_id: None,
            chain_hash: None,
            reported_at: "2026-01-01T07:30:00Z".to_string(),
            acknowledged_at: None,
            resolved_at: None,
            verification_at: None,
            audit_log: vec![AuditLogEntry {
                id: "demo-audit-003".to_string(),
                timestamp: "2026-01-01T07:30:00Z".to_string(),
                action: "Incident Reported".to_string(),
                actor: "Anonymous Reporter".to_string(),
                details: None,
            }],
        },
        Incident {
            id: "demo-001".to_string(),
            reporter_name: Some("Sarah Johnson".to_string()),
            incident_type: IncidentType::Theft,
            severity: 7,
            location: IncidentLocation {
                lat: 40.7128,
                lng: -74.0060,
                address: Some("Times Square, NYC".to_string()),
            },
            notes: "Phone stolen while taking photos. Suspect fled towards subway entrance."
                .to_string(),
            files: Vec::new(),
            status: IncidentStatus::Acknowledged,
            anchor_status: AnchorStatus::Anchored,
            verification_status: VerificationStatus::Pending,
            chain_tx_id: Some(DEMO_TX_ID.to_string()),
            chain_hash: Some(DEMO_CHAIN_HASH.to_string()),
            reported_at: "2026-01-01T06:00:00Z".to_string(),
            acknowledged_at: Some("2026-01-01T07:00:00Z".to_string()),
            resolved_at: None,
            verification_at: None,
            audit_log: vec![
                AuditLogEntry {
                    id: "demo-audit-001".to_string(),
                    timestamp: "2026-01-01T06:00:00Z".to_string(),
                    action: "Incident Reported".to_string(),
                    actor: "System".to_string(),
                    details: None,
                },
                AuditLogEntry {
                    id: "demo-audit-002".to_string(),
                    timestamp: "2026-01-01T07:00:00Z".to_string(),
                    action: "Evidence Anchored".to_string(),
                    actor: "System".to_string(),
                    details: Some(format!("TX: {DEMO_TX_ID}")),
                },
            ],
        },
    ]
}

/// Seed the demo set into any store. Upsert semantics make this idempotent.
pub fn seed_demo(store: &mut dyn IncidentStore) -> Result<usize, AppError> {
    let incidents = demo_incidents();
    // Save oldest first so the local store's insert-at-front keeps the
    // newest-first ordering.
    for incident in incidents.iter().rev() {
        store.save_incident(incident)?;
    }
    Ok(incidents.len())
}

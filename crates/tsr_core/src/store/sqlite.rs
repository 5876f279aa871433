use rusqlite::{Connection, OptionalExtension};

use crate::domain::{
    AnchorStatus, AuditLogEntry, EvidenceFile, Incident, IncidentLocation, IncidentStatus,
    IncidentType, VerificationStatus,
};
use crate::error::AppError;
use crate::store::IncidentStore;

const INCIDENT_COLUMNS: &str = "id, reporter_name, type, severity, \
     location_lat, location_lng, location_address, notes, \
     status, anchor_status, verification_status, \
     chain_tx_id, chain_hash, \
     reported_at, acknowledged_at, resolved_at, verification_at";

/// Database-backed store: an incidents table plus child evidence-file and
/// audit-log rows, recomposed into the embedded record shape on read.
///
/// `save_incident` runs in one transaction over all three tables, so a field
/// update and its audit entry commit together. Audit rows are insert-only;
/// re-saving a record never duplicates or rewrites them.
pub struct SqliteStore {
    conn: Connection,
}

/// Raw row image; enum and range decoding happens after the rusqlite closure
/// so failures surface as structured errors instead of column-type panics.
struct IncidentRow {
    id: String,
    reporter_name: Option<String>,
    kind: String,
    severity: i64,
    location_lat: f64,
    location_lng: f64,
    location_address: Option<String>,
    notes: String,
    status: String,
    anchor_status: String,
    verification_status: String,
    chain_tx_id: Option<String>,
    chain_hash: Option<String>,
    reported_at: String,
    acknowledged_at: Option<String>,
    resolved_at: Option<String>,
    verification_at: Option<String>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IncidentRow> {
    Ok(IncidentRow {
        id: row.get(0)?,
        reporter_name: row.get(1)?,
        kind: row.get(2)?,
        severity: row.get(3)?,
        location_lat: row.get(4)?,
        location_lng: row.get(5)?,
        location_address: row.get(6)?,
        notes: row.get(7)?,
        status: row.get(8)?,
        anchor_status: row.get(9)?,
        verification_status: row.get(10)?,
        chain_tx_id: row.get(11)?,
        chain_hash: row.get(12)?,
        reported_at: row.get(13)?,
        acknowledged_at: row.get(14)?,
        resolved_at: row.get(15)?,
        verification_at: row.get(16)?,
    })
}

impl SqliteStore {
    /// The connection must already be migrated (see `db::migrate`).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn decode(&self, raw: IncidentRow) -> Result<Incident, AppError> {
        let severity = u8::try_from(raw.severity).map_err(|_| {
            AppError::new("DB_DECODE_FAILED", "Stored severity out of range")
                .with_details(format!("id={}; severity={}", raw.id, raw.severity))
        })?;

        let files = self.files_for(&raw.id)?;
        let audit_log = self.audit_for(&raw.id)?;

        Ok(Incident {
            incident_type: IncidentType::parse(&raw.kind)?,
            status: IncidentStatus::parse(&raw.status)?,
            anchor_status: AnchorStatus::parse(&raw.anchor_status)?,
            verification_status: VerificationStatus::parse(&raw.verification_status)?,
            id: raw.id,
            reporter_name: raw.reporter_name,
            severity,
            location: IncidentLocation {
                lat: raw.location_lat,
                lng: raw.location_lng,
                address: raw.location_address,
            },
            notes: raw.notes,
            files,
            chain_tx_id: raw.chain_tx_id,
            chain_hash: raw.chain_hash,
            reported_at: raw.reported_at,
            acknowledged_at: raw.acknowledged_at,
            resolved_at: raw.resolved_at,
            verification_at: raw.verification_at,
            audit_log,
        })
    }

    fn files_for(&self, incident_id: &str) -> Result<Vec<EvidenceFile>, AppError> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
      SELECT id, name, mime_type, size_bytes, content_hash, preview
      FROM incident_files
      WHERE incident_id = ?1
      ORDER BY position ASC
      "#,
            )
            .map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to prepare evidence files query")
                    .with_details(e.to_string())
            })?;

        let rows = stmt
            .query_map([incident_id], |row| {
                Ok(EvidenceFile {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    mime_type: row.get(2)?,
                    size_bytes: row.get(3)?,
                    content_hash: row.get(4)?,
                    preview: row.get(5)?,
                })
            })
            .map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to query evidence files")
                    .with_details(e.to_string())
            })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to decode evidence file row")
                    .with_details(e.to_string())
            })?);
        }
        Ok(out)
    }

    fn audit_for(&self, incident_id: &str) -> Result<Vec<AuditLogEntry>, AppError> {
        let mut stmt = self
            .conn
            .prepare(
                r#"
      SELECT id, timestamp, action, actor, details
      FROM audit_logs
      WHERE incident_id = ?1
      ORDER BY seq ASC
      "#,
            )
            .map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to prepare audit log query")
                    .with_details(e.to_string())
            })?;

        let rows = stmt
            .query_map([incident_id], |row| {
                Ok(AuditLogEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    action: row.get(2)?,
                    actor: row.get(3)?,
                    details: row.get(4)?,
                })
            })
            .map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to query audit log")
                    .with_details(e.to_string())
            })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to decode audit log row")
                    .with_details(e.to_string())
            })?);
        }
        Ok(out)
    }
}

impl IncidentStore for SqliteStore {
    fn list_incidents(&mut self) -> Result<Vec<Incident>, AppError> {
        let raws = {
            let mut stmt = self
                .conn
                .prepare(&format!(
                    "SELECT {INCIDENT_COLUMNS} FROM incidents ORDER BY reported_at DESC, id ASC"
                ))
                .map_err(|e| {
                    AppError::new("DB_QUERY_FAILED", "Failed to prepare incidents query")
                        .with_details(e.to_string())
                })?;

            let rows = stmt.query_map([], read_row).map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to query incidents")
                    .with_details(e.to_string())
            })?;

            let mut raws = Vec::new();
            for r in rows {
                raws.push(r.map_err(|e| {
                    AppError::new("DB_QUERY_FAILED", "Failed to decode incident row")
                        .with_details(e.to_string())
                })?);
            }
            raws
        };

        let mut out = Vec::new();
        for raw in raws {
            out.push(self.decode(raw)?);
        }
        Ok(out)
    }

    fn get_incident(&mut self, id: &str) -> Result<Incident, AppError> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT {INCIDENT_COLUMNS} FROM incidents WHERE id = ?1"),
                [id],
                read_row,
            )
            .optional()
            .map_err(|e| {
                AppError::new("DB_QUERY_FAILED", "Failed to query incident")
                    .with_details(e.to_string())
            })?
            .ok_or_else(|| AppError::not_found(id))?;

        self.decode(raw)
    }

    fn save_incident(&mut self, incident: &Incident) -> Result<(), AppError> {
        let tx = self.conn.transaction().map_err(|e| {
            AppError::new("DB_TX_FAILED", "Failed to start incident save transaction")
                .with_details(e.to_string())
        })?;

        tx.execute(
            r#"
      INSERT INTO incidents(
        id, reporter_name, type, severity,
        location_lat, location_lng, location_address, notes,
        status, anchor_status, verification_status,
        chain_tx_id, chain_hash,
        reported_at, acknowledged_at, resolved_at, verification_at
      ) VALUES (
        ?1, ?2, ?3, ?4,
        ?5, ?6, ?7, ?8,
        ?9, ?10, ?11,
        ?12, ?13,
        ?14, ?15, ?16, ?17
      )
      ON CONFLICT(id) DO UPDATE SET
        reporter_name = excluded.reporter_name,
        type = excluded.type,
        severity = excluded.severity,
        location_lat = excluded.location_lat,
        location_lng = excluded.location_lng,
        location_address = excluded.location_address,
        notes = excluded.notes,
        status = excluded.status,
        anchor_status = excluded.anchor_status,
        verification_status = excluded.verification_status,
        chain_tx_id = excluded.chain_tx_id,
        chain_hash = excluded.chain_hash,
        reported_at = excluded.reported_at,
        acknowledged_at = excluded.acknowledged_at,
        resolved_at = excluded.resolved_at,
        verification_at = excluded.verification_at
      "#,
            rusqlite::params![
                incident.id,
                incident.reporter_name,
                incident.incident_type.as_str(),
                incident.severity as i64,
                incident.location.lat,
                incident.location.lng,
                incident.location.address,
                incident.notes,
                incident.status.as_str(),
                incident.anchor_status.as_str(),
                incident.verification_status.as_str(),
                incident.chain_tx_id,
                incident.chain_hash,
                incident.reported_at,
                incident.acknowledged_at,
                incident.resolved_at,
                incident.verification_at,
            ],
        )
        .map_err(|e| {
            AppError::new("DB_WRITE_FAILED", "Failed to upsert incident")
                .with_details(format!("id={}; err={}", incident.id, e))
        })?;

        for (position, f) in incident.files.iter().enumerate() {
            tx.execute(
                r#"
      INSERT INTO incident_files(
        id, incident_id, position, name, mime_type, size_bytes, content_hash, preview
      ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      ON CONFLICT(id) DO UPDATE SET
        position = excluded.position,
        preview = excluded.preview
      "#,
                rusqlite::params![
                    f.id,
                    incident.id,
                    position as i64,
                    f.name,
                    f.mime_type,
                    f.size_bytes,
                    f.content_hash,
                    f.preview,
                ],
            )
            .map_err(|e| {
                AppError::new("DB_WRITE_FAILED", "Failed to upsert evidence file")
                    .with_details(format!("incident={}; file={}; err={}", incident.id, f.id, e))
            })?;
        }

        // Audit entries are immutable; re-inserting an existing id is a no-op.
        for (seq, entry) in incident.audit_log.iter().enumerate() {
            tx.execute(
                r#"
      INSERT OR IGNORE INTO audit_logs(
        id, incident_id, seq, timestamp, action, actor, details
      ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
      "#,
                rusqlite::params![
                    entry.id,
                    incident.id,
                    seq as i64,
                    entry.timestamp,
                    entry.action,
                    entry.actor,
                    entry.details,
                ],
            )
            .map_err(|e| {
                AppError::new("DB_WRITE_FAILED", "Failed to append audit log entry")
                    .with_details(format!(
                        "incident={}; entry={}; err={}",
                        incident.id, entry.id, e
                    ))
            })?;
        }

        tx.commit().map_err(|e| {
            AppError::new("DB_TX_FAILED", "Failed to commit incident save transaction")
                .with_details(e.to_string())
        })
    }
}

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::chain;
use crate::domain::{
    AnchorStatus, AuditLogEntry, Incident, IncidentStatus, NewIncident, VerificationStatus,
};
use crate::emergency::EmergencyContact;
use crate::error::AppError;
use crate::store::IncidentStore;
use crate::validate::validate_draft;

pub fn now_rfc3339_utc() -> Result<String, AppError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        AppError::new("TIME_FORMAT_FAILED", "Failed to format current time")
            .with_details(e.to_string())
    })
}

/// Service tuning knobs.
///
/// `verify_failure_rate` is the injected probability of reporting a mismatch
/// even when the hashes agree (the original demo ships with 10%); set it to
/// 0.0 for deterministic verification outcomes.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Display name recorded as the actor on operator-initiated audit entries.
    pub actor: String,
    /// Simulated ledger latency between the anchoring and anchored states.
    pub anchor_delay: Duration,
    pub verify_failure_rate: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            actor: "System".to_string(),
            anchor_delay: Duration::from_secs(2),
            verify_failure_rate: 0.10,
        }
    }
}

/// Orchestrates every mutation of the incident collection.
///
/// All mutating operations follow one protocol: check the precondition on
/// current state, compute the new field values, append exactly one audit
/// entry, persist the whole record via a single `save_incident`, and return
/// the updated record. A failed call leaves the stored record untouched and
/// appends nothing.
///
/// Constructed once at application start with an injected store and passed by
/// reference to consumers; there is no hidden global instance.
pub struct IncidentService {
    store: Box<dyn IncidentStore>,
    config: ServiceConfig,
    rng: StdRng,
}

impl IncidentService {
    pub fn new(store: Box<dyn IncidentStore>, config: ServiceConfig) -> Self {
        Self {
            store,
            config,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Seeded variant so tests can pin the non-deterministic pieces (mock
    /// transaction ids, verification failure injection).
    pub fn with_rng(store: Box<dyn IncidentStore>, config: ServiceConfig, rng: StdRng) -> Self {
        Self { store, config, rng }
    }

    pub fn list_incidents(&mut self) -> Result<Vec<Incident>, AppError> {
        self.store.list_incidents()
    }

    pub fn get_incident(&mut self, id: &str) -> Result<Incident, AppError> {
        self.store.get_incident(id)
    }

    fn audit_entry(
        action: &str,
        actor: &str,
        details: Option<String>,
    ) -> Result<AuditLogEntry, AppError> {
        Ok(AuditLogEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: now_rfc3339_utc()?,
            action: action.to_string(),
            actor: actor.to_string(),
            details,
        })
    }

    pub fn create_incident(&mut self, draft: NewIncident) -> Result<Incident, AppError> {
        validate_draft(&draft)?;

        let reported_at = now_rfc3339_utc()?;
        let actor = draft
            .reporter_name
            .clone()
            .unwrap_or_else(|| "Anonymous Reporter".to_string());
        let entry = Self::audit_entry("Incident Reported", &actor, None)?;

        let incident = Incident {
            id: Uuid::new_v4().to_string(),
            reporter_name: draft.reporter_name,
            incident_type: draft.incident_type,
            severity: draft.severity,
            location: draft.location,
            notes: draft.notes,
            files: draft.files,
            status: IncidentStatus::Pending,
            anchor_status: AnchorStatus::NotAnchored,
            verification_status: VerificationStatus::Pending,
            chain_tx_id: None,
            chain_hash: None,
            reported_at,
            acknowledged_at: None,
            resolved_at: None,
            verification_at: None,
            audit_log: vec![entry],
        };

        self.store.save_incident(&incident)?;
        info!(
            id = %incident.id,
            kind = incident.incident_type.as_str(),
            severity = incident.severity,
            "incident reported"
        );
        Ok(incident)
    }

    pub fn acknowledge(&mut self, id: &str) -> Result<Incident, AppError> {
        let mut incident = self.store.get_incident(id)?;
        if incident.status != IncidentStatus::Pending {
            return Err(AppError::new(
                "VALIDATION_INVALID_TRANSITION",
                "Only a pending incident can be acknowledged",
            )
            .with_details(format!("id={id}; status={}", incident.status.as_str())));
        }

        incident.status = IncidentStatus::Acknowledged;
        incident.acknowledged_at = Some(now_rfc3339_utc()?);
        incident
            .audit_log
            .push(Self::audit_entry("Incident Acknowledged", &self.config.actor, None)?);
        self.store.save_incident(&incident)?;
        info!(id = %incident.id, "incident acknowledged");
        Ok(incident)
    }

    pub fn resolve(&mut self, id: &str) -> Result<Incident, AppError> {
        let mut incident = self.store.get_incident(id)?;
        if incident.status == IncidentStatus::Resolved {
            return Err(AppError::new(
                "VALIDATION_INVALID_TRANSITION",
                "Incident is already resolved",
            )
            .with_details(format!("id={id}")));
        }

        incident.status = IncidentStatus::Resolved;
        incident.resolved_at = Some(now_rfc3339_utc()?);
        incident
            .audit_log
            .push(Self::audit_entry("Incident Resolved", &self.config.actor, None)?);
        self.store.save_incident(&incident)?;
        info!(id = %incident.id, "incident resolved");
        Ok(incident)
    }

    /// Persist the intermediate `anchoring` state so concurrent readers see
    /// progress during the latency window. The anchor operation's single
    /// audit entry is appended on completion, not here.
    pub fn begin_anchor(&mut self, id: &str) -> Result<Incident, AppError> {
        let mut incident = self.store.get_incident(id)?;
        if incident.anchor_status != AnchorStatus::NotAnchored {
            return Err(AppError::new(
                "VALIDATION_INVALID_TRANSITION",
                "Evidence can only be anchored once",
            )
            .with_details(format!(
                "id={id}; anchor_status={}",
                incident.anchor_status.as_str()
            )));
        }

        incident.anchor_status = AnchorStatus::Anchoring;
        self.store.save_incident(&incident)?;
        Ok(incident)
    }

    /// Record the simulated ledger result: the canonical evidence-bundle hash
    /// and a mock transaction id. `anchored` is terminal.
    pub fn complete_anchor(&mut self, id: &str) -> Result<Incident, AppError> {
        let mut incident = self.store.get_incident(id)?;
        if incident.anchor_status != AnchorStatus::Anchoring {
            return Err(AppError::new(
                "VALIDATION_INVALID_TRANSITION",
                "Anchor completion requires an in-progress anchor",
            )
            .with_details(format!(
                "id={id}; anchor_status={}",
                incident.anchor_status.as_str()
            )));
        }

        let chain_hash = chain::evidence_bundle_hash(&incident);
        let tx_id = chain::mock_transaction_id(&mut self.rng);

        incident.anchor_status = AnchorStatus::Anchored;
        incident.chain_hash = Some(chain_hash);
        incident.chain_tx_id = Some(tx_id.clone());
        incident.audit_log.push(Self::audit_entry(
            "Evidence Anchored",
            &self.config.actor,
            Some(format!("TX: {tx_id}")),
        )?);
        self.store.save_incident(&incident)?;
        info!(id = %incident.id, tx = %tx_id, "evidence anchored");
        Ok(incident)
    }

    /// Anchor with the configured simulated ledger latency. No cancellation
    /// once begun; the only timeout is the fixed delay itself.
    pub fn anchor_evidence(&mut self, id: &str) -> Result<Incident, AppError> {
        self.begin_anchor(id)?;
        if !self.config.anchor_delay.is_zero() {
            thread::sleep(self.config.anchor_delay);
        }
        self.complete_anchor(id)
    }

    /// Recompute the evidence-bundle hash and compare it against the anchored
    /// value. Both outcomes are terminal; a settled record rejects re-runs.
    pub fn verify_integrity(&mut self, id: &str) -> Result<Incident, AppError> {
        let mut incident = self.store.get_incident(id)?;
        let Some(stored) = incident.chain_hash.clone() else {
            return Err(AppError::new(
                "VALIDATION_NOT_ANCHORED",
                "Integrity verification requires anchored evidence",
            )
            .with_details(format!("id={id}")));
        };
        if incident.verification_status != VerificationStatus::Pending {
            return Err(AppError::new(
                "VALIDATION_INVALID_TRANSITION",
                "Verification outcome is already recorded",
            )
            .with_details(format!(
                "id={id}; verification_status={}",
                incident.verification_status.as_str()
            )));
        }

        let recomputed = chain::evidence_bundle_hash(&incident);
        let mut matches = recomputed == stored;
        if matches
            && self.config.verify_failure_rate > 0.0
            && self.rng.random::<f64>() < self.config.verify_failure_rate
        {
            // Injected failure simulation; rate comes from ServiceConfig.
            matches = false;
        }

        incident.verification_status = if matches {
            VerificationStatus::Verified
        } else {
            VerificationStatus::Compromised
        };
        incident.verification_at = Some(now_rfc3339_utc()?);

        let (action, details) = if matches {
            (
                "Integrity Verified",
                "Evidence integrity confirmed, no tampering detected.",
            )
        } else {
            (
                "Integrity Compromised",
                "Hash mismatch, evidence may be compromised.",
            )
        };
        incident.audit_log.push(Self::audit_entry(
            action,
            &self.config.actor,
            Some(details.to_string()),
        )?);
        self.store.save_incident(&incident)?;
        info!(id = %incident.id, verified = matches, "integrity check recorded");
        Ok(incident)
    }

    /// Generic audit append with no field changes. NOT_FOUND when the id is
    /// absent from the store.
    pub fn append_audit(
        &mut self,
        id: &str,
        action: &str,
        details: Option<&str>,
    ) -> Result<Incident, AppError> {
        let mut incident = self.store.get_incident(id)?;
        incident.audit_log.push(Self::audit_entry(
            action,
            &self.config.actor,
            details.map(|d| d.to_string()),
        )?);
        self.store.save_incident(&incident)?;
        Ok(incident)
    }

    /// Simulated emergency call: records the action in the audit log only.
    /// No real telephony is attached.
    pub fn log_emergency_call(
        &mut self,
        id: &str,
        contact: &EmergencyContact,
    ) -> Result<Incident, AppError> {
        let action = format!("Emergency Call - {}", contact.service.as_str().to_uppercase());
        let details = format!("Called {} ({}) (simulated)", contact.name, contact.number);
        self.append_audit(id, &action, Some(&details))
    }
}

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Category of a reported safety event. Fixed enumeration; stores persist the
/// snake_case label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncidentType {
    Theft,
    Assault,
    Medical,
    Crowd,
    Other,
}

impl IncidentType {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentType::Theft => "theft",
            IncidentType::Assault => "assault",
            IncidentType::Medical => "medical",
            IncidentType::Crowd => "crowd",
            IncidentType::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncidentType::Theft => "Theft",
            IncidentType::Assault => "Assault",
            IncidentType::Medical => "Medical",
            IncidentType::Crowd => "Crowd",
            IncidentType::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "theft" => Ok(IncidentType::Theft),
            "assault" => Ok(IncidentType::Assault),
            "medical" => Ok(IncidentType::Medical),
            "crowd" => Ok(IncidentType::Crowd),
            "other" => Ok(IncidentType::Other),
            other => Err(
                AppError::new("DECODE_UNKNOWN_INCIDENT_TYPE", "Unknown incident type")
                    .with_details(format!("value={other}")),
            ),
        }
    }
}

/// Response-side state machine: pending -> acknowledged -> resolved, strictly
/// forward. `resolved` is terminal for this machine only; anchoring and
/// verification may continue afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Pending,
    Acknowledged,
    Resolved,
}

impl IncidentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::Acknowledged => "acknowledged",
            IncidentStatus::Resolved => "resolved",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending" => Ok(IncidentStatus::Pending),
            "acknowledged" => Ok(IncidentStatus::Acknowledged),
            "resolved" => Ok(IncidentStatus::Resolved),
            other => Err(
                AppError::new("DECODE_UNKNOWN_STATUS", "Unknown incident status")
                    .with_details(format!("value={other}")),
            ),
        }
    }
}

/// Ledger-anchoring state machine: not_anchored -> anchoring -> anchored,
/// one-directional, never reversible. The intermediate `anchoring` state is
/// persisted so concurrent readers observe progress during the simulated
/// latency window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnchorStatus {
    NotAnchored,
    Anchoring,
    Anchored,
}

impl AnchorStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AnchorStatus::NotAnchored => "not_anchored",
            AnchorStatus::Anchoring => "anchoring",
            AnchorStatus::Anchored => "anchored",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "not_anchored" => Ok(AnchorStatus::NotAnchored),
            "anchoring" => Ok(AnchorStatus::Anchoring),
            "anchored" => Ok(AnchorStatus::Anchored),
            other => Err(
                AppError::new("DECODE_UNKNOWN_ANCHOR_STATUS", "Unknown anchor status")
                    .with_details(format!("value={other}")),
            ),
        }
    }
}

/// Outcome of the integrity check: pending until verification runs, then
/// verified or compromised. Both outcomes are terminal; re-running
/// verification over a settled record is rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Compromised,
}

impl VerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Compromised => "compromised",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "pending" => Ok(VerificationStatus::Pending),
            "verified" => Ok(VerificationStatus::Verified),
            "compromised" => Ok(VerificationStatus::Compromised),
            other => Err(AppError::new(
                "DECODE_UNKNOWN_VERIFICATION_STATUS",
                "Unknown verification status",
            )
            .with_details(format!("value={other}"))),
        }
    }
}

/// Derived severity label. Recomputed from the numeric severity on demand and
/// never persisted, which is why this type carries no serde derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityBucket {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityBucket {
    pub fn label(self) -> &'static str {
        match self {
            SeverityBucket::Low => "Low",
            SeverityBucket::Medium => "Medium",
            SeverityBucket::High => "High",
            SeverityBucket::Critical => "Critical",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SeverityBucket::Low => "low",
            SeverityBucket::Medium => "medium",
            SeverityBucket::High => "high",
            SeverityBucket::Critical => "critical",
        }
    }
}

/// 1-3 low, 4-6 medium, 7-8 high, 9-10 critical.
pub fn severity_bucket(severity: u8) -> SeverityBucket {
    match severity {
        0..=3 => SeverityBucket::Low,
        4..=6 => SeverityBucket::Medium,
        7..=8 => SeverityBucket::High,
        _ => SeverityBucket::Critical,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncidentLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
}

/// One evidence attachment. Owned exclusively by its incident; list order is
/// the reporter's upload order and is preserved by both stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    /// Hex sha256 of the file bytes; recomputing over the same bytes must
    /// reproduce this value (the verification check depends on it).
    pub content_hash: String,
    /// Inline renderable representation, images only.
    pub preview: Option<String>,
}

/// One entry in an incident's append-only event log. Immutable once created;
/// entries are never reordered or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditLogEntry {
    pub id: String,
    /// RFC3339 UTC instant.
    pub timestamp: String,
    pub action: String,
    /// Display name, or "System" for unattended transitions.
    pub actor: String,
    pub details: Option<String>,
}

/// Canonical incident record shared by the stores, the lifecycle service, and
/// analytics.
///
/// Notes:
/// - Timestamps are RFC3339 UTC strings. `reported_at` is set at creation;
///   the other three are each set exactly once when the corresponding
///   transition occurs and never cleared.
/// - `audit_log` is embedded in the record: a field update and its audit
///   entry are persisted in one `save_incident`, so neither can land alone.
/// - Mutation happens only through the lifecycle service's named operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Incident {
    pub id: String,
    pub reporter_name: Option<String>,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    /// 1-10 inclusive.
    pub severity: u8,
    pub location: IncidentLocation,
    pub notes: String,
    pub files: Vec<EvidenceFile>,
    pub status: IncidentStatus,
    pub anchor_status: AnchorStatus,
    pub verification_status: VerificationStatus,
    pub chain_tx_id: Option<String>,
    pub chain_hash: Option<String>,
    pub reported_at: String,
    pub acknowledged_at: Option<String>,
    pub resolved_at: Option<String>,
    pub verification_at: Option<String>,
    pub audit_log: Vec<AuditLogEntry>,
}

impl Incident {
    pub fn severity_bucket(&self) -> SeverityBucket {
        severity_bucket(self.severity)
    }
}

/// Report-submission draft. Files arrive already hashed (see
/// `evidence::prepare_evidence`); the service assigns id, timestamps, and the
/// initial statuses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewIncident {
    pub reporter_name: Option<String>,
    #[serde(rename = "type")]
    pub incident_type: IncidentType,
    pub severity: u8,
    pub location: IncidentLocation,
    pub notes: String,
    pub files: Vec<EvidenceFile>,
}

/// Advisory finding that is not a hard error. Surfaced to the caller instead
/// of being silently corrected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_buckets_follow_the_documented_ranges() {
        assert_eq!(severity_bucket(1), SeverityBucket::Low);
        assert_eq!(severity_bucket(3), SeverityBucket::Low);
        assert_eq!(severity_bucket(4), SeverityBucket::Medium);
        assert_eq!(severity_bucket(6), SeverityBucket::Medium);
        assert_eq!(severity_bucket(7), SeverityBucket::High);
        assert_eq!(severity_bucket(8), SeverityBucket::High);
        assert_eq!(severity_bucket(9), SeverityBucket::Critical);
        assert_eq!(severity_bucket(10), SeverityBucket::Critical);
    }

    #[test]
    fn enum_labels_round_trip_through_parse() {
        for t in [
            IncidentType::Theft,
            IncidentType::Assault,
            IncidentType::Medical,
            IncidentType::Crowd,
            IncidentType::Other,
        ] {
            assert_eq!(IncidentType::parse(t.as_str()).unwrap(), t);
        }
        assert_eq!(
            IncidentType::parse("earthquake").unwrap_err().code,
            "DECODE_UNKNOWN_INCIDENT_TYPE"
        );
    }
}

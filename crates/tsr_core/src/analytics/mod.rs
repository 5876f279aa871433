use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{severity_bucket, AnchorStatus, Incident, IncidentStatus, SeverityBucket};

pub const DASHBOARD_PAYLOAD_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryBucket {
    pub key: String,
    pub label: String,
    pub count: i64,
    pub incident_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: i64,
    pub acknowledged: i64,
    pub resolved: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardPayload {
    pub version: u32,
    pub incident_count: i64,
    pub status_counts: StatusCounts,
    pub anchored_count: i64,
    /// All four severity buckets, always present, low to critical.
    pub severity_mix: Vec<CategoryBucket>,
    /// Incident types actually observed, alphabetical by key.
    pub type_mix: Vec<CategoryBucket>,
}

/// Deterministic dashboard aggregates, computed from the record set on each
/// call and never stored. Repeated builds over the same list are identical.
pub fn build_dashboard_payload(incidents: &[Incident]) -> DashboardPayload {
    let mut status_counts = StatusCounts {
        pending: 0,
        acknowledged: 0,
        resolved: 0,
    };
    let mut anchored_count = 0i64;
    let mut severity_ids: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    let mut type_buckets: BTreeMap<&'static str, CategoryBucket> = BTreeMap::new();

    for incident in incidents {
        match incident.status {
            IncidentStatus::Pending => status_counts.pending += 1,
            IncidentStatus::Acknowledged => status_counts.acknowledged += 1,
            IncidentStatus::Resolved => status_counts.resolved += 1,
        }
        if incident.anchor_status == AnchorStatus::Anchored {
            anchored_count += 1;
        }

        severity_ids
            .entry(severity_bucket(incident.severity).key())
            .or_default()
            .push(incident.id.clone());

        let bucket = type_buckets
            .entry(incident.incident_type.as_str())
            .or_insert_with(|| CategoryBucket {
                key: incident.incident_type.as_str().to_string(),
                label: incident.incident_type.label().to_string(),
                count: 0,
                incident_ids: Vec::new(),
            });
        bucket.count += 1;
        bucket.incident_ids.push(incident.id.clone());
    }

    let severity_mix = [
        SeverityBucket::Low,
        SeverityBucket::Medium,
        SeverityBucket::High,
        SeverityBucket::Critical,
    ]
    .into_iter()
    .map(|b| {
        let ids = severity_ids.remove(b.key()).unwrap_or_default();
        CategoryBucket {
            key: b.key().to_string(),
            label: b.label().to_string(),
            count: ids.len() as i64,
            incident_ids: ids,
        }
    })
    .collect();

    DashboardPayload {
        version: DASHBOARD_PAYLOAD_VERSION,
        incident_count: incidents.len() as i64,
        status_counts,
        anchored_count,
        severity_mix,
        type_mix: type_buckets.into_values().collect(),
    }
}

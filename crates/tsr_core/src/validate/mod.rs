use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::{AnchorStatus, Incident, NewIncident, ValidationWarning, VerificationStatus};
use crate::error::AppError;
use crate::store::IncidentStore;

/// Hard create-time validation. A presentation layer may validate too, but
/// the service never trusts it.
pub fn validate_draft(draft: &NewIncident) -> Result<(), AppError> {
    if !(1..=10).contains(&draft.severity) {
        return Err(AppError::new(
            "VALIDATION_SEVERITY_OUT_OF_RANGE",
            "Severity must be between 1 and 10",
        )
        .with_details(format!("value={}", draft.severity)));
    }

    let lat = draft.location.lat;
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::new(
            "VALIDATION_LOCATION_INVALID",
            "Latitude must be a finite value in [-90, 90]",
        )
        .with_details(format!("lat={lat}")));
    }

    let lng = draft.location.lng;
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::new(
            "VALIDATION_LOCATION_INVALID",
            "Longitude must be a finite value in [-180, 180]",
        )
        .with_details(format!("lng={lng}")));
    }

    Ok(())
}

fn parse_ts(
    field: &str,
    value: Option<&str>,
    warnings: &mut Vec<ValidationWarning>,
) -> Option<OffsetDateTime> {
    let s = value?;
    match OffsetDateTime::parse(s, &Rfc3339) {
        Ok(dt) => Some(dt),
        Err(e) => {
            warnings.push(
                ValidationWarning::new(
                    "VALIDATION_TS_PARSE_FAILED",
                    format!("Failed to parse {field}"),
                )
                .with_details(format!("value={s}; err={e}")),
            );
            None
        }
    }
}

fn order_check(
    a_field: &str,
    a: Option<OffsetDateTime>,
    b_field: &str,
    b: Option<OffsetDateTime>,
    warnings: &mut Vec<ValidationWarning>,
) {
    let (Some(a), Some(b)) = (a, b) else { return };
    if a > b {
        warnings.push(
            ValidationWarning::new(
                "VALIDATION_TS_ORDER_VIOLATION",
                format!("Timestamp order violation: {a_field} must be <= {b_field}"),
            )
            .with_details(format!("{a_field}={a}; {b_field}={b}")),
        );
    }
}

/// Advisory checks over a stored incident:
/// reported <= acknowledged <= resolved, severity range, and agreement
/// between the anchor state and the chain fields.
pub fn validate_incident(incident: &Incident) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if !(1..=10).contains(&incident.severity) {
        warnings.push(
            ValidationWarning::new(
                "VALIDATION_SEVERITY_OUT_OF_RANGE",
                "Severity outside the 1-10 range",
            )
            .with_details(format!("value={}", incident.severity)),
        );
    }

    let reported = parse_ts("reported_at", Some(&incident.reported_at), &mut warnings);
    let acknowledged = parse_ts(
        "acknowledged_at",
        incident.acknowledged_at.as_deref(),
        &mut warnings,
    );
    let resolved = parse_ts("resolved_at", incident.resolved_at.as_deref(), &mut warnings);

    order_check(
        "reported_at",
        reported,
        "acknowledged_at",
        acknowledged,
        &mut warnings,
    );
    order_check(
        "acknowledged_at",
        acknowledged,
        "resolved_at",
        resolved,
        &mut warnings,
    );
    order_check("reported_at", reported, "resolved_at", resolved, &mut warnings);

    if incident.anchor_status == AnchorStatus::Anchored
        && (incident.chain_hash.is_none() || incident.chain_tx_id.is_none())
    {
        warnings.push(
            ValidationWarning::new(
                "VALIDATION_ANCHOR_FIELDS_MISSING",
                "Anchored incident is missing its chain hash or transaction id",
            )
            .with_details(format!("id={}", incident.id)),
        );
    }

    if incident.verification_status != VerificationStatus::Pending && incident.chain_hash.is_none()
    {
        warnings.push(
            ValidationWarning::new(
                "VALIDATION_VERIFICATION_WITHOUT_ANCHOR",
                "Verification outcome recorded without an anchored hash",
            )
            .with_details(format!("id={}", incident.id)),
        );
    }

    warnings
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentValidationReportItem {
    pub id: String,
    pub reported_at: String,
    pub warnings: Vec<ValidationWarning>,
}

pub fn validate_all(
    store: &mut dyn IncidentStore,
) -> Result<Vec<IncidentValidationReportItem>, AppError> {
    let incidents = store.list_incidents()?;
    let mut out = Vec::new();

    for inc in incidents {
        let warnings = validate_incident(&inc);
        out.push(IncidentValidationReportItem {
            id: inc.id,
            reported_at: inc.reported_at,
            warnings,
        });
    }

    // Deterministic ordering.
    out.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(out)
}

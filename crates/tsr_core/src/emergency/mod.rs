use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyService {
    Police,
    Hospital,
    Fire,
}

impl EmergencyService {
    pub fn as_str(self) -> &'static str {
        match self {
            EmergencyService::Police => "police",
            EmergencyService::Hospital => "hospital",
            EmergencyService::Fire => "fire",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value {
            "police" => Ok(EmergencyService::Police),
            "hospital" => Ok(EmergencyService::Hospital),
            "fire" => Ok(EmergencyService::Fire),
            other => Err(AppError::new(
                "DECODE_UNKNOWN_EMERGENCY_SERVICE",
                "Unknown emergency service",
            )
            .with_details(format!("value={other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmergencyContact {
    pub service: EmergencyService,
    pub name: String,
    pub number: String,
}

/// Demo directory; stands in for a real PSTN integration.
pub fn default_contacts() -> Vec<EmergencyContact> {
    vec![
        EmergencyContact {
            service: EmergencyService::Police,
            name: "NYPD Emergency".to_string(),
            number: "911".to_string(),
        },
        EmergencyContact {
            service: EmergencyService::Hospital,
            name: "Mount Sinai Urgent Care".to_string(),
            number: "+1-212-555-0144".to_string(),
        },
        EmergencyContact {
            service: EmergencyService::Fire,
            name: "FDNY Dispatch".to_string(),
            number: "911".to_string(),
        },
    ]
}

pub fn contact_for(service: EmergencyService) -> EmergencyContact {
    default_contacts()
        .into_iter()
        .find(|c| c.service == service)
        .unwrap_or(EmergencyContact {
            service,
            name: "Emergency Services".to_string(),
            number: "911".to_string(),
        })
}

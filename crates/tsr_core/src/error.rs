use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape used across every layer of the crate.
///
/// `code` is a stable SCREAMING_SNAKE identifier prefixed by subsystem
/// (`VALIDATION_*`, `DB_*`, `STORE_*`, `EVIDENCE_*`); callers branch on it,
/// never on the message text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    /// Missing incident lookup; the id goes into `details`.
    pub fn not_found(incident_id: &str) -> Self {
        Self::new("NOT_FOUND", "Incident not found").with_details(format!("id={incident_id}"))
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

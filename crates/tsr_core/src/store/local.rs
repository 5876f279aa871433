use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::demo;
use crate::domain::Incident;
use crate::error::AppError;
use crate::store::IncidentStore;

pub const STORE_FILE_NAME: &str = "tourist_incidents.json";

/// Single-file JSON store: one serialized array under one well-known name,
/// newest first.
///
/// The read path degrades to the seeded demo set when the file is missing or
/// unreadable, so a first run or a corrupted file never leaves the caller
/// with an empty or crashed view. The write path surfaces failures; it does
/// not drop them.
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(STORE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Vec<Incident> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(_) => return demo::demo_incidents(),
        };
        match serde_json::from_slice::<Vec<Incident>>(&bytes) {
            Ok(list) => list,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "incident store unreadable, serving demo set"
                );
                demo::demo_incidents()
            }
        }
    }

    fn persist(&self, incidents: &[Incident]) -> Result<(), AppError> {
        let json = serde_json::to_vec_pretty(incidents).map_err(|e| {
            AppError::new("STORE_ENCODE_FAILED", "Failed to encode incident collection")
                .with_details(e.to_string())
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::new("STORE_WRITE_FAILED", "Failed to create incident store directory")
                    .with_details(format!("path={}: {}", parent.display(), e))
                    .with_retryable(true)
            })?;
        }

        // Stage then swap so a failed write cannot tear the stored array.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|e| {
            AppError::new("STORE_WRITE_FAILED", "Failed to stage incident store write")
                .with_details(format!("path={}: {}", tmp.display(), e))
                .with_retryable(true)
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::new("STORE_WRITE_FAILED", "Failed to move incident store into place")
                .with_details(format!(
                    "src={} dst={}: {}",
                    tmp.display(),
                    self.path.display(),
                    e
                ))
                .with_retryable(true)
        })
    }
}

impl IncidentStore for LocalStore {
    fn list_incidents(&mut self) -> Result<Vec<Incident>, AppError> {
        Ok(self.load())
    }

    fn get_incident(&mut self, id: &str) -> Result<Incident, AppError> {
        self.load()
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| AppError::not_found(id))
    }

    fn save_incident(&mut self, incident: &Incident) -> Result<(), AppError> {
        let mut incidents = self.load();
        match incidents.iter_mut().find(|i| i.id == incident.id) {
            Some(existing) => *existing = incident.clone(),
            None => incidents.insert(0, incident.clone()),
        }
        self.persist(&incidents)
    }
}

use crate::domain::Incident;
use crate::error::AppError;

pub mod local;
pub mod sqlite;

pub use local::LocalStore;
pub use sqlite::SqliteStore;

/// Storage abstraction over the incident collection.
///
/// Both implementations expose the same logical operations; callers pick one
/// at construction time instead of branching per call site. `save_incident`
/// is the single persisted write for every mutation: the audit log rides
/// inside the record, so a field update and its audit entry land together or
/// not at all. Across independent processes the stores are last-write-wins;
/// no optimistic-concurrency token is carried.
pub trait IncidentStore {
    /// Newest first by `reported_at`.
    fn list_incidents(&mut self) -> Result<Vec<Incident>, AppError>;

    fn get_incident(&mut self, id: &str) -> Result<Incident, AppError>;

    /// Upsert by id: replace in place when present, insert at the front of
    /// the ordering when absent. Saving the same record twice yields the same
    /// final state.
    fn save_incident(&mut self, incident: &Incident) -> Result<(), AppError>;
}

//! Engine error taxonomy.
//!
//! Each variant maps to a distinct failure-handling policy in the pipeline:
//! validation failures are dropped, state conflicts are retried, zone lookup
//! failures fail open, and sink failures never roll back committed state.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or implausible position report. Dropped and logged.
    #[error("invalid position report: {0}")]
    Validation(String),

    /// Concurrent mutation detected on one device's state. Retried after
    /// reacquiring per-device exclusivity.
    #[error("concurrent state mutation for device {device_id}")]
    StateConflict { device_id: Uuid },

    /// Reference zone geometry missing or corrupt. Fails open: treated as
    /// "no zone matched" and never blocks trip segmentation.
    #[error("zone lookup failed: {0}")]
    ZoneLookup(String),

    /// Downstream publish failed. The committed detection stands; publishing
    /// is retried independently.
    #[error("event sink publish failed: {0}")]
    EventSink(String),

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        EngineError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Storage(format!("serialization error: {}", err))
    }
}

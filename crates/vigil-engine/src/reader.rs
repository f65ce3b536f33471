//! Access to the external clinical record repository.
//!
//! `SnapshotReader` is the engine's only inbound data seam. Implementations
//! distinguish a missing patient (`SnapshotNotFound`) from an unreachable
//! repository (`SnapshotUnavailable`); the latter is retryable by the
//! caller, and the engine never retries internally.

use std::collections::HashMap;

use async_trait::async_trait;

use vigil_contracts::error::{VigilError, VigilResult};
use vigil_contracts::patient::{PatientId, PatientSnapshot};

/// Read-only async access to patient snapshots.
#[async_trait]
pub trait SnapshotReader: Send + Sync {
    /// Fetch the current snapshot for a patient.
    async fn snapshot(&self, patient_id: &PatientId) -> VigilResult<PatientSnapshot>;
}

/// An in-memory `SnapshotReader` for tests and the demo.
#[derive(Debug, Default)]
pub struct StaticSnapshotReader {
    snapshots: HashMap<PatientId, PatientSnapshot>,
}

impl StaticSnapshotReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a reader holding the given snapshots, keyed by patient id.
    pub fn with_patients(snapshots: impl IntoIterator<Item = PatientSnapshot>) -> Self {
        let mut reader = Self::new();
        for snapshot in snapshots {
            reader.insert(snapshot);
        }
        reader
    }

    /// Add or replace a snapshot.
    pub fn insert(&mut self, snapshot: PatientSnapshot) {
        self.snapshots.insert(snapshot.patient_id.clone(), snapshot);
    }
}

#[async_trait]
impl SnapshotReader for StaticSnapshotReader {
    async fn snapshot(&self, patient_id: &PatientId) -> VigilResult<PatientSnapshot> {
        self.snapshots
            .get(patient_id)
            .cloned()
            .ok_or_else(|| VigilError::SnapshotNotFound {
                patient_id: patient_id.to_string(),
            })
    }
}

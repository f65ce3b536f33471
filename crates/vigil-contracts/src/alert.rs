//! Alert types and the alert lifecycle vocabulary.
//!
//! An alert moves through `queued → active → {dismissed, expired}`. The
//! state machine itself lives in vigil-alerts; this module defines only the
//! data carried along the way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patient::PatientId;

/// Unique identifier for a single alert instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertId(pub uuid::Uuid);

impl AlertId {
    /// Create a new, unique alert id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AlertId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which rule category produced an alert.
///
/// The type drives deduplication (patient + type + title) and the expiry
/// sweep's per-type maximum age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    DrugInteraction,
    Allergy,
    Contraindication,
    RiskScore,
    Guideline,
    QualityMeasure,
}

/// Display urgency of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    /// Ordering rank: higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            AlertSeverity::Info => 1,
            AlertSeverity::Warning => 2,
            AlertSeverity::Critical => 3,
        }
    }
}

/// Metadata recorded when an alert leaves the active set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dismissal {
    pub dismissed_by: String,
    pub dismissed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// A generated, prioritized clinical finding.
///
/// `dismissal` is `None` while the alert is queued or active, and `Some`
/// once it reaches history (either explicitly dismissed or expired by the
/// sweep). History entries are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    pub patient_id: PatientId,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// Which module raised the alert (e.g. "drug-interaction-check").
    pub source: String,
    /// True when the alert suggests a concrete action the clinician can take.
    pub actionable: bool,
    pub dismissal: Option<Dismissal>,
    /// Module-specific payload (the underlying finding, serialized).
    #[serde(default)]
    pub related_data: serde_json::Value,
}

impl Alert {
    /// True once the alert has reached history.
    pub fn is_dismissed(&self) -> bool {
        self.dismissal.is_some()
    }

    /// The deduplication key: same patient + type + title within the dedup
    /// window means duplicate.
    pub fn dedup_key(&self) -> (PatientId, AlertType, String) {
        (self.patient_id.clone(), self.alert_type, self.title.clone())
    }
}

/// Everything a caller provides to raise an alert. The service assigns the
/// id (when absent) and the creation timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDraft {
    pub patient_id: PatientId,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub source: String,
    pub actionable: bool,
    #[serde(default)]
    pub related_data: serde_json::Value,
    /// Caller-supplied id, for idempotent re-submission. Usually `None`.
    #[serde(default)]
    pub id: Option<AlertId>,
}

//! Patient snapshot types.
//!
//! A `PatientSnapshot` is a read-only view of a patient's current clinical
//! state, supplied by the external clinical record repository. The engine
//! never mutates a snapshot; every assessment borrows it immutably.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier for a patient, owned by the record repository.
///
/// Appears in every alert, subscription filter, and hook request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(pub String);

impl PatientId {
    /// Construct a patient id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Biological sex as recorded in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

/// Basic demographics used by score calculators and criteria evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub age_years: u32,
    pub sex: Sex,
    /// Body weight in kilograms, when recorded.
    pub weight_kg: Option<f64>,
    /// Standing height in centimetres, when recorded.
    pub height_cm: Option<f64>,
}

/// Prescription status of a medication on the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MedicationStatus {
    Active,
    Discontinued,
    Held,
    Completed,
}

/// A single entry on the patient's medication list.
///
/// Identity is name-based: matching throughout the engine is
/// case-insensitive substring containment, not a coded (RxNorm) lookup.
/// This is a known approximation carried over from the reference data
/// design; a coded identity would slot in at `vigil_reference::name_matches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dose: String,
    pub route: String,
    pub frequency: String,
    pub status: MedicationStatus,
}

impl Medication {
    /// True if this medication is currently being taken.
    pub fn is_active(&self) -> bool {
        self.status == MedicationStatus::Active
    }
}

/// The broad category of a recorded allergen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllergenType {
    Drug,
    Food,
    Environmental,
    Other,
}

/// Documented reaction severity for an allergy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllergySeverity {
    Mild,
    Moderate,
    Severe,
    Unknown,
}

/// Whether the allergy is currently considered clinically relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllergyStatus {
    Active,
    Inactive,
    Resolved,
}

/// How well-established the allergy record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    Confirmed,
    Unconfirmed,
    Refuted,
}

/// A recorded allergy or intolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub allergen: String,
    pub allergen_type: AllergenType,
    pub severity: AllergySeverity,
    pub status: AllergyStatus,
    pub verification: VerificationStatus,
}

impl Allergy {
    /// True if this allergy should participate in safety matching.
    ///
    /// Refuted allergies are excluded; unconfirmed ones still match
    /// (conservative: an undocumented reaction is still a reaction).
    pub fn is_relevant(&self) -> bool {
        self.status == AllergyStatus::Active && self.verification != VerificationStatus::Refuted
    }
}

/// Clinical status of a diagnosed condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    Active,
    Resolved,
    Inactive,
}

/// A diagnosed condition, identified by a standard terminology code
/// (ICD-10-style). Code matching is by prefix, e.g. "I50" matches "I50.9".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalCondition {
    pub code: String,
    pub description: String,
    pub status: ConditionStatus,
}

impl MedicalCondition {
    pub fn is_active(&self) -> bool {
        self.status == ConditionStatus::Active
    }
}

/// A single laboratory observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResult {
    /// Common lab name, matched case-insensitively (e.g. "creatinine").
    pub name: String,
    pub value: f64,
    pub unit: String,
    pub observed_at: DateTime<Utc>,
}

/// The most recent set of vital signs, all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub temperature_c: Option<f64>,
    pub spo2: Option<f64>,
}

/// Immutable-per-call view of a patient's current clinical state.
///
/// Supplied by the external `SnapshotReader`; owned by the caller. All
/// matcher/scorer/criteria logic reads this and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSnapshot {
    pub patient_id: PatientId,
    pub demographics: Demographics,
    pub allergies: Vec<Allergy>,
    pub medications: Vec<Medication>,
    pub conditions: Vec<MedicalCondition>,
    #[serde(default)]
    pub labs: Vec<LabResult>,
    #[serde(default)]
    pub vitals: VitalSigns,
}

impl PatientSnapshot {
    /// Iterate over medications with `Active` status.
    pub fn active_medications(&self) -> impl Iterator<Item = &Medication> {
        self.medications.iter().filter(|m| m.is_active())
    }

    /// Iterate over conditions with `Active` status.
    pub fn active_conditions(&self) -> impl Iterator<Item = &MedicalCondition> {
        self.conditions.iter().filter(|c| c.is_active())
    }

    /// Iterate over allergies that should participate in safety matching.
    pub fn relevant_allergies(&self) -> impl Iterator<Item = &Allergy> {
        self.allergies.iter().filter(|a| a.is_relevant())
    }

    /// True if any active condition code starts with one of `prefixes`.
    pub fn has_condition(&self, prefixes: &[&str]) -> bool {
        self.active_conditions()
            .any(|c| prefixes.iter().any(|p| c.code.starts_with(p)))
    }

    /// Most recent value of the named lab, matched case-insensitively.
    pub fn lab_value(&self, name: &str) -> Option<f64> {
        let wanted = name.to_lowercase();
        self.labs
            .iter()
            .filter(|l| l.name.to_lowercase() == wanted)
            .max_by_key(|l| l.observed_at)
            .map(|l| l.value)
    }
}

//! Result types produced by the engine's assessment operations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vigil_contracts::alert::Alert;
use vigil_contracts::finding::{AllergyFinding, Contraindication, DrugInteraction};
use vigil_contracts::guideline::{ClinicalGuideline, MeasureEvaluation, Recommendation};
use vigil_contracts::patient::PatientId;
use vigil_contracts::score::RiskScore;

/// Everything a chart-open evaluation produces for one patient.
#[derive(Debug, Clone, Serialize)]
pub struct PatientAssessment {
    pub patient_id: PatientId,
    pub scores: Vec<RiskScore>,
    pub guidelines: Vec<ClinicalGuideline>,
    pub preventive_care: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

impl PatientAssessment {
    /// Scores in the High or VeryHigh band.
    pub fn elevated_scores(&self) -> impl Iterator<Item = &RiskScore> {
        self.scores.iter().filter(|s| s.band.is_elevated())
    }
}

/// The combined safety verdict for one proposed medication.
#[derive(Debug, Clone, Serialize)]
pub struct MedicationSafetyReport {
    pub medication: String,
    /// Known-pair, duplicate-class and high-risk-combination findings,
    /// severity descending.
    pub interactions: Vec<DrugInteraction>,
    pub contraindications: Vec<Contraindication>,
    pub allergy_findings: Vec<AllergyFinding>,
    /// Warnings from applicable guidelines that advise against this
    /// medication.
    pub guideline_warnings: Vec<String>,
    /// Capped sum of interaction severity weights, 0..=100.
    pub risk_score: u32,
}

impl MedicationSafetyReport {
    /// True when no check produced a finding.
    pub fn is_clear(&self) -> bool {
        self.interactions.is_empty()
            && self.contraindications.is_empty()
            && self.allergy_findings.is_empty()
            && self.guideline_warnings.is_empty()
    }
}

/// A patient's assessment together with quality gaps and live alerts.
#[derive(Debug, Clone, Serialize)]
pub struct PatientDashboard {
    pub assessment: PatientAssessment,
    pub quality: Vec<MeasureEvaluation>,
    pub active_alerts: Vec<Alert>,
}

/// Aggregate outcome of a population batch run.
///
/// Per-patient failures are logged and excluded; `patients_assessed`
/// counts successes only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PopulationReport {
    pub patients_requested: usize,
    pub patients_assessed: usize,
    pub high_risk_patients: Vec<PatientId>,
    pub total_care_gaps: usize,
}

//! # vigil-scoring
//!
//! Pure clinical risk-score calculators for the VIGIL CDS engine.
//!
//! Every calculator is a pure function `&PatientSnapshot -> Option<RiskScore>`:
//! `None` means "not computable from this snapshot" and must never be read
//! as zero risk. Point weights and band boundaries follow the published
//! formulas; the snapshot is never mutated.
//!
//! [`all_scores`] is the dispatcher used by the orchestrator: it computes
//! only the scores whose condition-code prerequisites are present, so a
//! patient without atrial fibrillation never receives a CHA2DS2-VASc result
//! even when every input happens to be available.

pub mod cardiac;
pub mod metabolic;
pub mod pulmonary;
pub mod support;

use tracing::debug;

use vigil_contracts::{patient::PatientSnapshot, score::RiskScore};

pub use cardiac::{ascvd, cha2ds2_vasc, framingham, has_bled};
pub use metabolic::{bmi, egfr, meld};
pub use pulmonary::curb65;

use support::codes;

/// Compute the applicable subset of scores for a snapshot.
///
/// Prerequisites:
/// - CHA2DS2-VASc: active atrial fibrillation.
/// - HAS-BLED: atrial fibrillation or an active anticoagulant.
/// - MELD: an active liver-disease condition.
/// - CURB-65: an active pneumonia condition.
/// - ASCVD, Framingham, eGFR, BMI: computed opportunistically whenever
///   their inputs are present.
pub fn all_scores(snapshot: &PatientSnapshot) -> Vec<RiskScore> {
    let mut scores = Vec::new();

    if snapshot.has_condition(codes::ATRIAL_FIBRILLATION) {
        scores.extend(cha2ds2_vasc(snapshot));
    }

    let on_anticoagulant = snapshot.active_medications().any(|m| {
        ["warfarin", "apixaban", "rivaroxaban", "dabigatran", "enoxaparin"]
            .iter()
            .any(|drug| m.name.to_lowercase().contains(drug))
    });
    if snapshot.has_condition(codes::ATRIAL_FIBRILLATION) || on_anticoagulant {
        scores.extend(has_bled(snapshot));
    }

    if snapshot.has_condition(codes::LIVER_DISEASE) {
        scores.extend(meld(snapshot));
    }
    if snapshot.has_condition(codes::PNEUMONIA) {
        scores.extend(curb65(snapshot));
    }

    scores.extend(ascvd(snapshot));
    scores.extend(framingham(snapshot));
    scores.extend(egfr(snapshot));
    scores.extend(bmi(snapshot));

    debug!(
        patient_id = %snapshot.patient_id,
        computed = scores.len(),
        "risk score dispatch complete"
    );
    scores
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use vigil_contracts::patient::{
        ConditionStatus, Demographics, LabResult, MedicalCondition, PatientId, PatientSnapshot,
        Sex, VitalSigns,
    };

    use super::*;

    fn snapshot() -> PatientSnapshot {
        PatientSnapshot {
            patient_id: PatientId::new("pat-test"),
            demographics: Demographics {
                age_years: 72,
                sex: Sex::Female,
                weight_kg: Some(70.0),
                height_cm: Some(160.0),
            },
            allergies: vec![],
            medications: vec![],
            conditions: vec![],
            labs: vec![],
            vitals: VitalSigns::default(),
        }
    }

    fn condition(code: &str) -> MedicalCondition {
        MedicalCondition {
            code: code.to_string(),
            description: code.to_string(),
            status: ConditionStatus::Active,
        }
    }

    fn lab(name: &str, value: f64) -> LabResult {
        LabResult {
            name: name.to_string(),
            value,
            unit: String::new(),
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn dispatcher_skips_meld_without_liver_condition() {
        let mut snap = snapshot();
        // All MELD labs present, but no K7x condition: MELD must not appear.
        snap.labs.push(lab("bilirubin", 2.0));
        snap.labs.push(lab("inr", 1.8));
        snap.labs.push(lab("creatinine", 1.3));

        let scores = all_scores(&snap);
        assert!(scores.iter().all(|s| s.name != "MELD"));
    }

    #[test]
    fn dispatcher_computes_meld_with_liver_condition() {
        let mut snap = snapshot();
        snap.conditions.push(condition("K70.3"));
        snap.labs.push(lab("bilirubin", 2.0));
        snap.labs.push(lab("inr", 1.8));
        snap.labs.push(lab("creatinine", 1.3));

        let scores = all_scores(&snap);
        assert!(scores.iter().any(|s| s.name == "MELD"));
    }

    #[test]
    fn dispatcher_gates_cha2ds2_vasc_on_atrial_fibrillation() {
        let without_af = all_scores(&snapshot());
        assert!(without_af.iter().all(|s| s.name != "CHA2DS2-VASc"));

        let mut snap = snapshot();
        snap.conditions.push(condition("I48.0"));
        let with_af = all_scores(&snap);
        assert!(with_af.iter().any(|s| s.name == "CHA2DS2-VASc"));
        assert!(with_af.iter().any(|s| s.name == "HAS-BLED"));
    }

    #[test]
    fn dispatcher_includes_has_bled_for_anticoagulated_patient() {
        let mut snap = snapshot();
        snap.medications.push(vigil_contracts::patient::Medication {
            name: "Apixaban".to_string(),
            dose: "5 mg".to_string(),
            route: "oral".to_string(),
            frequency: "twice daily".to_string(),
            status: vigil_contracts::patient::MedicationStatus::Active,
        });
        let scores = all_scores(&snap);
        assert!(scores.iter().any(|s| s.name == "HAS-BLED"));
    }

    #[test]
    fn dispatcher_always_includes_bmi_when_measurements_present() {
        let scores = all_scores(&snapshot());
        assert!(scores.iter().any(|s| s.name == "BMI"));
        // No labs: eGFR, ASCVD, Framingham are not computable.
        assert!(scores.iter().all(|s| s.name != "eGFR"));
        assert!(scores.iter().all(|s| s.name != "ASCVD"));
    }
}

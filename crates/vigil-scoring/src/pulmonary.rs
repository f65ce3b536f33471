//! Respiratory scores: CURB-65 pneumonia severity.

use vigil_contracts::{
    patient::PatientSnapshot,
    score::{RiskBand, RiskScore},
};

use crate::support::{codes, FactorTally};

/// CURB-65 community-acquired pneumonia severity.
///
/// One point each: confusion, BUN >19 mg/dL, respiratory rate ≥30,
/// systolic BP <90 or diastolic ≤60, age ≥65.
/// Bands: 0-1 Low (outpatient), 2 Intermediate, 3 High, 4-5 Very High.
///
/// Requires a BUN lab, a respiratory rate, and blood pressure readings;
/// confusion is taken from the condition list (R41-coded disorientation).
pub fn curb65(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let bun = snapshot.lab_value("bun")?;
    let respiratory_rate = snapshot.vitals.respiratory_rate?;
    let systolic = snapshot.vitals.systolic_bp?;
    let diastolic = snapshot.vitals.diastolic_bp?;

    let mut tally = FactorTally::new();
    tally.add_if(
        snapshot.has_condition(codes::CONFUSION),
        "New confusion or disorientation",
        1.0,
    );
    tally.add_if(bun > 19.0, "BUN above 19 mg/dL", 1.0);
    tally.add_if(respiratory_rate >= 30.0, "Respiratory rate 30 or higher", 1.0);
    tally.add_if(
        systolic < 90.0 || diastolic <= 60.0,
        "Hypotension (SBP <90 or DBP ≤60)",
        1.0,
    );
    tally.add_if(snapshot.demographics.age_years >= 65, "Age 65 or older", 1.0);

    let total = tally.points();
    let band = match total as u32 {
        0 | 1 => RiskBand::Low,
        2 => RiskBand::Intermediate,
        3 => RiskBand::High,
        _ => RiskBand::VeryHigh,
    };
    let interpretation = format!(
        "CURB-65 {total:.0}: 0-1 suits outpatient care, 2 consider admission, \
         3 or more warrants hospitalization with severity assessment"
    );
    Some(tally.into_score("CURB-65", band, interpretation, 2))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use vigil_contracts::patient::{
        ConditionStatus, Demographics, LabResult, MedicalCondition, PatientId, PatientSnapshot,
        Sex, VitalSigns,
    };

    use super::*;

    fn pneumonia_snapshot(age: u32) -> PatientSnapshot {
        PatientSnapshot {
            patient_id: PatientId::new("pat-test"),
            demographics: Demographics {
                age_years: age,
                sex: Sex::Male,
                weight_kg: None,
                height_cm: None,
            },
            allergies: vec![],
            medications: vec![],
            conditions: vec![MedicalCondition {
                code: "J18.9".to_string(),
                description: "Pneumonia, unspecified organism".to_string(),
                status: ConditionStatus::Active,
            }],
            labs: vec![LabResult {
                name: "BUN".to_string(),
                value: 24.0,
                unit: "mg/dL".to_string(),
                observed_at: Utc::now(),
            }],
            vitals: VitalSigns {
                systolic_bp: Some(85.0),
                diastolic_bp: Some(55.0),
                respiratory_rate: Some(32.0),
                ..VitalSigns::default()
            },
        }
    }

    #[test]
    fn curb65_elderly_septic_presentation_is_very_high() {
        let score = curb65(&pneumonia_snapshot(80)).unwrap();
        // BUN + RR + hypotension + age = 4.
        assert_eq!(score.points, 4.0);
        assert_eq!(score.band, RiskBand::VeryHigh);
    }

    #[test]
    fn curb65_missing_vitals_is_not_computable() {
        let mut snap = pneumonia_snapshot(80);
        snap.vitals.respiratory_rate = None;
        assert!(curb65(&snap).is_none());
    }

    #[test]
    fn curb65_young_stable_patient_is_low() {
        let mut snap = pneumonia_snapshot(40);
        snap.labs[0].value = 12.0;
        snap.vitals = VitalSigns {
            systolic_bp: Some(118.0),
            diastolic_bp: Some(76.0),
            respiratory_rate: Some(18.0),
            ..VitalSigns::default()
        };
        let score = curb65(&snap).unwrap();
        assert_eq!(score.points, 0.0);
        assert_eq!(score.band, RiskBand::Low);
    }
}

//! Fictional demo patients.
//!
//! All identifiers and clinical details are invented for demonstration.

use chrono::{Duration, Utc};

use vigil_contracts::patient::{
    Allergy, AllergenType, AllergySeverity, AllergyStatus, ConditionStatus, Demographics,
    LabResult, MedicalCondition, Medication, MedicationStatus, PatientId, PatientSnapshot, Sex,
    VerificationStatus, VitalSigns,
};

fn medication(name: &str, dose: &str, frequency: &str) -> Medication {
    Medication {
        name: name.to_string(),
        dose: dose.to_string(),
        route: "oral".to_string(),
        frequency: frequency.to_string(),
        status: MedicationStatus::Active,
    }
}

fn condition(code: &str, description: &str) -> MedicalCondition {
    MedicalCondition {
        code: code.to_string(),
        description: description.to_string(),
        status: ConditionStatus::Active,
    }
}

fn lab(name: &str, value: f64, unit: &str, days_ago: i64) -> LabResult {
    LabResult {
        name: name.to_string(),
        value,
        unit: unit.to_string(),
        observed_at: Utc::now() - Duration::days(days_ago),
    }
}

/// 76-year-old woman with atrial fibrillation on warfarin, severe
/// penicillin allergy.
pub fn af_on_warfarin() -> PatientSnapshot {
    PatientSnapshot {
        patient_id: PatientId::new("pt-1001"),
        demographics: Demographics {
            age_years: 76,
            sex: Sex::Female,
            weight_kg: Some(62.0),
            height_cm: Some(158.0),
        },
        allergies: vec![Allergy {
            allergen: "penicillin".to_string(),
            allergen_type: AllergenType::Drug,
            severity: AllergySeverity::Severe,
            status: AllergyStatus::Active,
            verification: VerificationStatus::Confirmed,
        }],
        medications: vec![
            medication("Warfarin", "5 mg", "daily"),
            medication("Metoprolol", "50 mg", "twice daily"),
        ],
        conditions: vec![
            condition("I48.91", "Atrial fibrillation"),
            condition("I10", "Essential hypertension"),
        ],
        labs: vec![lab("inr", 3.4, "ratio", 2)],
        vitals: VitalSigns {
            systolic_bp: Some(144.0),
            diastolic_bp: Some(82.0),
            heart_rate: Some(74.0),
            ..VitalSigns::default()
        },
    }
}

/// 58-year-old man with poorly controlled type 2 diabetes, no statin.
pub fn diabetic_with_gaps() -> PatientSnapshot {
    PatientSnapshot {
        patient_id: PatientId::new("pt-1002"),
        demographics: Demographics {
            age_years: 58,
            sex: Sex::Male,
            weight_kg: Some(98.0),
            height_cm: Some(176.0),
        },
        allergies: vec![],
        medications: vec![medication("Metformin", "1000 mg", "twice daily")],
        conditions: vec![
            condition("E11.9", "Type 2 diabetes mellitus"),
            condition("I10", "Essential hypertension"),
        ],
        labs: vec![lab("hba1c", 9.8, "%", 30)],
        vitals: VitalSigns {
            systolic_bp: Some(152.0),
            diastolic_bp: Some(94.0),
            ..VitalSigns::default()
        },
    }
}

/// 81-year-old man with heart failure and stage 4 kidney disease on an ACE
/// inhibitor and a loop diuretic. Proposing an NSAID completes the
/// "triple whammy" pattern.
pub fn renal_cardiac() -> PatientSnapshot {
    PatientSnapshot {
        patient_id: PatientId::new("pt-1003"),
        demographics: Demographics {
            age_years: 81,
            sex: Sex::Male,
            weight_kg: Some(70.0),
            height_cm: Some(172.0),
        },
        allergies: vec![],
        medications: vec![
            medication("Lisinopril", "10 mg", "daily"),
            medication("Furosemide", "40 mg", "daily"),
        ],
        conditions: vec![
            condition("I50.9", "Heart failure"),
            condition("N18.4", "Chronic kidney disease, stage 4"),
        ],
        labs: vec![lab("creatinine", 2.6, "mg/dL", 7)],
        vitals: VitalSigns {
            systolic_bp: Some(128.0),
            diastolic_bp: Some(70.0),
            ..VitalSigns::default()
        },
    }
}

/// 67-year-old woman with pneumonia findings, for CURB-65.
pub fn pneumonia() -> PatientSnapshot {
    PatientSnapshot {
        patient_id: PatientId::new("pt-1004"),
        demographics: Demographics {
            age_years: 67,
            sex: Sex::Female,
            weight_kg: Some(66.0),
            height_cm: Some(161.0),
        },
        allergies: vec![Allergy {
            allergen: "sulfa".to_string(),
            allergen_type: AllergenType::Drug,
            severity: AllergySeverity::Moderate,
            status: AllergyStatus::Active,
            verification: VerificationStatus::Unconfirmed,
        }],
        medications: vec![],
        conditions: vec![condition("J18.9", "Community-acquired pneumonia")],
        labs: vec![lab("bun", 24.0, "mg/dL", 0)],
        vitals: VitalSigns {
            systolic_bp: Some(96.0),
            diastolic_bp: Some(58.0),
            respiratory_rate: Some(32.0),
            temperature_c: Some(38.6),
            spo2: Some(91.0),
            ..VitalSigns::default()
        },
    }
}

/// 34-year-old generally healthy man.
pub fn healthy_adult() -> PatientSnapshot {
    PatientSnapshot {
        patient_id: PatientId::new("pt-1005"),
        demographics: Demographics {
            age_years: 34,
            sex: Sex::Male,
            weight_kg: Some(80.0),
            height_cm: Some(183.0),
        },
        allergies: vec![],
        medications: vec![],
        conditions: vec![],
        labs: vec![],
        vitals: VitalSigns {
            systolic_bp: Some(118.0),
            diastolic_bp: Some(74.0),
            ..VitalSigns::default()
        },
    }
}

/// The full demo panel.
pub fn all_patients() -> Vec<PatientSnapshot> {
    vec![
        af_on_warfarin(),
        diabetic_with_gaps(),
        renal_cardiac(),
        pneumonia(),
        healthy_adult(),
    ]
}

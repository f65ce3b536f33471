//! # vigil-contracts
//!
//! Shared clinical data types and contracts for the VIGIL CDS engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod alert;
pub mod error;
pub mod finding;
pub mod guideline;
pub mod hook;
pub mod patient;
pub mod score;

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use alert::{Alert, AlertId, AlertSeverity, AlertType};
    use error::VigilError;
    use finding::{InteractionSeverity, MatchSeverity};
    use patient::{
        Allergy, AllergenType, AllergySeverity, AllergyStatus, ConditionStatus, Demographics,
        LabResult, MedicalCondition, Medication, MedicationStatus, PatientId, PatientSnapshot,
        Sex, VerificationStatus, VitalSigns,
    };

    // ── Fixture helpers ──────────────────────────────────────────────────────

    fn snapshot() -> PatientSnapshot {
        PatientSnapshot {
            patient_id: PatientId::new("pat-001"),
            demographics: Demographics {
                age_years: 70,
                sex: Sex::Female,
                weight_kg: Some(68.0),
                height_cm: Some(162.0),
            },
            allergies: vec![
                Allergy {
                    allergen: "penicillin".to_string(),
                    allergen_type: AllergenType::Drug,
                    severity: AllergySeverity::Severe,
                    status: AllergyStatus::Active,
                    verification: VerificationStatus::Confirmed,
                },
                Allergy {
                    allergen: "latex".to_string(),
                    allergen_type: AllergenType::Environmental,
                    severity: AllergySeverity::Mild,
                    status: AllergyStatus::Active,
                    verification: VerificationStatus::Refuted,
                },
            ],
            medications: vec![
                Medication {
                    name: "Warfarin".to_string(),
                    dose: "5 mg".to_string(),
                    route: "oral".to_string(),
                    frequency: "daily".to_string(),
                    status: MedicationStatus::Active,
                },
                Medication {
                    name: "Ibuprofen".to_string(),
                    dose: "400 mg".to_string(),
                    route: "oral".to_string(),
                    frequency: "prn".to_string(),
                    status: MedicationStatus::Discontinued,
                },
            ],
            conditions: vec![MedicalCondition {
                code: "I50.9".to_string(),
                description: "Heart failure, unspecified".to_string(),
                status: ConditionStatus::Active,
            }],
            labs: vec![
                LabResult {
                    name: "Creatinine".to_string(),
                    value: 1.1,
                    unit: "mg/dL".to_string(),
                    observed_at: Utc::now() - Duration::days(30),
                },
                LabResult {
                    name: "creatinine".to_string(),
                    value: 1.4,
                    unit: "mg/dL".to_string(),
                    observed_at: Utc::now() - Duration::days(1),
                },
            ],
            vitals: VitalSigns::default(),
        }
    }

    // ── Severity orderings ───────────────────────────────────────────────────

    #[test]
    fn interaction_severity_rank_is_strictly_increasing() {
        assert!(InteractionSeverity::Minor.rank() < InteractionSeverity::Moderate.rank());
        assert!(InteractionSeverity::Moderate.rank() < InteractionSeverity::Major.rank());
        assert!(InteractionSeverity::Major.rank() < InteractionSeverity::Contraindicated.rank());
    }

    #[test]
    fn interaction_risk_weights_match_published_table() {
        assert_eq!(InteractionSeverity::Contraindicated.risk_weight(), 10);
        assert_eq!(InteractionSeverity::Major.risk_weight(), 7);
        assert_eq!(InteractionSeverity::Moderate.risk_weight(), 4);
        assert_eq!(InteractionSeverity::Minor.risk_weight(), 1);
    }

    #[test]
    fn alert_severity_critical_outranks_all() {
        assert!(AlertSeverity::Critical.rank() > AlertSeverity::Warning.rank());
        assert!(AlertSeverity::Warning.rank() > AlertSeverity::Info.rank());
    }

    #[test]
    fn match_severity_high_outranks_all() {
        assert!(MatchSeverity::High.rank() > MatchSeverity::Medium.rank());
        assert!(MatchSeverity::Medium.rank() > MatchSeverity::Low.rank());
    }

    // ── Snapshot helpers ─────────────────────────────────────────────────────

    #[test]
    fn active_medications_excludes_discontinued() {
        let snap = snapshot();
        let names: Vec<&str> = snap.active_medications().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Warfarin"]);
    }

    #[test]
    fn relevant_allergies_excludes_refuted() {
        let snap = snapshot();
        let allergens: Vec<&str> = snap.relevant_allergies().map(|a| a.allergen.as_str()).collect();
        assert_eq!(allergens, vec!["penicillin"]);
    }

    #[test]
    fn has_condition_matches_code_prefix() {
        let snap = snapshot();
        assert!(snap.has_condition(&["I50"]));
        assert!(!snap.has_condition(&["E11"]));
    }

    #[test]
    fn lab_value_returns_most_recent_case_insensitively() {
        let snap = snapshot();
        assert_eq!(snap.lab_value("CREATININE"), Some(1.4));
        assert_eq!(snap.lab_value("bilirubin"), None);
    }

    // ── Alert identity ───────────────────────────────────────────────────────

    #[test]
    fn alert_id_new_produces_unique_values() {
        let ids: Vec<AlertId> = (0..100).map(|_| AlertId::new()).collect();
        let unique: std::collections::HashSet<String> =
            ids.iter().map(|id| id.0.to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    #[test]
    fn dedup_key_ignores_severity_and_message() {
        let base = Alert {
            id: AlertId::new(),
            patient_id: PatientId::new("pat-001"),
            alert_type: AlertType::DrugInteraction,
            severity: AlertSeverity::Warning,
            title: "warfarin + aspirin".to_string(),
            message: "bleeding risk".to_string(),
            created_at: Utc::now(),
            source: "drug-interaction-check".to_string(),
            actionable: true,
            dismissal: None,
            related_data: serde_json::Value::Null,
        };
        let mut other = base.clone();
        other.id = AlertId::new();
        other.severity = AlertSeverity::Critical;
        other.message = "different wording".to_string();
        assert_eq!(base.dedup_key(), other.dedup_key());
    }

    // ── Serde round trips ────────────────────────────────────────────────────

    #[test]
    fn snapshot_round_trips_through_json() {
        let original = snapshot();
        let json = serde_json::to_string(&original).unwrap();
        let decoded: PatientSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn snapshot_labs_and_vitals_default_when_absent() {
        let json = serde_json::json!({
            "patient_id": "pat-002",
            "demographics": { "age_years": 40, "sex": "Male", "weight_kg": null, "height_cm": null },
            "allergies": [],
            "medications": [],
            "conditions": []
        });
        let decoded: PatientSnapshot = serde_json::from_value(json).unwrap();
        assert!(decoded.labs.is_empty());
        assert_eq!(decoded.vitals, VitalSigns::default());
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_invalid_request_display() {
        let err = VigilError::InvalidRequest {
            reason: "patient id is empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("invalid request"));
        assert!(msg.contains("patient id is empty"));
    }

    #[test]
    fn error_snapshot_not_found_display() {
        let err = VigilError::SnapshotNotFound {
            patient_id: "pat-404".to_string(),
        };
        assert!(err.to_string().contains("pat-404"));
    }

    #[test]
    fn error_not_computable_display() {
        let err = VigilError::NotComputable {
            what: "MELD".to_string(),
            reason: "missing bilirubin".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MELD"));
        assert!(msg.contains("missing bilirubin"));
    }
}

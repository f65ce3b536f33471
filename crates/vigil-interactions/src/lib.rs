//! # vigil-interactions
//!
//! Drug-drug interaction and contraindication matching.
//!
//! All checks are pure functions over a snapshot and the seeded
//! [`ReferenceData`]; an absent table entry means "no known interaction",
//! never an error. Any remote interaction database is an external
//! collaborator whose results land in an [`cache::InteractionCache`] keyed
//! by the same bidirectional pair key.

pub mod cache;

use tracing::debug;

use vigil_contracts::{
    finding::{Contraindication, DrugInteraction, InteractionKind, InteractionSeverity, Likelihood},
    patient::{Medication, PatientSnapshot},
};
use vigil_reference::{name_matches, ReferenceData};

/// Check a proposed medication against the active medication list.
///
/// For each active medication the bidirectional pair key is looked up in
/// the interaction table; in addition, any active medication from the same
/// therapeutic class (but a different drug) is flagged as a Moderate
/// duplicate-therapy interaction.
pub fn check_interactions(
    proposed: &str,
    active_meds: &[Medication],
    reference: &ReferenceData,
) -> Vec<DrugInteraction> {
    let mut findings = Vec::new();

    for med in active_meds.iter().filter(|m| m.is_active()) {
        if name_matches(&med.name, proposed) {
            // The proposed drug itself; a same-drug duplicate is a
            // prescribing-workflow concern, not an interaction.
            continue;
        }

        if let Some(rule) = reference.interaction(proposed, &med.name) {
            findings.push(DrugInteraction {
                drug_a: proposed.to_string(),
                drug_b: med.name.clone(),
                severity: rule.severity,
                likelihood: rule.likelihood,
                kind: InteractionKind::KnownPair,
                mechanism: rule.mechanism.clone(),
                management: rule.management.clone(),
            });
        }

        for class in reference.classes_of(proposed) {
            if class.members.iter().any(|m| name_matches(&med.name, m)) {
                findings.push(DrugInteraction {
                    drug_a: proposed.to_string(),
                    drug_b: med.name.clone(),
                    severity: InteractionSeverity::Moderate,
                    likelihood: Likelihood::Probable,
                    kind: InteractionKind::DuplicateClass,
                    mechanism: format!("Both agents belong to the {} class", class.name),
                    management: class.duplication_note.clone(),
                });
            }
        }
    }

    debug!(
        proposed,
        findings = findings.len(),
        "interaction check complete"
    );
    sort_by_severity(&mut findings);
    findings
}

/// Flag named multi-drug high-risk patterns on a medication list.
///
/// A pattern fires when every member substring matches some active
/// medication; the finding pairs the first two matched drugs and carries
/// the pattern name in its mechanism.
pub fn check_high_risk_combinations(
    meds: &[Medication],
    reference: &ReferenceData,
) -> Vec<DrugInteraction> {
    let active: Vec<&Medication> = meds.iter().filter(|m| m.is_active()).collect();
    let mut findings = Vec::new();

    for combo in &reference.high_risk_combinations {
        let matched: Vec<&str> = combo
            .members
            .iter()
            .filter_map(|member| {
                active
                    .iter()
                    .find(|m| name_matches(&m.name, member))
                    .map(|m| m.name.as_str())
            })
            .collect();

        if matched.len() == combo.members.len() {
            // A pattern with fewer than two members cannot name a pair.
            let (Some(&drug_a), Some(&drug_b)) = (matched.first(), matched.get(1)) else {
                continue;
            };
            findings.push(DrugInteraction {
                drug_a: drug_a.to_string(),
                drug_b: drug_b.to_string(),
                severity: combo.severity,
                likelihood: Likelihood::Probable,
                kind: InteractionKind::HighRiskCombination,
                mechanism: format!("{} ({})", combo.mechanism, combo.name),
                management: combo.management.clone(),
            });
        }
    }

    sort_by_severity(&mut findings);
    findings
}

/// Check a proposed medication against the patient's active conditions.
pub fn check_contraindications(
    proposed: &str,
    snapshot: &PatientSnapshot,
    reference: &ReferenceData,
) -> Vec<Contraindication> {
    let mut findings = Vec::new();

    for rule in &reference.condition_contraindications {
        if !name_matches(proposed, &rule.medication) {
            continue;
        }
        for condition in snapshot.active_conditions() {
            if condition.code.starts_with(&rule.condition_prefix) {
                findings.push(Contraindication {
                    medication: proposed.to_string(),
                    condition_code: condition.code.clone(),
                    reason: rule.reason.clone(),
                    severity: rule.severity,
                });
            }
        }
    }

    findings.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
    findings
}

/// Sort interactions descending by severity rank.
///
/// The sort is stable: findings of equal severity keep their discovery
/// order.
pub fn sort_by_severity(findings: &mut [DrugInteraction]) {
    findings.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
}

/// A patient's medication risk score: the capped sum of severity weights
/// (Contraindicated 10, Major 7, Moderate 4, Minor 1), maximum 100.
pub fn interaction_risk_score(findings: &[DrugInteraction]) -> u32 {
    findings
        .iter()
        .map(|f| f.severity.risk_weight())
        .sum::<u32>()
        .min(100)
}

#[cfg(test)]
mod tests {
    use vigil_contracts::patient::MedicationStatus;

    use super::*;

    fn med(name: &str) -> Medication {
        Medication {
            name: name.to_string(),
            dose: "1".to_string(),
            route: "oral".to_string(),
            frequency: "daily".to_string(),
            status: MedicationStatus::Active,
        }
    }

    fn discontinued(name: &str) -> Medication {
        Medication {
            status: MedicationStatus::Discontinued,
            ..med(name)
        }
    }

    fn interaction(severity: InteractionSeverity, a: &str, b: &str) -> DrugInteraction {
        DrugInteraction {
            drug_a: a.to_string(),
            drug_b: b.to_string(),
            severity,
            likelihood: Likelihood::Possible,
            kind: InteractionKind::KnownPair,
            mechanism: String::new(),
            management: String::new(),
        }
    }

    // ── Pair lookup ──────────────────────────────────────────────────────────

    #[test]
    fn known_pair_is_found_regardless_of_case_and_order() {
        let reference = ReferenceData::seed();
        let meds = vec![med("Warfarin")];

        let findings = check_interactions("ASPIRIN", &meds, &reference);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, InteractionSeverity::Major);
        assert_eq!(findings[0].kind, InteractionKind::KnownPair);
    }

    #[test]
    fn discontinued_medications_are_ignored() {
        let reference = ReferenceData::seed();
        let meds = vec![discontinued("warfarin")];
        assert!(check_interactions("aspirin", &meds, &reference).is_empty());
    }

    #[test]
    fn unknown_pair_yields_no_finding() {
        let reference = ReferenceData::seed();
        let meds = vec![med("loratadine")];
        assert!(check_interactions("acetaminophen", &meds, &reference).is_empty());
    }

    #[test]
    fn duplicate_class_pair_is_flagged_moderate() {
        let reference = ReferenceData::seed();
        let meds = vec![med("atorvastatin")];

        let findings = check_interactions("rosuvastatin", &meds, &reference);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, InteractionKind::DuplicateClass);
        assert_eq!(findings[0].severity, InteractionSeverity::Moderate);
        assert!(findings[0].mechanism.contains("statins"));
    }

    #[test]
    fn proposing_the_same_drug_is_not_an_interaction() {
        let reference = ReferenceData::seed();
        let meds = vec![med("Warfarin 5mg")];
        assert!(check_interactions("warfarin", &meds, &reference).is_empty());
    }

    // ── High-risk combinations ───────────────────────────────────────────────

    #[test]
    fn single_member_pattern_yields_no_pair_finding() {
        use vigil_reference::HighRiskCombination;

        let mut reference = ReferenceData::seed();
        reference.high_risk_combinations.push(HighRiskCombination {
            name: "lone agent".to_string(),
            members: vec!["amiodarone".to_string()],
            severity: InteractionSeverity::Major,
            mechanism: "not a pair".to_string(),
            management: "n/a".to_string(),
        });

        let meds = vec![med("Amiodarone")];
        assert!(check_high_risk_combinations(&meds, &reference).is_empty());
    }

    #[test]
    fn triple_whammy_requires_all_three_members() {
        let reference = ReferenceData::seed();

        let two = vec![med("lisinopril"), med("furosemide")];
        assert!(check_high_risk_combinations(&two, &reference).is_empty());

        let three = vec![med("lisinopril"), med("furosemide"), med("ibuprofen")];
        let findings = check_high_risk_combinations(&three, &reference);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, InteractionKind::HighRiskCombination);
        assert!(findings[0].mechanism.contains("triple whammy"));
    }

    // ── Contraindications ────────────────────────────────────────────────────

    #[test]
    fn nsaid_is_contraindicated_in_chronic_kidney_disease() {
        use vigil_contracts::patient::{
            ConditionStatus, Demographics, MedicalCondition, PatientId, PatientSnapshot, Sex,
            VitalSigns,
        };

        let reference = ReferenceData::seed();
        let snapshot = PatientSnapshot {
            patient_id: PatientId::new("pat-test"),
            demographics: Demographics {
                age_years: 60,
                sex: Sex::Male,
                weight_kg: None,
                height_cm: None,
            },
            allergies: vec![],
            medications: vec![],
            conditions: vec![MedicalCondition {
                code: "N18.3".to_string(),
                description: "CKD stage 3".to_string(),
                status: ConditionStatus::Active,
            }],
            labs: vec![],
            vitals: VitalSigns::default(),
        };

        let findings = check_contraindications("ibuprofen", &snapshot, &reference);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].condition_code, "N18.3");
        assert_eq!(findings[0].severity, InteractionSeverity::Major);
    }

    // ── Sorting and scoring ──────────────────────────────────────────────────

    #[test]
    fn sort_is_non_increasing_and_stable_within_rank() {
        let mut findings = vec![
            interaction(InteractionSeverity::Minor, "a", "b"),
            interaction(InteractionSeverity::Major, "c", "d"),
            interaction(InteractionSeverity::Moderate, "e", "f"),
            interaction(InteractionSeverity::Major, "g", "h"),
            interaction(InteractionSeverity::Contraindicated, "i", "j"),
        ];
        sort_by_severity(&mut findings);

        let ranks: Vec<u8> = findings.iter().map(|f| f.severity.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] >= w[1]));
        // The two Major findings keep their discovery order: (c,d) before (g,h).
        assert_eq!(findings[1].drug_a, "c");
        assert_eq!(findings[2].drug_a, "g");
    }

    #[test]
    fn risk_score_sums_weights_and_caps_at_one_hundred() {
        let findings: Vec<DrugInteraction> = (0..3)
            .map(|i| interaction(InteractionSeverity::Major, &format!("a{i}"), "b"))
            .collect();
        assert_eq!(interaction_risk_score(&findings), 21);

        let many: Vec<DrugInteraction> = (0..15)
            .map(|i| interaction(InteractionSeverity::Contraindicated, &format!("a{i}"), "b"))
            .collect();
        assert_eq!(interaction_risk_score(&many), 100);
    }
}

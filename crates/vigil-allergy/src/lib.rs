//! # vigil-allergy
//!
//! Allergy safety matching for a proposed medication.
//!
//! For every relevant allergy (active, not refuted), four stages are tried
//! in order: direct name match, cross-reactivity table, shared drug class,
//! and food-drug implication. The first stage that matches produces the
//! finding for that allergy; later stages are skipped so a penicillin
//! allergy challenged with penicillin reports a direct match, not a class
//! match.
//!
//! All findings are returned regardless of strength; the configurable
//! severity threshold is applied by [`escalating`] only when deciding what
//! becomes an alert, so weaker matches stay available for
//! alternative-suggestion ranking.

use tracing::debug;

use vigil_contracts::{
    finding::{AllergyFinding, AllergyMatchKind, Likelihood, MatchSeverity},
    patient::{Allergy, AllergenType, AllergySeverity},
};
use vigil_reference::{name_matches, ReferenceData};

/// Map a documented allergy severity onto a direct-match finding severity.
///
/// Severe and Moderate reactions produce High findings; Mild and Unknown
/// produce Medium. Unknown is treated conservatively: an undocumented
/// reaction severity still clears the default alerting threshold.
fn direct_match_severity(severity: AllergySeverity) -> MatchSeverity {
    match severity {
        AllergySeverity::Severe | AllergySeverity::Moderate => MatchSeverity::High,
        AllergySeverity::Mild | AllergySeverity::Unknown => MatchSeverity::Medium,
    }
}

/// Check a proposed medication against a patient's allergy list.
///
/// Returns all findings sorted High > Medium > Low (stable within rank).
pub fn check_allergies(
    medication: &str,
    allergies: &[Allergy],
    reference: &ReferenceData,
) -> Vec<AllergyFinding> {
    let mut findings = Vec::new();

    for allergy in allergies.iter().filter(|a| a.is_relevant()) {
        if let Some(finding) = match_one(medication, allergy, reference) {
            findings.push(finding);
        }
    }

    findings.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
    debug!(
        medication,
        findings = findings.len(),
        "allergy check complete"
    );
    findings
}

/// Run the four matching stages for a single allergy, first hit wins.
fn match_one(
    medication: &str,
    allergy: &Allergy,
    reference: &ReferenceData,
) -> Option<AllergyFinding> {
    // Stage 1: direct name overlap between drug and allergen.
    if name_matches(medication, &allergy.allergen) {
        return Some(AllergyFinding {
            medication: medication.to_string(),
            allergen: allergy.allergen.clone(),
            kind: AllergyMatchKind::Direct,
            severity: direct_match_severity(allergy.severity),
            likelihood: Likelihood::Established,
            mechanism: format!(
                "Documented allergy to {}; the proposed medication matches the allergen directly",
                allergy.allergen
            ),
        });
    }

    // Stage 2: cross-reactivity table keyed by allergen.
    for rule in &reference.cross_reactivity {
        if name_matches(&allergy.allergen, &rule.allergen)
            && rule
                .cross_reactive_drugs
                .iter()
                .any(|drug| name_matches(medication, drug))
        {
            return Some(AllergyFinding {
                medication: medication.to_string(),
                allergen: allergy.allergen.clone(),
                kind: AllergyMatchKind::CrossReactivity,
                severity: rule.severity,
                likelihood: rule.likelihood,
                mechanism: rule.mechanism.clone(),
            });
        }
    }

    // Stage 3: the allergen and the proposed drug share a drug class.
    for class in reference.classes_of(medication) {
        if class
            .members
            .iter()
            .any(|member| name_matches(&allergy.allergen, member))
        {
            return Some(AllergyFinding {
                medication: medication.to_string(),
                allergen: allergy.allergen.clone(),
                kind: AllergyMatchKind::DrugClass,
                severity: MatchSeverity::Medium,
                likelihood: Likelihood::Possible,
                mechanism: format!(
                    "{} and {} both belong to the {} class",
                    medication, allergy.allergen, class.name
                ),
            });
        }
    }

    // Stage 4: food allergies implicating drugs or diagnostic agents.
    if allergy.allergen_type == AllergenType::Food {
        for rule in &reference.food_drug {
            if name_matches(&allergy.allergen, &rule.food_allergen)
                && rule
                    .implicated_drugs
                    .iter()
                    .any(|drug| name_matches(medication, drug))
            {
                return Some(AllergyFinding {
                    medication: medication.to_string(),
                    allergen: allergy.allergen.clone(),
                    kind: AllergyMatchKind::FoodDrug,
                    severity: rule.severity,
                    likelihood: Likelihood::Possible,
                    mechanism: rule.mechanism.clone(),
                });
            }
        }
    }

    None
}

/// Findings at or above the alerting threshold.
///
/// Suppressed findings are not discarded by callers; they remain in the
/// full result for alternative-suggestion ranking.
pub fn escalating(findings: &[AllergyFinding], threshold: MatchSeverity) -> Vec<&AllergyFinding> {
    findings
        .iter()
        .filter(|f| f.severity.rank() >= threshold.rank())
        .collect()
}

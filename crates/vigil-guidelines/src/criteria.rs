//! Criteria evaluation against a patient snapshot.
//!
//! A criteria list is a logical AND: every criterion must hold for the list
//! to match. An empty list always matches.
//!
//! Numeric kinds (Age, Lab, Vital) parse `value` as a number and apply the
//! comparator (`Eq` when omitted). A criterion whose value does not parse,
//! or whose observation is absent from the snapshot, does not match; the
//! list then fails closed.

use tracing::warn;

use vigil_contracts::patient::{PatientSnapshot, Sex};
use vigil_contracts::guideline::{ClinicalCriterion, Comparator, CriterionKind};
use vigil_reference::name_matches;

/// True if every criterion in `criteria` holds for `snapshot`.
pub fn matches_criteria(criteria: &[ClinicalCriterion], snapshot: &PatientSnapshot) -> bool {
    criteria.iter().all(|c| matches_criterion(c, snapshot))
}

/// True if any criterion in `criteria` holds for `snapshot`.
///
/// Used for quality-measure exclusions, where meeting a single carve-out
/// criterion removes the patient from the eligible population.
pub fn matches_any_criterion(criteria: &[ClinicalCriterion], snapshot: &PatientSnapshot) -> bool {
    criteria.iter().any(|c| matches_criterion(c, snapshot))
}

fn matches_criterion(criterion: &ClinicalCriterion, snapshot: &PatientSnapshot) -> bool {
    match criterion.kind {
        CriterionKind::Age => {
            compare_numeric(criterion, snapshot.demographics.age_years as f64)
        }

        CriterionKind::Gender => {
            let wanted = criterion.value.trim().to_lowercase();
            let actual = match snapshot.demographics.sex {
                Sex::Male => "male",
                Sex::Female => "female",
                Sex::Other => "other",
            };
            wanted == actual
        }

        CriterionKind::Condition => snapshot
            .active_conditions()
            .any(|c| c.code.starts_with(criterion.value.as_str())),

        CriterionKind::Medication => snapshot
            .active_medications()
            .any(|m| name_matches(&m.name, &criterion.value)),

        CriterionKind::Lab => match &criterion.field {
            Some(name) => match snapshot.lab_value(name) {
                Some(observed) => compare_numeric(criterion, observed),
                None => false,
            },
            None => {
                warn!(value = %criterion.value, "lab criterion without a field name never matches");
                false
            }
        },

        // Procedure history is carried on the condition list as
        // procedure-coded entries; status is ignored because a performed
        // procedure stays in the history once resolved.
        CriterionKind::Procedure => snapshot
            .conditions
            .iter()
            .any(|c| c.code.starts_with(criterion.value.as_str())),

        CriterionKind::Vital => match vital_value(criterion.field.as_deref(), snapshot) {
            Some(observed) => compare_numeric(criterion, observed),
            None => false,
        },
    }
}

fn vital_value(field: Option<&str>, snapshot: &PatientSnapshot) -> Option<f64> {
    let vitals = &snapshot.vitals;
    match field? {
        "systolic_bp" => vitals.systolic_bp,
        "diastolic_bp" => vitals.diastolic_bp,
        "heart_rate" => vitals.heart_rate,
        "respiratory_rate" => vitals.respiratory_rate,
        "temperature_c" => vitals.temperature_c,
        "spo2" => vitals.spo2,
        other => {
            warn!(field = other, "unknown vital sign field in criterion");
            None
        }
    }
}

fn compare_numeric(criterion: &ClinicalCriterion, observed: f64) -> bool {
    let threshold: f64 = match criterion.value.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(value = %criterion.value, "numeric criterion value does not parse; treating as unmet");
            return false;
        }
    };

    match criterion.comparator.unwrap_or(Comparator::Eq) {
        Comparator::Eq => (observed - threshold).abs() < f64::EPSILON,
        Comparator::Lt => observed < threshold,
        Comparator::Le => observed <= threshold,
        Comparator::Gt => observed > threshold,
        Comparator::Ge => observed >= threshold,
    }
}

//! # vigil-guidelines
//!
//! Declarative clinical guideline and quality-measure evaluation.
//!
//! [`GuidelineCatalog`] holds guidelines, preventive-care recommendations
//! and quality measures; [`criteria::matches_criteria`] evaluates their
//! applicability criteria against a [`PatientSnapshot`]; and
//! [`measures::evaluate_measure`] runs the denominator/exclusion/numerator
//! pipeline for a single measure.
//!
//! Preventive-care detection is deterministic: a recommendation surfaces
//! exactly when its criteria hold for the snapshot's recorded history.

pub mod criteria;
pub mod measures;

mod catalog;

use tracing::{debug, info};

use vigil_contracts::guideline::{ClinicalGuideline, QualityMeasure, Recommendation};
use vigil_contracts::patient::PatientSnapshot;

use crate::criteria::matches_criteria;

/// In-memory catalog of guideline content.
#[derive(Debug, Clone)]
pub struct GuidelineCatalog {
    guidelines: Vec<ClinicalGuideline>,
    preventive: Vec<Recommendation>,
    measures: Vec<QualityMeasure>,
}

impl GuidelineCatalog {
    /// Build the catalog from the built-in curated content.
    pub fn seed() -> Self {
        let catalog = Self {
            guidelines: catalog::guidelines(),
            preventive: catalog::preventive_recommendations(),
            measures: catalog::quality_measures(),
        };
        info!(
            guidelines = catalog.guidelines.len(),
            preventive = catalog.preventive.len(),
            measures = catalog.measures.len(),
            "guideline catalog seeded"
        );
        catalog
    }

    /// All quality measures in the catalog.
    pub fn measures(&self) -> &[QualityMeasure] {
        &self.measures
    }

    /// Guidelines whose applicability criteria all hold for `snapshot`.
    pub fn applicable_guidelines(&self, snapshot: &PatientSnapshot) -> Vec<&ClinicalGuideline> {
        let applicable: Vec<_> = self
            .guidelines
            .iter()
            .filter(|g| matches_criteria(&g.criteria, snapshot))
            .collect();
        debug!(
            patient = %snapshot.patient_id,
            applicable = applicable.len(),
            "guideline applicability evaluated"
        );
        applicable
    }

    /// Guidelines addressing any of the given condition code prefixes.
    ///
    /// Lookup is by declared condition codes only; applicability criteria
    /// are not evaluated.
    pub fn guidelines_for_conditions(&self, codes: &[&str]) -> Vec<&ClinicalGuideline> {
        self.guidelines
            .iter()
            .filter(|g| {
                g.condition_codes
                    .iter()
                    .any(|gc| codes.iter().any(|c| c.starts_with(gc.as_str())))
            })
            .collect()
    }

    /// Preventive-care recommendations applicable to `snapshot`, highest
    /// priority first.
    pub fn preventive_care(&self, snapshot: &PatientSnapshot) -> Vec<Recommendation> {
        let mut due: Vec<_> = self
            .preventive
            .iter()
            .filter(|r| matches_criteria(&r.criteria, snapshot))
            .cloned()
            .collect();
        due.sort_by(|a, b| b.priority.cmp(&a.priority));
        due
    }

    /// Recommendations from applicable guidelines that address
    /// `condition_code`, each recommendation's own criteria evaluated,
    /// highest priority first.
    pub fn treatment_recommendations(
        &self,
        snapshot: &PatientSnapshot,
        condition_code: &str,
    ) -> Vec<Recommendation> {
        let mut recs: Vec<_> = self
            .guidelines
            .iter()
            .filter(|g| {
                g.condition_codes
                    .iter()
                    .any(|gc| condition_code.starts_with(gc.as_str()))
            })
            .filter(|g| matches_criteria(&g.criteria, snapshot))
            .flat_map(|g| g.recommendations.iter())
            .filter(|r| matches_criteria(&r.criteria, snapshot))
            .cloned()
            .collect();
        recs.sort_by(|a, b| b.priority.cmp(&a.priority));
        recs
    }
}

#[cfg(test)]
mod tests {
    use vigil_contracts::patient::{
        ConditionStatus, Demographics, MedicalCondition, PatientId, Sex, VitalSigns,
    };
    use vigil_contracts::guideline::RecommendationPriority;

    use super::*;

    fn snapshot(age: u32, sex: Sex, condition_codes: &[&str]) -> PatientSnapshot {
        PatientSnapshot {
            patient_id: PatientId::new("pt-gl"),
            demographics: Demographics {
                age_years: age,
                sex,
                weight_kg: None,
                height_cm: None,
            },
            allergies: vec![],
            medications: vec![],
            conditions: condition_codes
                .iter()
                .map(|code| MedicalCondition {
                    code: code.to_string(),
                    description: String::new(),
                    status: ConditionStatus::Active,
                })
                .collect(),
            labs: vec![],
            vitals: VitalSigns::default(),
        }
    }

    #[test]
    fn af_guideline_applies_to_adult_af_patient() {
        let catalog = GuidelineCatalog::seed();
        let s = snapshot(72, Sex::Male, &["I48.91"]);
        let applicable = catalog.applicable_guidelines(&s);
        assert!(applicable.iter().any(|g| g.id == "GL-AF-ANTICOAG"));
    }

    #[test]
    fn guidelines_for_conditions_ignores_applicability() {
        let catalog = GuidelineCatalog::seed();
        let found = catalog.guidelines_for_conditions(&["I50.9"]);
        assert!(found.iter().any(|g| g.id == "GL-HF-GDMT"));
        assert!(catalog.guidelines_for_conditions(&["Z99"]).is_empty());
    }

    #[test]
    fn preventive_care_is_deterministic_for_history() {
        let catalog = GuidelineCatalog::seed();
        let s = snapshot(70, Sex::Female, &[]);

        let first = catalog.preventive_care(&s);
        let second = catalog.preventive_care(&s);
        assert_eq!(first, second);

        let ids: Vec<_> = first.iter().map(|r| r.id.as_str()).collect();
        assert!(ids.contains(&"PREV-FLU"));
        assert!(ids.contains(&"PREV-DEXA"));
        // Age- and sex-gated screening does not apply to a 70-year-old man.
        let male = snapshot(70, Sex::Male, &[]);
        let male_ids: Vec<_> = catalog
            .preventive_care(&male)
            .iter()
            .map(|r| r.id.clone())
            .collect();
        assert!(!male_ids.iter().any(|id| id == "PREV-DEXA"));
    }

    #[test]
    fn treatment_recommendations_respect_per_recommendation_criteria() {
        let catalog = GuidelineCatalog::seed();

        // A 35-year-old diabetic: the statin recommendation is age-gated out.
        let young = snapshot(35, Sex::Male, &["E11.9"]);
        let recs = catalog.treatment_recommendations(&young, "E11.9");
        assert!(recs.iter().any(|r| r.id == "REC-DM-1"));
        assert!(!recs.iter().any(|r| r.id == "REC-DM-2"));

        // At 55 the statin recommendation applies and sorts first.
        let older = snapshot(55, Sex::Male, &["E11.9"]);
        let recs = catalog.treatment_recommendations(&older, "E11.9");
        assert_eq!(recs[0].priority, RecommendationPriority::High);
        assert!(recs.iter().any(|r| r.id == "REC-DM-2"));
    }
}

//! Guideline, recommendation and quality-measure definitions.
//!
//! These are declarative rule structures: a criteria list is a logical AND
//! evaluated against a snapshot. The evaluator lives in vigil-guidelines;
//! only the shapes are defined here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a single criterion inspects on the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionKind {
    Age,
    Gender,
    Condition,
    Medication,
    Lab,
    Procedure,
    Vital,
}

/// Numeric comparison operator for Age/Lab/Vital criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// One leaf of an applicability criteria list.
///
/// Numeric kinds (Age, Lab, Vital) use `comparator` + `value` parsed as a
/// number; Lab and Vital additionally name the observation in `field`.
/// Condition/Procedure match `value` as a code prefix; Medication matches
/// `value` as a case-insensitive name substring; Gender matches `value`
/// against the snapshot sex ("male"/"female"/"other").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalCriterion {
    pub kind: CriterionKind,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub comparator: Option<Comparator>,
    pub value: String,
}

/// Priority of a recommendation when several apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

/// A single actionable recommendation attached to a guideline or emitted
/// for a compliance gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub text: String,
    pub priority: RecommendationPriority,
    /// Applicability: all criteria must hold for the recommendation to apply.
    #[serde(default)]
    pub criteria: Vec<ClinicalCriterion>,
}

/// A published clinical guideline with applicability criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalGuideline {
    pub id: String,
    pub title: String,
    /// Issuing body, e.g. "ACC/AHA".
    pub source: String,
    /// Condition codes (prefixes) this guideline addresses.
    pub condition_codes: Vec<String>,
    /// All criteria must hold for the guideline to be applicable.
    pub criteria: Vec<ClinicalCriterion>,
    pub recommendations: Vec<Recommendation>,
    /// Medication substrings this guideline advises against for its
    /// applicable population.
    #[serde(default)]
    pub contraindicated_medications: Vec<String>,
}

/// The reporting window a quality measure is evaluated within.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A quality measure: denominator, exclusion, and numerator criteria sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMeasure {
    pub id: String,
    pub title: String,
    /// Who the measure applies to.
    pub denominator: Vec<ClinicalCriterion>,
    /// Who is carved out of the eligible population.
    #[serde(default)]
    pub exclusions: Vec<ClinicalCriterion>,
    /// What counts as compliant care.
    pub numerator: Vec<ClinicalCriterion>,
    /// Recommendations surfaced when the numerator is unmet.
    #[serde(default)]
    pub gap_recommendations: Vec<Recommendation>,
    pub reporting_period: ReportingPeriod,
}

/// A compliance gap: eligible patient, numerator not met.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareGap {
    pub description: String,
    /// Sorted highest priority first.
    pub recommendations: Vec<Recommendation>,
    /// min(reporting period end, now + 90 days).
    pub due_date: DateTime<Utc>,
}

/// The outcome of evaluating one measure against one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureEvaluation {
    pub measure_id: String,
    /// Denominator met and not excluded.
    pub eligible: bool,
    /// Meaningful only when `eligible`; an ineligible patient is neither
    /// compliant nor non-compliant.
    pub compliant: bool,
    pub gap: Option<CareGap>,
}

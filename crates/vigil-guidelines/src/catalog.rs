//! Built-in guideline, preventive-care and quality-measure catalog.
//!
//! Content is a small curated set of well-known guideline rules for
//! demonstration and testing. A production deployment would load this from
//! a maintained terminology service; the shapes are identical.

use chrono::{TimeZone, Utc};

use vigil_contracts::guideline::{
    ClinicalCriterion, ClinicalGuideline, Comparator, CriterionKind, QualityMeasure,
    Recommendation, RecommendationPriority, ReportingPeriod,
};

fn condition(prefix: &str) -> ClinicalCriterion {
    ClinicalCriterion {
        kind: CriterionKind::Condition,
        field: None,
        comparator: None,
        value: prefix.to_string(),
    }
}

fn age_at_least(years: u32) -> ClinicalCriterion {
    ClinicalCriterion {
        kind: CriterionKind::Age,
        field: None,
        comparator: Some(Comparator::Ge),
        value: years.to_string(),
    }
}

fn gender(value: &str) -> ClinicalCriterion {
    ClinicalCriterion {
        kind: CriterionKind::Gender,
        field: None,
        comparator: None,
        value: value.to_string(),
    }
}

fn medication(substring: &str) -> ClinicalCriterion {
    ClinicalCriterion {
        kind: CriterionKind::Medication,
        field: None,
        comparator: None,
        value: substring.to_string(),
    }
}

fn lab(name: &str, cmp: Comparator, value: &str) -> ClinicalCriterion {
    ClinicalCriterion {
        kind: CriterionKind::Lab,
        field: Some(name.to_string()),
        comparator: Some(cmp),
        value: value.to_string(),
    }
}

fn vital(name: &str, cmp: Comparator, value: &str) -> ClinicalCriterion {
    ClinicalCriterion {
        kind: CriterionKind::Vital,
        field: Some(name.to_string()),
        comparator: Some(cmp),
        value: value.to_string(),
    }
}

fn recommendation(
    id: &str,
    text: &str,
    priority: RecommendationPriority,
    criteria: Vec<ClinicalCriterion>,
) -> Recommendation {
    Recommendation {
        id: id.to_string(),
        text: text.to_string(),
        priority,
        criteria,
    }
}

pub(crate) fn guidelines() -> Vec<ClinicalGuideline> {
    vec![
        ClinicalGuideline {
            id: "GL-AF-ANTICOAG".to_string(),
            title: "Anticoagulation in atrial fibrillation".to_string(),
            source: "ACC/AHA".to_string(),
            condition_codes: vec!["I48".to_string()],
            criteria: vec![condition("I48"), age_at_least(18)],
            recommendations: vec![
                recommendation(
                    "REC-AF-1",
                    "Assess stroke risk with CHA2DS2-VASc and consider oral anticoagulation",
                    RecommendationPriority::High,
                    vec![],
                ),
                recommendation(
                    "REC-AF-2",
                    "Assess bleeding risk with HAS-BLED before starting anticoagulation",
                    RecommendationPriority::Medium,
                    vec![],
                ),
            ],
            contraindicated_medications: vec![],
        },
        ClinicalGuideline {
            id: "GL-HF-GDMT".to_string(),
            title: "Guideline-directed medical therapy in heart failure".to_string(),
            source: "ACC/AHA/HFSA".to_string(),
            condition_codes: vec!["I50".to_string()],
            criteria: vec![condition("I50")],
            recommendations: vec![
                recommendation(
                    "REC-HF-1",
                    "Initiate an ACE inhibitor or ARB unless contraindicated",
                    RecommendationPriority::High,
                    vec![],
                ),
                recommendation(
                    "REC-HF-2",
                    "Initiate an evidence-based beta blocker once euvolemic",
                    RecommendationPriority::High,
                    vec![],
                ),
            ],
            contraindicated_medications: vec![
                "ibuprofen".to_string(),
                "naproxen".to_string(),
                "diltiazem".to_string(),
            ],
        },
        ClinicalGuideline {
            id: "GL-DM-MGMT".to_string(),
            title: "Type 2 diabetes management".to_string(),
            source: "ADA".to_string(),
            condition_codes: vec!["E11".to_string()],
            criteria: vec![condition("E11")],
            recommendations: vec![
                recommendation(
                    "REC-DM-1",
                    "Check HbA1c at least twice yearly; intensify therapy above individualized target",
                    RecommendationPriority::Medium,
                    vec![],
                ),
                recommendation(
                    "REC-DM-2",
                    "Start moderate-intensity statin therapy",
                    RecommendationPriority::High,
                    vec![age_at_least(40)],
                ),
            ],
            contraindicated_medications: vec![],
        },
        ClinicalGuideline {
            id: "GL-CKD-NSAID".to_string(),
            title: "Nephrotoxin avoidance in chronic kidney disease".to_string(),
            source: "KDIGO".to_string(),
            condition_codes: vec!["N18".to_string()],
            criteria: vec![condition("N18")],
            recommendations: vec![recommendation(
                "REC-CKD-1",
                "Avoid NSAIDs; review renally cleared medication doses against eGFR",
                RecommendationPriority::High,
                vec![],
            )],
            contraindicated_medications: vec![
                "ibuprofen".to_string(),
                "naproxen".to_string(),
                "ketorolac".to_string(),
            ],
        },
        ClinicalGuideline {
            id: "GL-ASTHMA-BB".to_string(),
            title: "Bronchospasm risk in asthma".to_string(),
            source: "GINA".to_string(),
            condition_codes: vec!["J45".to_string()],
            criteria: vec![condition("J45")],
            recommendations: vec![recommendation(
                "REC-ASTHMA-1",
                "Maintain an inhaled corticosteroid controller; avoid non-selective beta blockers",
                RecommendationPriority::Medium,
                vec![],
            )],
            contraindicated_medications: vec!["propranolol".to_string()],
        },
    ]
}

pub(crate) fn preventive_recommendations() -> Vec<Recommendation> {
    vec![
        recommendation(
            "PREV-FLU",
            "Annual influenza vaccination",
            RecommendationPriority::Medium,
            vec![age_at_least(50)],
        ),
        recommendation(
            "PREV-PNEUMO",
            "Pneumococcal vaccination",
            RecommendationPriority::Medium,
            vec![age_at_least(65)],
        ),
        recommendation(
            "PREV-CRC",
            "Colorectal cancer screening",
            RecommendationPriority::Medium,
            vec![age_at_least(45)],
        ),
        recommendation(
            "PREV-DEXA",
            "Bone density screening",
            RecommendationPriority::Medium,
            vec![age_at_least(65), gender("female")],
        ),
        recommendation(
            "PREV-STATIN-DM",
            "Statin therapy for cardiovascular risk reduction in diabetes",
            RecommendationPriority::High,
            vec![age_at_least(40), condition("E11")],
        ),
    ]
}

pub(crate) fn quality_measures() -> Vec<QualityMeasure> {
    let period = ReportingPeriod {
        start: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap(),
    };

    vec![
        QualityMeasure {
            id: "MEAS-DM-A1C".to_string(),
            title: "Diabetes: HbA1c control (< 9%)".to_string(),
            denominator: vec![condition("E11"), age_at_least(18)],
            exclusions: vec![condition("Z51.5")],
            numerator: vec![lab("hba1c", Comparator::Lt, "9.0")],
            gap_recommendations: vec![recommendation(
                "GAP-DM-A1C",
                "Order HbA1c and intensify glycemic therapy if above target",
                RecommendationPriority::High,
                vec![],
            )],
            reporting_period: period.clone(),
        },
        QualityMeasure {
            id: "MEAS-DM-STATIN".to_string(),
            title: "Diabetes: statin therapy".to_string(),
            denominator: vec![condition("E11"), age_at_least(40)],
            exclusions: vec![condition("K7")],
            numerator: vec![medication("statin")],
            gap_recommendations: vec![recommendation(
                "GAP-DM-STATIN",
                "Start moderate-intensity statin therapy",
                RecommendationPriority::High,
                vec![],
            )],
            reporting_period: period.clone(),
        },
        QualityMeasure {
            id: "MEAS-HTN-BP".to_string(),
            title: "Hypertension: blood pressure control (< 140 systolic)".to_string(),
            denominator: vec![condition("I10")],
            exclusions: vec![],
            numerator: vec![vital("systolic_bp", Comparator::Lt, "140")],
            gap_recommendations: vec![
                recommendation(
                    "GAP-HTN-1",
                    "Intensify antihypertensive therapy",
                    RecommendationPriority::High,
                    vec![],
                ),
                recommendation(
                    "GAP-HTN-2",
                    "Arrange home blood pressure monitoring",
                    RecommendationPriority::Medium,
                    vec![],
                ),
            ],
            reporting_period: period,
        },
    ]
}

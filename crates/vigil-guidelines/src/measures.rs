//! Quality-measure evaluation.
//!
//! A measure is evaluated in three steps against a snapshot:
//!
//! 1. Denominator (logical AND): not met → not eligible, stop.
//! 2. Exclusions (any single criterion excludes): met → not eligible, stop.
//! 3. Numerator (logical AND): met → compliant; unmet → a care gap.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use vigil_contracts::guideline::{CareGap, MeasureEvaluation, QualityMeasure};
use vigil_contracts::patient::PatientSnapshot;

use crate::criteria::{matches_any_criterion, matches_criteria};

/// How long after evaluation a gap is due when the reporting period end is
/// further away.
const GAP_GRACE_DAYS: i64 = 90;

/// Evaluate a single quality measure against a snapshot at time `now`.
pub fn evaluate_measure(
    measure: &QualityMeasure,
    snapshot: &PatientSnapshot,
    now: DateTime<Utc>,
) -> MeasureEvaluation {
    if !matches_criteria(&measure.denominator, snapshot) {
        return MeasureEvaluation {
            measure_id: measure.id.clone(),
            eligible: false,
            compliant: false,
            gap: None,
        };
    }

    if matches_any_criterion(&measure.exclusions, snapshot) {
        debug!(measure = %measure.id, patient = %snapshot.patient_id, "excluded from measure");
        return MeasureEvaluation {
            measure_id: measure.id.clone(),
            eligible: false,
            compliant: false,
            gap: None,
        };
    }

    if matches_criteria(&measure.numerator, snapshot) {
        return MeasureEvaluation {
            measure_id: measure.id.clone(),
            eligible: true,
            compliant: true,
            gap: None,
        };
    }

    let mut recommendations: Vec<_> = measure
        .gap_recommendations
        .iter()
        .filter(|r| matches_criteria(&r.criteria, snapshot))
        .cloned()
        .collect();
    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));

    let due_date = measure
        .reporting_period
        .end
        .min(now + Duration::days(GAP_GRACE_DAYS));

    debug!(measure = %measure.id, patient = %snapshot.patient_id, "care gap identified");

    MeasureEvaluation {
        measure_id: measure.id.clone(),
        eligible: true,
        compliant: false,
        gap: Some(CareGap {
            description: format!("{}: recommended care not on record", measure.title),
            recommendations,
            due_date,
        }),
    }
}

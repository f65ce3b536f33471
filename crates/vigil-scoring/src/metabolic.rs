//! Hepatic, renal and anthropometric scores: MELD, eGFR, BMI.

use vigil_contracts::{
    patient::{PatientSnapshot, Sex},
    score::{RiskBand, RiskScore},
};

use crate::support::FactorTally;

/// MELD score for end-stage liver disease severity.
///
/// 3.78·ln(bilirubin) + 11.2·ln(INR) + 9.57·ln(creatinine) + 6.43, with
/// each input clamped to at least 1.0, creatinine capped at 4.0, and the
/// total clamped to 6-40. Requires bilirubin, INR and creatinine labs.
pub fn meld(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let bilirubin = snapshot.lab_value("bilirubin")?.max(1.0);
    let inr = snapshot.lab_value("inr")?.max(1.0);
    let creatinine = snapshot.lab_value("creatinine")?.clamp(1.0, 4.0);

    let raw = 3.78 * bilirubin.ln() + 11.2 * inr.ln() + 9.57 * creatinine.ln() + 6.43;
    let total = raw.round().clamp(6.0, 40.0);

    let mut tally = FactorTally::new();
    tally.add(format!("Bilirubin {bilirubin:.1} mg/dL"), 3.78 * bilirubin.ln());
    tally.add(format!("INR {inr:.1}"), 11.2 * inr.ln());
    tally.add(format!("Creatinine {creatinine:.1} mg/dL"), 9.57 * creatinine.ln());
    tally.add("Model constant", 6.43);

    let band = if total < 10.0 {
        RiskBand::Low
    } else if total < 20.0 {
        RiskBand::Intermediate
    } else if total < 30.0 {
        RiskBand::High
    } else {
        RiskBand::VeryHigh
    };
    let interpretation = format!(
        "MELD {total:.0}: estimates 90-day mortality in chronic liver disease; \
         20 or more warrants transplant evaluation"
    );
    let mut score = tally.into_score("MELD", band, interpretation, 7);
    // Report the clamped published total, not the raw factor sum.
    score.points = total;
    Some(score)
}

/// Simplified CKD-EPI-style estimated glomerular filtration rate.
///
/// Requires a creatinine lab. Bands follow the KDIGO GFR categories:
/// ≥60 Low concern, 30-59 Intermediate, 15-29 High, <15 Very High.
pub fn egfr(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let creatinine = snapshot.lab_value("creatinine")?;
    if creatinine <= 0.0 {
        return None;
    }
    let age = snapshot.demographics.age_years;

    // Simplified estimate: 141 × min(cr/κ,1)^α × 0.993^age × sex factor.
    let (kappa, alpha, sex_factor) = match snapshot.demographics.sex {
        Sex::Female => (0.7, -0.329, 1.018),
        _ => (0.9, -0.411, 1.0),
    };
    let ratio = creatinine / kappa;
    let estimate = 141.0
        * ratio.min(1.0).powf(alpha)
        * ratio.max(1.0).powf(-1.209)
        * 0.993_f64.powi(age as i32)
        * sex_factor;

    let mut tally = FactorTally::new();
    tally.add(format!("Creatinine {creatinine:.2} mg/dL"), 0.0);
    tally.add(format!("Age {age}"), 0.0);
    tally.add(
        format!("Estimated GFR {estimate:.0} mL/min/1.73m²"),
        estimate,
    );

    let band = if estimate >= 60.0 {
        RiskBand::Low
    } else if estimate >= 30.0 {
        RiskBand::Intermediate
    } else if estimate >= 15.0 {
        RiskBand::High
    } else {
        RiskBand::VeryHigh
    };
    let interpretation = format!(
        "eGFR {estimate:.0}: below 60 for three months or more indicates chronic kidney disease; \
         review renally cleared medication doses"
    );
    let mut score = tally.into_score("eGFR", band, interpretation, 30);
    score.points = estimate;
    Some(score)
}

/// Body mass index with WHO weight categories.
///
/// Requires both weight and height in demographics.
pub fn bmi(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let weight_kg = snapshot.demographics.weight_kg?;
    let height_cm = snapshot.demographics.height_cm?;
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }

    let height_m = height_cm / 100.0;
    let value = weight_kg / (height_m * height_m);

    let (category, band) = if value < 18.5 {
        ("Underweight", RiskBand::Intermediate)
    } else if value < 25.0 {
        ("Normal weight", RiskBand::Low)
    } else if value < 30.0 {
        ("Overweight", RiskBand::Intermediate)
    } else if value < 40.0 {
        ("Obese", RiskBand::High)
    } else {
        ("Severely obese", RiskBand::VeryHigh)
    };

    let mut tally = FactorTally::new();
    tally.add(format!("Weight {weight_kg:.1} kg"), 0.0);
    tally.add(format!("Height {height_cm:.0} cm"), 0.0);

    let interpretation = format!("BMI {value:.1}: category {category}");
    let mut score = tally.into_score("BMI", band, interpretation, 90);
    score.points = (value * 10.0).round() / 10.0;
    Some(score)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use vigil_contracts::patient::{
        Demographics, LabResult, PatientId, PatientSnapshot, Sex, VitalSigns,
    };

    use super::*;

    fn snapshot_with_labs(labs: &[(&str, f64)]) -> PatientSnapshot {
        PatientSnapshot {
            patient_id: PatientId::new("pat-test"),
            demographics: Demographics {
                age_years: 58,
                sex: Sex::Male,
                weight_kg: Some(80.0),
                height_cm: Some(175.0),
            },
            allergies: vec![],
            medications: vec![],
            conditions: vec![],
            labs: labs
                .iter()
                .map(|(name, value)| LabResult {
                    name: name.to_string(),
                    value: *value,
                    unit: String::new(),
                    observed_at: Utc::now(),
                })
                .collect(),
            vitals: VitalSigns::default(),
        }
    }

    #[test]
    fn meld_requires_all_three_labs() {
        let partial = snapshot_with_labs(&[("bilirubin", 2.0), ("inr", 1.5)]);
        assert!(meld(&partial).is_none());

        let full = snapshot_with_labs(&[("bilirubin", 2.0), ("inr", 1.5), ("creatinine", 1.2)]);
        let score = meld(&full).expect("computable");
        assert!(score.points >= 6.0 && score.points <= 40.0);
    }

    #[test]
    fn meld_healthy_labs_clamp_to_floor() {
        let snap = snapshot_with_labs(&[("bilirubin", 0.5), ("inr", 0.9), ("creatinine", 0.8)]);
        // All inputs clamp to 1.0, leaving only the constant: rounds to 6.
        let score = meld(&snap).unwrap();
        assert_eq!(score.points, 6.0);
        assert_eq!(score.band, RiskBand::Low);
    }

    #[test]
    fn meld_severe_disease_lands_very_high() {
        let snap = snapshot_with_labs(&[("bilirubin", 12.0), ("inr", 3.5), ("creatinine", 3.0)]);
        let score = meld(&snap).unwrap();
        assert!(score.points >= 30.0);
        assert_eq!(score.band, RiskBand::VeryHigh);
    }

    #[test]
    fn bmi_80kg_175cm_is_overweight() {
        let snap = snapshot_with_labs(&[]);
        let score = bmi(&snap).unwrap();
        assert_eq!(score.points, 26.1);
        assert_eq!(score.band, RiskBand::Intermediate);
        assert!(score.interpretation.contains("Overweight"));
    }

    #[test]
    fn bmi_without_height_is_not_computable() {
        let mut snap = snapshot_with_labs(&[]);
        snap.demographics.height_cm = None;
        assert!(bmi(&snap).is_none());
    }

    #[test]
    fn egfr_normal_creatinine_is_low_risk() {
        let snap = snapshot_with_labs(&[("creatinine", 0.9)]);
        let score = egfr(&snap).unwrap();
        assert!(score.points >= 60.0);
        assert_eq!(score.band, RiskBand::Low);
    }

    #[test]
    fn egfr_high_creatinine_is_elevated_risk() {
        let snap = snapshot_with_labs(&[("creatinine", 3.5)]);
        let score = egfr(&snap).unwrap();
        assert!(score.points < 30.0);
        assert!(score.band.is_elevated());
    }
}

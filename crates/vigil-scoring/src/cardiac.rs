//! Cardiovascular risk scores: CHA2DS2-VASc, HAS-BLED, ASCVD, Framingham.
//!
//! Point weights and band boundaries follow the published formulas. Each
//! calculator is a pure function of the snapshot; when a required input is
//! absent it returns `None` ("not computable"), never a zero-risk result.

use vigil_contracts::{
    patient::{PatientSnapshot, Sex},
    score::{RiskBand, RiskScore},
};

use crate::support::{codes, FactorTally};

/// CHA2DS2-VASc stroke risk in atrial fibrillation.
///
/// +2 age ≥75, +1 age 65-74, +1 each for heart failure, hypertension,
/// diabetes, vascular disease, female sex; +2 prior stroke/TIA.
/// Bands: 0 Low, 1 Intermediate, 2-4 High, ≥5 Very High.
pub fn cha2ds2_vasc(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let mut tally = FactorTally::new();
    let age = snapshot.demographics.age_years;

    if age >= 75 {
        tally.add("Age 75 or older", 2.0);
    } else if age >= 65 {
        tally.add("Age 65-74", 1.0);
    }
    tally.add_if(
        snapshot.has_condition(codes::HEART_FAILURE),
        "Congestive heart failure",
        1.0,
    );
    tally.add_if(
        snapshot.has_condition(codes::HYPERTENSION),
        "Hypertension",
        1.0,
    );
    tally.add_if(snapshot.has_condition(codes::DIABETES), "Diabetes mellitus", 1.0);
    tally.add_if(
        snapshot.has_condition(codes::STROKE_OR_TIA),
        "Prior stroke or TIA",
        2.0,
    );
    tally.add_if(
        snapshot.has_condition(codes::VASCULAR_DISEASE),
        "Vascular disease",
        1.0,
    );
    tally.add_if(snapshot.demographics.sex == Sex::Female, "Female sex", 1.0);

    let total = tally.points();
    let band = match total as u32 {
        0 => RiskBand::Low,
        1 => RiskBand::Intermediate,
        2..=4 => RiskBand::High,
        _ => RiskBand::VeryHigh,
    };
    let interpretation = format!(
        "CHA2DS2-VASc {total:.0}: annual stroke risk rises with each point; \
         anticoagulation is generally recommended at 2 or more"
    );
    Some(tally.into_score("CHA2DS2-VASc", band, interpretation, 365))
}

/// HAS-BLED major-bleeding risk on anticoagulation.
///
/// One point each for uncontrolled hypertension (SBP >160), renal disease,
/// liver disease, stroke history, bleeding history, labile INR (>3.0),
/// age >65, antiplatelet/NSAID use, and alcohol use.
/// Bands: 0-1 Low, 2 Intermediate, 3-4 High, ≥5 Very High.
pub fn has_bled(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let mut tally = FactorTally::new();

    let uncontrolled_htn = snapshot
        .vitals
        .systolic_bp
        .map(|sbp| sbp > 160.0)
        .unwrap_or(false);
    tally.add_if(uncontrolled_htn, "Uncontrolled hypertension (SBP >160)", 1.0);
    tally.add_if(snapshot.has_condition(codes::RENAL_DISEASE), "Renal disease", 1.0);
    tally.add_if(snapshot.has_condition(codes::LIVER_DISEASE), "Liver disease", 1.0);
    tally.add_if(snapshot.has_condition(codes::STROKE_OR_TIA), "Stroke history", 1.0);
    tally.add_if(
        snapshot.has_condition(codes::BLEEDING_HISTORY),
        "Bleeding history or predisposition",
        1.0,
    );
    let labile_inr = snapshot.lab_value("inr").map(|v| v > 3.0).unwrap_or(false);
    tally.add_if(labile_inr, "Labile INR (>3.0)", 1.0);
    tally.add_if(snapshot.demographics.age_years > 65, "Age over 65", 1.0);

    let antiplatelet_or_nsaid = snapshot.active_medications().any(|m| {
        ["aspirin", "clopidogrel", "ibuprofen", "naproxen", "ketorolac"]
            .iter()
            .any(|drug| m.name.to_lowercase().contains(drug))
    });
    tally.add_if(antiplatelet_or_nsaid, "Antiplatelet or NSAID use", 1.0);
    tally.add_if(snapshot.has_condition(codes::ALCOHOL_USE), "Alcohol use", 1.0);

    let total = tally.points();
    let band = match total as u32 {
        0 | 1 => RiskBand::Low,
        2 => RiskBand::Intermediate,
        3 | 4 => RiskBand::High,
        _ => RiskBand::VeryHigh,
    };
    let interpretation = format!(
        "HAS-BLED {total:.0}: scores of 3 or more indicate high bleeding risk; \
         review modifiable factors rather than withholding anticoagulation"
    );
    Some(tally.into_score("HAS-BLED", band, interpretation, 365))
}

/// Simplified ASCVD 10-year risk estimate.
///
/// Requires total cholesterol and HDL labs and a recorded systolic blood
/// pressure, and applies only to ages 40-79 per the pooled cohort model.
pub fn ascvd(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let age = snapshot.demographics.age_years;
    if !(40..=79).contains(&age) {
        return None;
    }
    let total_chol = snapshot.lab_value("total cholesterol")?;
    let hdl = snapshot.lab_value("hdl")?;
    let sbp = snapshot.vitals.systolic_bp?;

    let mut tally = FactorTally::new();
    tally.add(format!("Age {age}"), f64::from((age - 40) / 10 + 1));
    tally.add_if(
        snapshot.demographics.sex == Sex::Male,
        "Male sex",
        1.0,
    );
    tally.add_if(total_chol >= 240.0, "Total cholesterol 240 or higher", 2.0);
    tally.add_if(
        (200.0..240.0).contains(&total_chol),
        "Total cholesterol 200-239",
        1.0,
    );
    tally.add_if(hdl < 40.0, "HDL below 40", 1.0);
    tally.add_if(sbp >= 140.0, "Systolic blood pressure 140 or higher", 2.0);
    tally.add_if(
        (120.0..140.0).contains(&sbp),
        "Systolic blood pressure 120-139",
        1.0,
    );
    tally.add_if(snapshot.has_condition(codes::DIABETES), "Diabetes mellitus", 2.0);
    tally.add_if(snapshot.has_condition(&["F17", "Z72.0"]), "Tobacco use", 2.0);

    let total = tally.points();
    let band = match total as u32 {
        0..=3 => RiskBand::Low,
        4..=6 => RiskBand::Intermediate,
        7..=9 => RiskBand::High,
        _ => RiskBand::VeryHigh,
    };
    let interpretation =
        "Simplified ASCVD point estimate; confirm with the full pooled cohort equations".to_string();
    Some(tally.into_score("ASCVD", band, interpretation, 365))
}

/// Simplified Framingham 10-year coronary heart disease risk.
///
/// Requires total cholesterol and HDL labs; ages 30-79.
pub fn framingham(snapshot: &PatientSnapshot) -> Option<RiskScore> {
    let age = snapshot.demographics.age_years;
    if !(30..=79).contains(&age) {
        return None;
    }
    let total_chol = snapshot.lab_value("total cholesterol")?;
    let hdl = snapshot.lab_value("hdl")?;

    let mut tally = FactorTally::new();
    tally.add(format!("Age {age}"), f64::from(age / 10) - 2.0);
    tally.add_if(snapshot.demographics.sex == Sex::Male, "Male sex", 1.0);
    tally.add_if(total_chol >= 240.0, "Total cholesterol 240 or higher", 2.0);
    tally.add_if(hdl < 40.0, "HDL below 40", 2.0);
    tally.add_if(hdl >= 60.0, "HDL 60 or higher (protective)", -1.0);
    if let Some(sbp) = snapshot.vitals.systolic_bp {
        tally.add_if(sbp >= 140.0, "Systolic blood pressure 140 or higher", 2.0);
    }
    tally.add_if(snapshot.has_condition(codes::DIABETES), "Diabetes mellitus", 2.0);
    tally.add_if(snapshot.has_condition(&["F17", "Z72.0"]), "Tobacco use", 2.0);

    let total = tally.points();
    let band = if total <= 3.0 {
        RiskBand::Low
    } else if total <= 6.0 {
        RiskBand::Intermediate
    } else if total <= 9.0 {
        RiskBand::High
    } else {
        RiskBand::VeryHigh
    };
    let interpretation =
        "Simplified Framingham point estimate; confirm with the full risk equation".to_string();
    Some(tally.into_score("Framingham", band, interpretation, 365))
}

//! Shared helpers for the score calculators.

use chrono::Utc;

use vigil_contracts::score::{RiskBand, RiskScore, ScoreFactor};

/// Condition-code prefixes the calculators and dispatcher agree on.
pub mod codes {
    pub const ATRIAL_FIBRILLATION: &[&str] = &["I48"];
    pub const HEART_FAILURE: &[&str] = &["I50"];
    pub const HYPERTENSION: &[&str] = &["I10", "I11", "I12", "I13", "I15", "I16"];
    pub const DIABETES: &[&str] = &["E10", "E11"];
    pub const VASCULAR_DISEASE: &[&str] = &["I25", "I70", "I73"];
    pub const STROKE_OR_TIA: &[&str] = &["I63", "I69", "G45"];
    pub const LIVER_DISEASE: &[&str] = &["K70", "K71", "K72", "K73", "K74", "K75", "K76", "K77"];
    pub const RENAL_DISEASE: &[&str] = &["N18"];
    pub const BLEEDING_HISTORY: &[&str] = &["D62", "K92"];
    pub const ALCOHOL_USE: &[&str] = &["F10"];
    pub const PNEUMONIA: &[&str] = &["J12", "J13", "J14", "J15", "J16", "J17", "J18"];
    pub const CONFUSION: &[&str] = &["R41"];
}

/// Accumulates contributing factors while a calculator walks its inputs.
#[derive(Debug, Default)]
pub struct FactorTally {
    points: f64,
    factors: Vec<ScoreFactor>,
}

impl FactorTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a contributing factor and its points.
    pub fn add(&mut self, description: impl Into<String>, points: f64) {
        self.points += points;
        self.factors.push(ScoreFactor {
            description: description.into(),
            points,
        });
    }

    /// Record a factor only when `present`.
    pub fn add_if(&mut self, present: bool, description: impl Into<String>, points: f64) {
        if present {
            self.add(description, points);
        }
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    /// Finish the tally into a `RiskScore`.
    pub fn into_score(
        self,
        name: &str,
        band: RiskBand,
        interpretation: impl Into<String>,
        validity_days: u32,
    ) -> RiskScore {
        RiskScore {
            name: name.to_string(),
            points: self.points,
            band,
            interpretation: interpretation.into(),
            factors: self.factors,
            calculated_at: Utc::now(),
            validity_days,
        }
    }
}

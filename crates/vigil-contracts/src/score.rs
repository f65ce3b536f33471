//! Risk score result types.
//!
//! Scores are derived values: recomputed on demand from a snapshot and
//! never persisted by the engine. A calculator that cannot find its
//! required inputs returns `None` ("not computable"), which callers must
//! never treat as zero risk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinical risk bucket a score total falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Intermediate,
    High,
    VeryHigh,
}

impl RiskBand {
    /// True for the bands that should raise an alert during assessment.
    pub fn is_elevated(self) -> bool {
        matches!(self, RiskBand::High | RiskBand::VeryHigh)
    }
}

/// One contributing factor in a score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub description: String,
    pub points: f64,
}

/// A computed clinical risk score with its interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Published score name, e.g. "CHA2DS2-VASc".
    pub name: String,
    pub points: f64,
    pub band: RiskBand,
    pub interpretation: String,
    pub factors: Vec<ScoreFactor>,
    pub calculated_at: DateTime<Utc>,
    /// How long the result stays clinically meaningful.
    pub validity_days: u32,
}

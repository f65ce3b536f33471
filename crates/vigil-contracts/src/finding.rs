//! Matcher findings: the outputs of the interaction, contraindication and
//! allergy modules, before they are converted into alerts.

use serde::{Deserialize, Serialize};

/// Severity of a drug-drug interaction, ordered `Contraindicated` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

impl InteractionSeverity {
    /// Ordering rank: Contraindicated(4) > Major(3) > Moderate(2) > Minor(1).
    pub fn rank(self) -> u8 {
        match self {
            InteractionSeverity::Minor => 1,
            InteractionSeverity::Moderate => 2,
            InteractionSeverity::Major => 3,
            InteractionSeverity::Contraindicated => 4,
        }
    }

    /// Weight contributed to a patient's medication risk score.
    pub fn risk_weight(self) -> u32 {
        match self {
            InteractionSeverity::Minor => 1,
            InteractionSeverity::Moderate => 4,
            InteractionSeverity::Major => 7,
            InteractionSeverity::Contraindicated => 10,
        }
    }
}

/// How likely the interaction is to manifest clinically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Likelihood {
    Theoretical,
    Possible,
    Probable,
    Established,
}

/// How an interaction finding was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Bidirectional pair lookup hit in the interaction table.
    KnownPair,
    /// Two different drugs from the same therapeutic class.
    DuplicateClass,
    /// A named multi-drug high-risk pattern.
    HighRiskCombination,
}

/// A drug-drug interaction finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugInteraction {
    pub drug_a: String,
    pub drug_b: String,
    pub severity: InteractionSeverity,
    pub likelihood: Likelihood,
    pub kind: InteractionKind,
    pub mechanism: String,
    pub management: String,
}

/// A medication contraindicated by an active condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contraindication {
    pub medication: String,
    pub condition_code: String,
    pub reason: String,
    pub severity: InteractionSeverity,
}

/// Strength of an allergy match, ordered `High` highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchSeverity {
    Low,
    Medium,
    High,
}

impl MatchSeverity {
    pub fn rank(self) -> u8 {
        match self {
            MatchSeverity::Low => 1,
            MatchSeverity::Medium => 2,
            MatchSeverity::High => 3,
        }
    }
}

/// Which matching stage produced an allergy finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllergyMatchKind {
    /// Drug name and allergen name overlap directly.
    Direct,
    /// The allergen implies elevated reaction risk to a structurally
    /// related drug.
    CrossReactivity,
    /// Drug and allergen belong to the same drug class.
    DrugClass,
    /// A food allergy implicating a drug or agent (e.g. shellfish and
    /// iodinated contrast).
    FoodDrug,
}

/// An allergy-based safety finding for a proposed medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergyFinding {
    pub medication: String,
    pub allergen: String,
    pub kind: AllergyMatchKind,
    pub severity: MatchSeverity,
    pub likelihood: Likelihood,
    pub mechanism: String,
}

//! # vigil-reference
//!
//! Static clinical reference data for the VIGIL CDS engine.
//!
//! All tables in this crate are hardcoded, curated stand-ins for a real
//! clinical knowledge base. They are seeded once at engine start via
//! [`ReferenceData::seed`] and treated as immutable for the process
//! lifetime; a deployment backed by an external terminology service would
//! re-seed on start and hold everything behind the same `Arc`.
//!
//! Matching semantics: drug and allergen identity is case-insensitive
//! substring containment, not a coded (RxNorm) lookup. That approximation
//! is centralized in [`name_matches`] so a coded identity can replace it at
//! one seam.

pub mod tables;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use vigil_contracts::finding::{InteractionSeverity, Likelihood};

/// True if `name` and `candidate` refer to the same drug or allergen under
/// the engine's name-based identity: either lowercased string contains the
/// other.
pub fn name_matches(name: &str, candidate: &str) -> bool {
    let a = name.trim().to_lowercase();
    let b = candidate.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// Order-independent lookup key for a drug pair: sorted, lowercased,
/// joined with `|`.
pub fn pair_key(drug_a: &str, drug_b: &str) -> String {
    let a = drug_a.trim().to_lowercase();
    let b = drug_b.trim().to_lowercase();
    if a <= b {
        format!("{a}|{b}")
    } else {
        format!("{b}|{a}")
    }
}

/// One entry in the drug-drug interaction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRule {
    pub severity: InteractionSeverity,
    pub likelihood: Likelihood,
    pub mechanism: String,
    pub management: String,
}

/// A named multi-drug pattern (all members present ⇒ finding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighRiskCombination {
    pub name: String,
    /// Name substrings; every one must match some active medication.
    pub members: Vec<String>,
    pub severity: InteractionSeverity,
    pub mechanism: String,
    pub management: String,
}

/// A therapeutic drug class and its member name substrings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugClass {
    pub name: String,
    pub members: Vec<String>,
    /// Shown when two different members appear on the same medication list.
    pub duplication_note: String,
}

/// Cross-reactivity from a recorded allergen to structurally related drugs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossReactivityRule {
    /// Allergen name substring this rule is keyed by.
    pub allergen: String,
    pub cross_reactive_drugs: Vec<String>,
    pub severity: vigil_contracts::finding::MatchSeverity,
    pub likelihood: Likelihood,
    pub mechanism: String,
}

/// A food allergen implicating a drug or diagnostic agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDrugRule {
    pub food_allergen: String,
    pub implicated_drugs: Vec<String>,
    pub severity: vigil_contracts::finding::MatchSeverity,
    pub mechanism: String,
}

/// A medication contraindicated in the presence of a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionContraindication {
    /// Medication name substring.
    pub medication: String,
    /// ICD-10-style code prefix.
    pub condition_prefix: String,
    pub reason: String,
    pub severity: InteractionSeverity,
}

/// The full read-only reference data set, seeded once at engine start.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    /// Dataset version, carried into logs and alert payloads.
    pub version: String,
    /// Keyed by [`pair_key`].
    pub interactions: HashMap<String, InteractionRule>,
    pub high_risk_combinations: Vec<HighRiskCombination>,
    pub drug_classes: Vec<DrugClass>,
    pub cross_reactivity: Vec<CrossReactivityRule>,
    pub food_drug: Vec<FoodDrugRule>,
    pub condition_contraindications: Vec<ConditionContraindication>,
}

impl ReferenceData {
    /// Build the built-in reference data set.
    pub fn seed() -> Self {
        let data = Self {
            version: tables::DATASET_VERSION.to_string(),
            interactions: tables::interaction_table(),
            high_risk_combinations: tables::high_risk_combinations(),
            drug_classes: tables::drug_classes(),
            cross_reactivity: tables::cross_reactivity_rules(),
            food_drug: tables::food_drug_rules(),
            condition_contraindications: tables::condition_contraindications(),
        };
        info!(
            version = %data.version,
            interactions = data.interactions.len(),
            drug_classes = data.drug_classes.len(),
            cross_reactivity = data.cross_reactivity.len(),
            "reference data seeded"
        );
        data
    }

    /// Look up an interaction rule for a drug pair, order-independently.
    pub fn interaction(&self, drug_a: &str, drug_b: &str) -> Option<&InteractionRule> {
        self.interactions.get(&pair_key(drug_a, drug_b))
    }

    /// All classes a medication name belongs to.
    pub fn classes_of(&self, medication: &str) -> Vec<&DrugClass> {
        self.drug_classes
            .iter()
            .filter(|c| c.members.iter().any(|m| name_matches(medication, m)))
            .collect()
    }
}

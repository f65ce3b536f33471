//! The built-in reference tables.
//!
//! All entries are curated, fictional-deployment-scale stand-ins for a real
//! clinical knowledge base: large enough to exercise every matching path,
//! far too small for production use. Severities and mechanisms follow
//! commonly published interaction references.

use std::collections::HashMap;

use vigil_contracts::finding::{InteractionSeverity, Likelihood, MatchSeverity};

use crate::{
    pair_key, ConditionContraindication, CrossReactivityRule, DrugClass, FoodDrugRule,
    HighRiskCombination, InteractionRule,
};

/// Version string for the built-in dataset.
pub const DATASET_VERSION: &str = "vigil-builtin-2026.1";

/// The drug-drug interaction table, keyed by [`pair_key`].
pub fn interaction_table() -> HashMap<String, InteractionRule> {
    let entries: Vec<(&str, &str, InteractionSeverity, Likelihood, &str, &str)> = vec![
        (
            "warfarin",
            "aspirin",
            InteractionSeverity::Major,
            Likelihood::Established,
            "Additive anticoagulant and antiplatelet effects increase bleeding risk via distinct pathways",
            "Avoid concurrent use; if clinically necessary, monitor INR weekly and watch for signs of bleeding",
        ),
        (
            "warfarin",
            "ibuprofen",
            InteractionSeverity::Major,
            Likelihood::Established,
            "NSAIDs impair platelet function and can displace warfarin from protein binding",
            "Prefer acetaminophen for analgesia; if unavoidable, add gastroprotection and monitor INR",
        ),
        (
            "warfarin",
            "fluconazole",
            InteractionSeverity::Major,
            Likelihood::Established,
            "CYP2C9 inhibition markedly raises warfarin exposure",
            "Reduce warfarin dose empirically and recheck INR within 3 to 5 days",
        ),
        (
            "warfarin",
            "amiodarone",
            InteractionSeverity::Major,
            Likelihood::Established,
            "Amiodarone inhibits warfarin metabolism, raising INR over weeks",
            "Reduce warfarin dose by 30 to 50 percent at initiation and monitor INR closely",
        ),
        (
            "lisinopril",
            "spironolactone",
            InteractionSeverity::Moderate,
            Likelihood::Probable,
            "Dual suppression of the renin-angiotensin-aldosterone axis reduces potassium excretion",
            "Monitor serum potassium within 1 week of starting or adjusting either agent",
        ),
        (
            "lisinopril",
            "potassium chloride",
            InteractionSeverity::Moderate,
            Likelihood::Probable,
            "ACE inhibitors reduce aldosterone secretion, decreasing potassium excretion",
            "Avoid potassium supplements unless deficiency is confirmed; recheck potassium after any change",
        ),
        (
            "simvastatin",
            "clarithromycin",
            InteractionSeverity::Contraindicated,
            Likelihood::Established,
            "Strong CYP3A4 inhibition raises statin exposure and rhabdomyolysis risk",
            "Hold simvastatin for the duration of clarithromycin therapy or choose a non-interacting antibiotic",
        ),
        (
            "simvastatin",
            "amlodipine",
            InteractionSeverity::Moderate,
            Likelihood::Probable,
            "Moderate CYP3A4 inhibition increases simvastatin exposure",
            "Cap simvastatin at 20 mg daily while co-prescribed with amlodipine",
        ),
        (
            "sertraline",
            "tramadol",
            InteractionSeverity::Major,
            Likelihood::Probable,
            "Additive serotonergic activity risks serotonin syndrome and lowers seizure threshold",
            "Prefer a non-serotonergic analgesic; if combined, counsel on early serotonin syndrome symptoms",
        ),
        (
            "methotrexate",
            "trimethoprim-sulfamethoxazole",
            InteractionSeverity::Contraindicated,
            Likelihood::Established,
            "Both agents inhibit folate metabolism; the combination risks severe myelosuppression",
            "Avoid the combination; choose an alternative antibiotic",
        ),
        (
            "digoxin",
            "amiodarone",
            InteractionSeverity::Major,
            Likelihood::Established,
            "Amiodarone reduces renal and non-renal digoxin clearance",
            "Halve the digoxin dose at amiodarone initiation and follow levels",
        ),
        (
            "metformin",
            "iodinated contrast",
            InteractionSeverity::Major,
            Likelihood::Possible,
            "Contrast-induced kidney injury impairs metformin clearance and risks lactic acidosis",
            "Withhold metformin 48 hours before and after contrast; recheck renal function before resuming",
        ),
        (
            "clopidogrel",
            "omeprazole",
            InteractionSeverity::Moderate,
            Likelihood::Probable,
            "CYP2C19 inhibition reduces conversion of clopidogrel to its active metabolite",
            "Prefer pantoprazole when acid suppression is required",
        ),
        (
            "lithium",
            "ibuprofen",
            InteractionSeverity::Major,
            Likelihood::Established,
            "NSAIDs reduce renal lithium clearance, raising serum levels",
            "Avoid NSAIDs; if required, recheck lithium level within 4 to 7 days",
        ),
        (
            "amoxicillin",
            "ibuprofen",
            InteractionSeverity::Minor,
            Likelihood::Theoretical,
            "NSAIDs may slightly reduce renal clearance of amoxicillin at high doses",
            "No routine action; monitor efficacy in renal impairment",
        ),
    ];

    entries
        .into_iter()
        .map(|(a, b, severity, likelihood, mechanism, management)| {
            (
                pair_key(a, b),
                InteractionRule {
                    severity,
                    likelihood,
                    mechanism: mechanism.to_string(),
                    management: management.to_string(),
                },
            )
        })
        .collect()
}

/// Named multi-drug high-risk patterns.
pub fn high_risk_combinations() -> Vec<HighRiskCombination> {
    vec![
        HighRiskCombination {
            name: "triple whammy".to_string(),
            members: vec![
                "lisinopril".to_string(),
                "furosemide".to_string(),
                "ibuprofen".to_string(),
            ],
            severity: InteractionSeverity::Major,
            mechanism: "ACE inhibitor plus diuretic plus NSAID jointly compromise renal perfusion"
                .to_string(),
            management: "Stop the NSAID or arrange close renal function monitoring".to_string(),
        },
        HighRiskCombination {
            name: "opioid-benzodiazepine co-prescription".to_string(),
            members: vec!["oxycodone".to_string(), "diazepam".to_string()],
            severity: InteractionSeverity::Major,
            mechanism: "Additive central nervous system and respiratory depression".to_string(),
            management: "Avoid co-prescription; if unavoidable, use lowest doses and counsel on overdose signs"
                .to_string(),
        },
        HighRiskCombination {
            name: "dual antiplatelet plus anticoagulant".to_string(),
            members: vec![
                "aspirin".to_string(),
                "clopidogrel".to_string(),
                "warfarin".to_string(),
            ],
            severity: InteractionSeverity::Contraindicated,
            mechanism: "Triple antithrombotic therapy carries a very high major-bleeding rate".to_string(),
            management: "Re-evaluate indications; triple therapy should be time-limited and specialist-led"
                .to_string(),
        },
    ]
}

/// Therapeutic class tables used for duplicate-therapy and allergy class
/// matching.
pub fn drug_classes() -> Vec<DrugClass> {
    let classes: Vec<(&str, Vec<&str>, &str)> = vec![
        (
            "beta-lactam antibiotics",
            vec!["penicillin", "amoxicillin", "ampicillin", "piperacillin", "cephalexin", "ceftriaxone", "cefazolin"],
            "Multiple beta-lactams rarely indicated together; review for therapeutic duplication",
        ),
        (
            "sulfonamides",
            vec!["sulfamethoxazole", "trimethoprim-sulfamethoxazole", "sulfasalazine", "sulfadiazine"],
            "Multiple sulfonamides increase hypersensitivity and crystalluria risk",
        ),
        (
            "NSAIDs",
            vec!["ibuprofen", "naproxen", "ketorolac", "diclofenac", "celecoxib", "indomethacin", "aspirin"],
            "Multiple NSAIDs increase gastrointestinal bleeding and renal impairment risk",
        ),
        (
            "statins",
            vec!["atorvastatin", "simvastatin", "rosuvastatin", "pravastatin", "lovastatin"],
            "Combination statin therapy is not recommended",
        ),
        (
            "ACE inhibitors",
            vec!["lisinopril", "enalapril", "ramipril", "captopril", "benazepril"],
            "Multiple ACE inhibitors provide no added benefit and raise hyperkalemia risk",
        ),
        (
            "beta blockers",
            vec!["metoprolol", "atenolol", "carvedilol", "bisoprolol", "propranolol"],
            "Multiple beta blockers risk bradycardia and hypotension",
        ),
        (
            "proton pump inhibitors",
            vec!["omeprazole", "pantoprazole", "esomeprazole", "lansoprazole"],
            "Generally only one proton pump inhibitor is needed",
        ),
        (
            "benzodiazepines",
            vec!["diazepam", "lorazepam", "alprazolam", "clonazepam", "midazolam"],
            "Multiple benzodiazepines increase sedation and fall risk",
        ),
        (
            "opioids",
            vec!["oxycodone", "morphine", "hydromorphone", "fentanyl", "tramadol", "codeine"],
            "Multiple opioids require review for appropriateness and overdose risk",
        ),
        (
            "anticoagulants",
            vec!["warfarin", "apixaban", "rivaroxaban", "dabigatran", "enoxaparin"],
            "Multiple anticoagulants sharply increase major bleeding risk",
        ),
    ];

    classes
        .into_iter()
        .map(|(name, members, note)| DrugClass {
            name: name.to_string(),
            members: members.into_iter().map(str::to_string).collect(),
            duplication_note: note.to_string(),
        })
        .collect()
}

/// Allergen-to-drug cross-reactivity rules, keyed by allergen substring.
pub fn cross_reactivity_rules() -> Vec<CrossReactivityRule> {
    vec![
        CrossReactivityRule {
            allergen: "penicillin".to_string(),
            cross_reactive_drugs: vec![
                "amoxicillin".to_string(),
                "ampicillin".to_string(),
                "piperacillin".to_string(),
                "cephalexin".to_string(),
                "cefazolin".to_string(),
            ],
            severity: MatchSeverity::High,
            likelihood: Likelihood::Probable,
            mechanism: "Shared beta-lactam ring; IgE raised against penicillin can recognize related beta-lactams"
                .to_string(),
        },
        CrossReactivityRule {
            allergen: "sulfa".to_string(),
            cross_reactive_drugs: vec![
                "sulfamethoxazole".to_string(),
                "trimethoprim-sulfamethoxazole".to_string(),
                "sulfasalazine".to_string(),
            ],
            severity: MatchSeverity::High,
            likelihood: Likelihood::Probable,
            mechanism: "Shared arylamine sulfonamide group drives hypersensitivity cross-reactivity".to_string(),
        },
        CrossReactivityRule {
            allergen: "aspirin".to_string(),
            cross_reactive_drugs: vec![
                "ibuprofen".to_string(),
                "naproxen".to_string(),
                "ketorolac".to_string(),
                "diclofenac".to_string(),
            ],
            severity: MatchSeverity::Medium,
            likelihood: Likelihood::Probable,
            mechanism: "COX-1 inhibition class effect; aspirin-exacerbated respiratory disease reacts to most NSAIDs"
                .to_string(),
        },
        CrossReactivityRule {
            allergen: "codeine".to_string(),
            cross_reactive_drugs: vec!["morphine".to_string(), "hydromorphone".to_string()],
            severity: MatchSeverity::Medium,
            likelihood: Likelihood::Possible,
            mechanism: "Shared phenanthrene opioid backbone".to_string(),
        },
    ]
}

/// Food-allergen-to-drug implications, applied only to Food-type allergies.
pub fn food_drug_rules() -> Vec<FoodDrugRule> {
    vec![
        FoodDrugRule {
            food_allergen: "shellfish".to_string(),
            implicated_drugs: vec!["iodinated contrast".to_string()],
            severity: MatchSeverity::Medium,
            mechanism: "Historically linked via iodine; modern evidence shows independent hypersensitivity, still flagged for review"
                .to_string(),
        },
        FoodDrugRule {
            food_allergen: "egg".to_string(),
            implicated_drugs: vec!["propofol".to_string(), "influenza vaccine".to_string()],
            severity: MatchSeverity::Medium,
            mechanism: "Formulations contain egg lecithin or are egg-culture derived".to_string(),
        },
        FoodDrugRule {
            food_allergen: "soy".to_string(),
            implicated_drugs: vec!["propofol".to_string()],
            severity: MatchSeverity::Low,
            mechanism: "Lipid emulsion contains soybean oil".to_string(),
        },
        FoodDrugRule {
            food_allergen: "gelatin".to_string(),
            implicated_drugs: vec!["zoster vaccine".to_string(), "mmr vaccine".to_string()],
            severity: MatchSeverity::Medium,
            mechanism: "Gelatin is used as a vaccine stabilizer".to_string(),
        },
    ]
}

/// Medication-condition contraindication table.
pub fn condition_contraindications() -> Vec<ConditionContraindication> {
    let entries: Vec<(&str, &str, &str, InteractionSeverity)> = vec![
        (
            "ibuprofen",
            "N18",
            "NSAIDs worsen chronic kidney disease",
            InteractionSeverity::Major,
        ),
        (
            "naproxen",
            "N18",
            "NSAIDs worsen chronic kidney disease",
            InteractionSeverity::Major,
        ),
        (
            "ibuprofen",
            "K25",
            "NSAIDs risk re-bleeding in peptic ulcer disease",
            InteractionSeverity::Major,
        ),
        (
            "ibuprofen",
            "I50",
            "NSAIDs cause fluid retention and can decompensate heart failure",
            InteractionSeverity::Moderate,
        ),
        (
            "metformin",
            "N18.4",
            "Metformin accumulates in severe renal impairment, risking lactic acidosis",
            InteractionSeverity::Contraindicated,
        ),
        (
            "metformin",
            "N18.5",
            "Metformin is contraindicated in end-stage renal disease",
            InteractionSeverity::Contraindicated,
        ),
        (
            "propranolol",
            "J45",
            "Non-selective beta blockade can provoke bronchospasm in asthma",
            InteractionSeverity::Major,
        ),
        (
            "glyburide",
            "N18",
            "Sulfonylurea accumulation in renal impairment risks prolonged hypoglycemia",
            InteractionSeverity::Moderate,
        ),
        (
            "nitrofurantoin",
            "N18",
            "Ineffective and potentially toxic at reduced glomerular filtration",
            InteractionSeverity::Major,
        ),
        (
            "diazepam",
            "K70",
            "Benzodiazepine accumulation in hepatic impairment deepens encephalopathy",
            InteractionSeverity::Major,
        ),
    ];

    entries
        .into_iter()
        .map(|(medication, prefix, reason, severity)| ConditionContraindication {
            medication: medication.to_string(),
            condition_prefix: prefix.to_string(),
            reason: reason.to_string(),
            severity,
        })
        .collect()
}

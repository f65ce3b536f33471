//! Demo scenarios, each driving the engine the way a calling workflow
//! would: hooks for point-of-care checks, direct operations for dashboards
//! and batch runs.

use vigil_contracts::error::VigilResult;
use vigil_contracts::hook::{HookRequest, HookType};
use vigil_contracts::patient::PatientId;

use vigil_engine::CdsEngine;

use crate::patients;

/// Prescribe-time safety checks for two patients.
pub async fn medication_safety(engine: &CdsEngine) -> VigilResult<()> {
    println!("=== Scenario: Medication Safety at Prescribe Time ===");
    println!();

    run_prescribe(engine, "pt-1003", "ibuprofen", "81M, heart failure + stage 4 CKD, on lisinopril and furosemide").await?;
    run_prescribe(engine, "pt-1001", "amoxicillin", "76F, severe penicillin allergy").await?;

    println!("  Scenario complete.");
    println!();
    Ok(())
}

async fn run_prescribe(
    engine: &CdsEngine,
    patient: &str,
    medication: &str,
    description: &str,
) -> VigilResult<()> {
    println!("  Proposing {} for {} ({})", medication, patient, description);

    let response = engine
        .process_hook(HookRequest {
            hook_type: HookType::MedicationPrescribe,
            patient_id: PatientId::new(patient),
            context: serde_json::json!({ "medication": medication }),
        })
        .await;

    if response.cards.is_empty() {
        println!("    No safety findings.");
    }
    for card in &response.cards {
        println!("    [{:?}] {}", card.severity, card.summary);
        if let Some(detail) = &card.detail {
            println!("             {}", detail);
        }
    }
    println!();
    Ok(())
}

/// Chart-open assessment and dashboard for the atrial fibrillation patient.
pub async fn assess(engine: &CdsEngine) -> VigilResult<()> {
    println!("=== Scenario: Patient Assessment ===");
    println!();

    let patient_id = PatientId::new("pt-1001");
    let dashboard = engine.patient_dashboard(&patient_id).await?;

    println!("  Patient {} (76F, atrial fibrillation on warfarin)", patient_id);
    println!();
    println!("  Risk scores:");
    for score in &dashboard.assessment.scores {
        println!(
            "    {:<14} {:>5.1} points  [{:?}] {}",
            score.name, score.points, score.band, score.interpretation
        );
    }
    println!();
    println!("  Applicable guidelines:");
    for guideline in &dashboard.assessment.guidelines {
        println!("    {} ({})", guideline.title, guideline.source);
    }
    println!();
    println!("  Preventive care due:");
    for recommendation in &dashboard.assessment.preventive_care {
        println!("    [{:?}] {}", recommendation.priority, recommendation.text);
    }
    println!();
    println!("  Active alerts: {}", dashboard.active_alerts.len());
    for alert in &dashboard.active_alerts {
        println!("    [{:?}] {}", alert.severity, alert.title);
    }
    println!();
    println!("  Scenario complete.");
    println!();
    Ok(())
}

/// Quality-measure evaluation for the diabetic patient.
pub async fn quality_gaps(engine: &CdsEngine) -> VigilResult<()> {
    println!("=== Scenario: Quality Measure Gaps ===");
    println!();

    let snapshot = patients::diabetic_with_gaps();
    println!(
        "  Patient {} (58M, type 2 diabetes, HbA1c 9.8%, no statin)",
        snapshot.patient_id
    );
    println!();

    let evaluations = engine.analyze_quality_gaps(&snapshot).await?;
    for evaluation in &evaluations {
        let state = match (evaluation.eligible, evaluation.compliant) {
            (false, _) => "not eligible",
            (true, true) => "compliant",
            (true, false) => "GAP",
        };
        println!("    {:<16} {}", evaluation.measure_id, state);
        if let Some(gap) = &evaluation.gap {
            println!("      {}", gap.description);
            println!("      due by {}", gap.due_date.format("%Y-%m-%d"));
            for recommendation in &gap.recommendations {
                println!("      -> {}", recommendation.text);
            }
        }
    }
    println!();
    println!("  Scenario complete.");
    println!();
    Ok(())
}

/// Batch assessment across the whole demo panel plus one unknown patient.
pub async fn population(engine: &CdsEngine) -> VigilResult<()> {
    println!("=== Scenario: Population Assessment ===");
    println!();

    let mut panel: Vec<PatientId> = patients::all_patients()
        .into_iter()
        .map(|s| s.patient_id)
        .collect();
    // One id with no snapshot, to show per-patient failure isolation.
    panel.push(PatientId::new("pt-9999"));

    let report = engine.assess_population(&panel).await;
    println!("  Patients requested: {}", report.patients_requested);
    println!("  Patients assessed:  {}", report.patients_assessed);
    println!("  High-risk patients:");
    for patient in &report.high_risk_patients {
        println!("    {}", patient);
    }
    println!("  Open care gaps:     {}", report.total_care_gaps);
    println!();
    println!("  Scenario complete.");
    println!();
    Ok(())
}

//! VIGIL Clinical Decision Support — Demo CLI
//!
//! Runs one or all of the demo scenarios against an in-memory panel of
//! fictional patients. Each scenario uses real VIGIL components (reference
//! data, scoring, matchers, guideline catalog, alert service) behind the
//! assembled engine.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- medication-safety
//!   cargo run -p demo -- assess
//!   cargo run -p demo -- quality-gaps
//!   cargo run -p demo -- population

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vigil_alerts::SubscriptionFilter;
use vigil_contracts::error::VigilResult;
use vigil_engine::{CdsEngine, EngineConfig, StaticSnapshotReader};

mod patients;
mod scenarios;

// ── CLI definition ────────────────────────────────────────────────────────────

/// VIGIL — clinical decision support demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "VIGIL clinical decision support demo",
    long_about = "Runs VIGIL demo scenarios showing medication safety checks,\n\
                  risk scoring, guideline evaluation, quality gaps, and the\n\
                  alert lifecycle."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every scenario in sequence.
    RunAll,
    /// Prescribe-time interaction, allergy and contraindication checks.
    MedicationSafety,
    /// Chart-open assessment and dashboard for one patient.
    Assess,
    /// Quality-measure evaluation and care gaps.
    QualityGaps,
    /// Batch assessment across the demo panel.
    Population,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Structured logging; set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let reader = StaticSnapshotReader::with_patients(patients::all_patients());
    let engine = CdsEngine::new(EngineConfig::default(), Arc::new(reader));

    // Console watcher: print every alert the engine raises, as a
    // downstream notification consumer would receive it.
    let subscribed = engine.alerts().subscribe(
        SubscriptionFilter::default(),
        Box::new(|alert| {
            println!(
                "      [notify] {:?}/{:?} for {}: {}",
                alert.alert_type, alert.severity, alert.patient_id, alert.title
            );
            Ok(())
        }),
    );
    if let Err(e) = subscribed {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }

    let result = run(&cli.command, &engine).await;

    if let Err(e) = engine.shutdown().await {
        eprintln!("Demo error during shutdown: {}", e);
        std::process::exit(1);
    }

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run(command: &Command, engine: &CdsEngine) -> VigilResult<()> {
    match command {
        Command::RunAll => {
            scenarios::medication_safety(engine).await?;
            scenarios::assess(engine).await?;
            scenarios::quality_gaps(engine).await?;
            scenarios::population(engine).await?;
            Ok(())
        }
        Command::MedicationSafety => scenarios::medication_safety(engine).await,
        Command::Assess => scenarios::assess(engine).await,
        Command::QualityGaps => scenarios::quality_gaps(engine).await,
        Command::Population => scenarios::population(engine).await,
    }
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("VIGIL — Clinical Decision Support Engine");
    println!("Demo Panel");
    println!("========================================");
    println!();
    println!("Checks run at each point of care:");
    println!("  [1] Drug-drug interactions, duplicate therapy, high-risk combinations");
    println!("  [2] Allergy and cross-reactivity matching");
    println!("  [3] Condition contraindications");
    println!("  [4] Risk scores (CHA2DS2-VASc, HAS-BLED, MELD, CURB-65, ...)");
    println!("  [5] Guideline recommendations and quality-measure gaps");
    println!("  Findings dedup into the alert queue; subscribers are notified.");
    println!();
}

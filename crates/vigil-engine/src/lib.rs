//! # vigil-engine
//!
//! The orchestration layer of the VIGIL clinical decision support engine.
//!
//! `CdsEngine` composes the matcher and evaluator crates behind two
//! surfaces: the hook entry point (`process_hook`, which never fails
//! structurally) and the assessment operations (`assess_patient`,
//! `check_medication_safety`, `analyze_quality_gaps`, `patient_dashboard`,
//! `assess_population`). Patient data arrives through the `SnapshotReader`
//! seam; generated findings leave through the alert service.

pub mod config;
pub mod engine;
pub mod reader;
pub mod reports;

pub use config::{CategoryToggles, EngineConfig};
pub use engine::CdsEngine;
pub use reader::{SnapshotReader, StaticSnapshotReader};
pub use reports::{
    MedicationSafetyReport, PatientAssessment, PatientDashboard, PopulationReport,
};

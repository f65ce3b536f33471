//! Error types for the VIGIL CDS engine.
//!
//! All fallible operations across the VIGIL crates return `VigilResult<T>`.
//! Variants carry enough context to produce a useful log line and a degraded
//! (but structurally valid) response for the calling workflow.
//!
//! Missing clinical inputs are deliberately NOT an error: score calculators
//! and measure evaluators return `Option`/"not applicable" results instead.
//! `NotComputable` exists for callers that must explain an absence upstream.

use thiserror::Error;

/// The unified error type for the VIGIL CDS engine.
#[derive(Debug, Error)]
pub enum VigilError {
    /// A request is missing a required identifier or carries one that is
    /// empty. Rejected before any snapshot or reference-data lookup.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The clinical record repository has no snapshot for this patient.
    #[error("no clinical snapshot found for patient '{patient_id}'")]
    SnapshotNotFound { patient_id: String },

    /// The clinical record repository could not be reached.
    ///
    /// Treated as retryable by the caller; the engine never retries
    /// internally.
    #[error("clinical snapshot unavailable: {reason}")]
    SnapshotUnavailable { reason: String },

    /// The interaction/cross-reactivity reference data could not be loaded
    /// or is internally inconsistent.
    #[error("reference data error: {reason}")]
    ReferenceData { reason: String },

    /// A derived value could not be produced from the available snapshot.
    #[error("'{what}' is not computable: {reason}")]
    NotComputable { what: String, reason: String },

    /// The alert service has shut down and can no longer accept work.
    #[error("alert service stopped: {reason}")]
    ServiceStopped { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the VIGIL crates.
pub type VigilResult<T> = Result<T, VigilError>;

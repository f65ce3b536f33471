//! Hook request/response contract.
//!
//! A hook is the engine's inbound surface: a calling workflow names the
//! point of care it is at and the patient in context, and receives a list
//! of presentation-neutral cards. No wire format is mandated here; HTTP or
//! message framing belongs to the calling layer.

use serde::{Deserialize, Serialize};

use crate::{alert::AlertSeverity, patient::PatientId};

/// The point-of-care event that triggered the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HookType {
    /// A patient chart was opened.
    PatientView,
    /// A clinician is about to prescribe a medication.
    MedicationPrescribe,
    /// An order is being selected.
    OrderSelect,
}

/// An inbound hook invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookRequest {
    pub hook_type: HookType,
    pub patient_id: PatientId,
    /// Hook-specific context, e.g. the proposed medication for
    /// `MedicationPrescribe` under the key "medication".
    #[serde(default)]
    pub context: serde_json::Value,
}

/// A presentation-neutral recommendation unit.
///
/// Cards summarize an alert or recommendation for display by the calling
/// layer. They carry no lifecycle; the corresponding `Alert` (if any) is
/// managed separately by the alert service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub summary: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub severity: AlertSeverity,
    /// Which module produced the card.
    pub source: String,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    /// Reasons a clinician may select to override the recommendation.
    #[serde(default)]
    pub override_reasons: Vec<String>,
}

/// The full hook result: always structurally valid, possibly empty or a
/// single fallback advisory when processing failed internally.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookResponse {
    pub cards: Vec<Card>,
}

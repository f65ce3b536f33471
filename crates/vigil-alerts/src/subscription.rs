//! Alert subscriptions.
//!
//! A subscriber registers a filter and a callback; the drain task invokes
//! the callback for every newly admitted alert the filter matches. An empty
//! filter list means match-all for that dimension.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vigil_contracts::alert::{Alert, AlertSeverity, AlertType};
use vigil_contracts::error::VigilResult;
use vigil_contracts::patient::PatientId;

/// Unique handle for a registered subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which alerts a subscriber wants. Every populated dimension must match;
/// an empty list matches everything in that dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionFilter {
    #[serde(default)]
    pub alert_types: Vec<AlertType>,
    #[serde(default)]
    pub severities: Vec<AlertSeverity>,
    #[serde(default)]
    pub patient_ids: Vec<PatientId>,
}

impl SubscriptionFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        let type_ok = self.alert_types.is_empty() || self.alert_types.contains(&alert.alert_type);
        let severity_ok = self.severities.is_empty() || self.severities.contains(&alert.severity);
        let patient_ok =
            self.patient_ids.is_empty() || self.patient_ids.contains(&alert.patient_id);
        type_ok && severity_ok && patient_ok
    }
}

/// Callback invoked for each matching alert. Errors are logged by the
/// notifier and never abort delivery to other subscribers.
pub type AlertCallback = Box<dyn Fn(&Alert) -> VigilResult<()> + Send + Sync>;

pub(crate) struct Subscription {
    pub(crate) id: SubscriptionId,
    pub(crate) filter: SubscriptionFilter,
    pub(crate) callback: AlertCallback,
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vigil_contracts::alert::AlertId;

    use super::*;

    fn alert(patient: &str, alert_type: AlertType, severity: AlertSeverity) -> Alert {
        Alert {
            id: AlertId::new(),
            patient_id: PatientId::new(patient),
            alert_type,
            severity,
            title: "t".to_string(),
            message: "m".to_string(),
            created_at: Utc::now(),
            source: "test".to_string(),
            actionable: false,
            dismissal: None,
            related_data: serde_json::Value::Null,
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = SubscriptionFilter::default();
        assert!(filter.matches(&alert("pt-1", AlertType::Allergy, AlertSeverity::Info)));
        assert!(filter.matches(&alert("pt-2", AlertType::RiskScore, AlertSeverity::Critical)));
    }

    #[test]
    fn populated_dimensions_all_constrain() {
        let filter = SubscriptionFilter {
            alert_types: vec![AlertType::DrugInteraction],
            severities: vec![AlertSeverity::Critical],
            patient_ids: vec![PatientId::new("pt-1")],
        };

        assert!(filter.matches(&alert("pt-1", AlertType::DrugInteraction, AlertSeverity::Critical)));
        assert!(!filter.matches(&alert("pt-2", AlertType::DrugInteraction, AlertSeverity::Critical)));
        assert!(!filter.matches(&alert("pt-1", AlertType::Allergy, AlertSeverity::Critical)));
        assert!(!filter.matches(&alert("pt-1", AlertType::DrugInteraction, AlertSeverity::Info)));
    }
}

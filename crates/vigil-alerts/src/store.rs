//! The alert state machine.
//!
//! `AlertStore` is a pure, synchronous container: every operation takes the
//! current time explicitly, so unit tests control the clock. The async
//! service in `service` owns a store behind `Arc<Mutex<_>>` and supplies
//! wall-clock time.
//!
//! Lifecycle invariant: an admitted alert is in exactly one of {active,
//! history}. History entries carry dismissal metadata and are never
//! modified again.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use vigil_contracts::alert::{Alert, AlertId, AlertSeverity, AlertType, Dismissal};
use vigil_contracts::patient::PatientId;

/// Dismissal reason recorded by the expiry sweep.
pub const EXPIRY_REASON: &str = "Auto-dismissed due to age";

/// Actor recorded on sweep dismissals.
const SYSTEM_ACTOR: &str = "system";

/// Dedup window and per-type maximum ages for the expiry sweep.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// A same-key alert created within this window of an existing active
    /// one is a duplicate.
    pub dedup_window: Duration,
    /// Max age for DrugInteraction, Allergy and Contraindication alerts.
    pub medication_safety_max_age: Duration,
    /// Max age for RiskScore alerts.
    pub risk_score_max_age: Duration,
    /// Max age for Guideline and QualityMeasure alerts.
    pub guideline_max_age: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            dedup_window: Duration::hours(1),
            medication_safety_max_age: Duration::hours(24),
            risk_score_max_age: Duration::days(7),
            guideline_max_age: Duration::days(30),
        }
    }
}

impl RetentionPolicy {
    /// Maximum active age for an alert of the given type.
    pub fn max_age(&self, alert_type: AlertType) -> Duration {
        match alert_type {
            AlertType::DrugInteraction | AlertType::Allergy | AlertType::Contraindication => {
                self.medication_safety_max_age
            }
            AlertType::RiskScore => self.risk_score_max_age,
            AlertType::Guideline | AlertType::QualityMeasure => self.guideline_max_age,
        }
    }
}

/// Outcome of admitting an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Duplicate,
}

/// Aggregate view over a time range, computed from the store.
#[derive(Debug, Clone, Default)]
pub struct AlertStatistics {
    /// Alerts created within the range (active + history).
    pub total_raised: usize,
    pub by_type: HashMap<AlertType, usize>,
    pub by_severity: HashMap<AlertSeverity, usize>,
    /// Fraction of raised alerts that reached history, 0.0 when none raised.
    pub dismissal_rate: f64,
    /// Mean minutes from creation to dismissal, `None` when nothing was
    /// dismissed in the range.
    pub mean_minutes_to_dismissal: Option<f64>,
    /// Most frequent dismissal reasons, count descending, at most three.
    pub top_dismissal_reasons: Vec<(String, usize)>,
}

/// Active alerts plus an immutable dismissal history.
#[derive(Debug, Default)]
pub struct AlertStore {
    policy: RetentionPolicy,
    active: Vec<Alert>,
    history: Vec<Alert>,
}

impl AlertStore {
    pub fn new(policy: RetentionPolicy) -> Self {
        Self {
            policy,
            active: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Admit an alert at time `now`.
    ///
    /// Duplicate iff an active alert with the same patient + type + title
    /// was created within the dedup window. Dismissed alerts never block
    /// re-raising.
    pub fn admit(&mut self, alert: Alert, now: DateTime<Utc>) -> Admission {
        let key = alert.dedup_key();
        let duplicate = self.active.iter().any(|existing| {
            existing.dedup_key() == key && now - existing.created_at < self.policy.dedup_window
        });

        if duplicate {
            debug!(patient = %alert.patient_id, title = %alert.title, "duplicate alert suppressed");
            return Admission::Duplicate;
        }

        self.active.push(alert);
        Admission::Accepted
    }

    /// Dismiss an active alert, moving it to history.
    ///
    /// Returns false (history untouched) when the id is not active.
    pub fn dismiss(
        &mut self,
        id: &AlertId,
        dismissed_by: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(pos) = self.active.iter().position(|a| &a.id == id) else {
            return false;
        };

        let mut alert = self.active.swap_remove(pos);
        alert.dismissal = Some(Dismissal {
            dismissed_by: dismissed_by.to_string(),
            dismissed_at: now,
            reason,
        });
        self.history.push(alert);
        true
    }

    /// Auto-dismiss active alerts older than their type's maximum age.
    ///
    /// Returns the number of alerts expired.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let policy = self.policy.clone();
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active)
            .into_iter()
            .partition(|a| now - a.created_at > policy.max_age(a.alert_type));

        self.active = kept;
        let count = expired.len();
        for mut alert in expired {
            alert.dismissal = Some(Dismissal {
                dismissed_by: SYSTEM_ACTOR.to_string(),
                dismissed_at: now,
                reason: Some(EXPIRY_REASON.to_string()),
            });
            self.history.push(alert);
        }
        count
    }

    /// Active alerts for a patient, severity descending, then most recent
    /// first.
    pub fn active_for_patient(&self, patient_id: &PatientId) -> Vec<Alert> {
        let mut alerts: Vec<_> = self
            .active
            .iter()
            .filter(|a| &a.patient_id == patient_id)
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            b.severity
                .rank()
                .cmp(&a.severity.rank())
                .then(b.created_at.cmp(&a.created_at))
        });
        alerts
    }

    /// All active alerts, unordered.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Aggregate statistics over alerts created in `range`, or over
    /// everything ever recorded when `range` is `None`.
    pub fn statistics(&self, range: Option<(DateTime<Utc>, DateTime<Utc>)>) -> AlertStatistics {
        let in_range = |a: &&Alert| match range {
            Some((start, end)) => a.created_at >= start && a.created_at <= end,
            None => true,
        };
        let raised: Vec<&Alert> = self
            .active
            .iter()
            .filter(in_range)
            .chain(self.history.iter().filter(in_range))
            .collect();

        let mut stats = AlertStatistics {
            total_raised: raised.len(),
            ..AlertStatistics::default()
        };
        if raised.is_empty() {
            return stats;
        }

        let mut reasons: HashMap<String, usize> = HashMap::new();
        let mut dismissed = 0usize;
        let mut minutes_to_dismissal = 0.0f64;

        for alert in &raised {
            *stats.by_type.entry(alert.alert_type).or_default() += 1;
            *stats.by_severity.entry(alert.severity).or_default() += 1;

            if let Some(dismissal) = &alert.dismissal {
                dismissed += 1;
                minutes_to_dismissal +=
                    (dismissal.dismissed_at - alert.created_at).num_seconds() as f64 / 60.0;
                if let Some(reason) = &dismissal.reason {
                    *reasons.entry(reason.clone()).or_default() += 1;
                }
            }
        }

        stats.dismissal_rate = dismissed as f64 / raised.len() as f64;
        if dismissed > 0 {
            stats.mean_minutes_to_dismissal = Some(minutes_to_dismissal / dismissed as f64);
        }

        let mut top: Vec<_> = reasons.into_iter().collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        top.truncate(3);
        stats.top_dismissal_reasons = top;

        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn alert(
        patient: &str,
        alert_type: AlertType,
        severity: AlertSeverity,
        title: &str,
        created_at: DateTime<Utc>,
    ) -> Alert {
        Alert {
            id: AlertId::new(),
            patient_id: PatientId::new(patient),
            alert_type,
            severity,
            title: title.to_string(),
            message: format!("details for {}", title),
            created_at,
            source: "test".to_string(),
            actionable: true,
            dismissal: None,
            related_data: serde_json::Value::Null,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn same_key_within_window_is_duplicate() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();

        let first = alert("pt-1", AlertType::DrugInteraction, AlertSeverity::Critical, "warfarin + aspirin", now);
        assert_eq!(store.admit(first, now), Admission::Accepted);

        let again = alert("pt-1", AlertType::DrugInteraction, AlertSeverity::Critical, "warfarin + aspirin", now + Duration::minutes(30));
        assert_eq!(store.admit(again, now + Duration::minutes(30)), Admission::Duplicate);

        // Outside the window the same key is accepted again.
        let later = alert("pt-1", AlertType::DrugInteraction, AlertSeverity::Critical, "warfarin + aspirin", now + Duration::hours(2));
        assert_eq!(store.admit(later, now + Duration::hours(2)), Admission::Accepted);
    }

    #[test]
    fn dedup_key_excludes_severity_and_patient_separates() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();

        store.admit(alert("pt-1", AlertType::Allergy, AlertSeverity::Critical, "penicillin", now), now);
        // Different patient, same type + title: not a duplicate.
        assert_eq!(
            store.admit(alert("pt-2", AlertType::Allergy, AlertSeverity::Critical, "penicillin", now), now),
            Admission::Accepted
        );
        // Same key with different severity: still a duplicate.
        assert_eq!(
            store.admit(alert("pt-1", AlertType::Allergy, AlertSeverity::Info, "penicillin", now), now),
            Admission::Duplicate
        );
    }

    #[test]
    fn dismissal_unblocks_the_dedup_key() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();

        let a = alert("pt-1", AlertType::RiskScore, AlertSeverity::Warning, "CHA2DS2-VASc elevated", now);
        let id = a.id.clone();
        store.admit(a, now);
        assert!(store.dismiss(&id, "dr-grey", Some("reviewed".to_string()), now + Duration::minutes(5)));

        let again = alert("pt-1", AlertType::RiskScore, AlertSeverity::Warning, "CHA2DS2-VASc elevated", now + Duration::minutes(10));
        assert_eq!(store.admit(again, now + Duration::minutes(10)), Admission::Accepted);
    }

    #[test]
    fn dismissing_unknown_id_returns_false_and_leaves_history_untouched() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();
        store.admit(alert("pt-1", AlertType::Guideline, AlertSeverity::Info, "gdmt", now), now);

        assert!(!store.dismiss(&AlertId::new(), "dr-grey", None, now));
        let stats = store.statistics(Some((now - Duration::hours(1), now + Duration::hours(1))));
        assert_eq!(stats.dismissal_rate, 0.0);
    }

    #[test]
    fn sweep_expires_by_type_with_the_expiry_reason() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();

        store.admit(alert("pt-1", AlertType::DrugInteraction, AlertSeverity::Critical, "old interaction", now - Duration::hours(30)), now - Duration::hours(30));
        store.admit(alert("pt-1", AlertType::RiskScore, AlertSeverity::Warning, "recent score", now - Duration::days(2)), now - Duration::days(2));
        store.admit(alert("pt-1", AlertType::QualityMeasure, AlertSeverity::Info, "old gap", now - Duration::days(40)), now - Duration::days(40));

        // 24 h type and 30 d type have aged out; the 7 d type has not.
        assert_eq!(store.sweep(now), 2);
        assert_eq!(store.active_count(), 1);

        let stats = store.statistics(Some((now - Duration::days(60), now)));
        assert_eq!(stats.top_dismissal_reasons[0].0, EXPIRY_REASON);
        assert_eq!(stats.top_dismissal_reasons[0].1, 2);
    }

    #[test]
    fn active_for_patient_sorts_severity_then_recency() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();

        store.admit(alert("pt-1", AlertType::Guideline, AlertSeverity::Info, "a", now - Duration::minutes(3)), now);
        store.admit(alert("pt-1", AlertType::DrugInteraction, AlertSeverity::Critical, "b", now - Duration::minutes(2)), now);
        store.admit(alert("pt-1", AlertType::Allergy, AlertSeverity::Critical, "c", now - Duration::minutes(1)), now);
        store.admit(alert("pt-2", AlertType::Allergy, AlertSeverity::Critical, "other patient", now), now);

        let alerts = store.active_for_patient(&PatientId::new("pt-1"));
        assert_eq!(alerts.len(), 3);
        assert_eq!(alerts[0].title, "c");
        assert_eq!(alerts[1].title, "b");
        assert_eq!(alerts[2].title, "a");
    }

    #[test]
    fn statistics_counts_and_rates() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();

        let a = alert("pt-1", AlertType::Allergy, AlertSeverity::Critical, "one", now);
        let id = a.id.clone();
        store.admit(a, now);
        store.admit(alert("pt-1", AlertType::Allergy, AlertSeverity::Warning, "two", now), now);
        store.dismiss(&id, "dr-grey", Some("overridden".to_string()), now + Duration::minutes(20));

        let stats = store.statistics(Some((now - Duration::hours(1), now + Duration::hours(1))));
        assert_eq!(stats.total_raised, 2);
        assert_eq!(stats.by_type[&AlertType::Allergy], 2);
        assert_eq!(stats.by_severity[&AlertSeverity::Critical], 1);
        assert!((stats.dismissal_rate - 0.5).abs() < 1e-9);
        assert_eq!(stats.mean_minutes_to_dismissal, Some(20.0));
        assert_eq!(stats.top_dismissal_reasons, vec![("overridden".to_string(), 1)]);
    }

    #[test]
    fn statistics_without_a_range_cover_all_history() {
        let mut store = AlertStore::new(RetentionPolicy::default());
        let now = t0();

        store.admit(alert("pt-1", AlertType::Allergy, AlertSeverity::Critical, "old", now - Duration::days(400)), now - Duration::days(400));
        store.admit(alert("pt-1", AlertType::RiskScore, AlertSeverity::Warning, "new", now), now);

        // A bounded range misses the old alert; no range covers both.
        let bounded = store.statistics(Some((now - Duration::days(1), now)));
        assert_eq!(bounded.total_raised, 1);

        let unbounded = store.statistics(None);
        assert_eq!(unbounded.total_raised, 2);
    }
}

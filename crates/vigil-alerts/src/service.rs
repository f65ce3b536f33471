//! The async alert service.
//!
//! `AlertService` wraps an [`AlertStore`] behind a single drain task fed by
//! an mpsc command channel. Drafts are enqueued by `create_alert` and
//! admitted strictly one at a time, which serializes deduplication without
//! holding the store lock across awaits. A periodic sweeper expires aged
//! alerts.
//!
//! `flush()` round-trips a marker through the queue and resolves once every
//! previously enqueued alert has been admitted; tests and shutdown use it
//! to avoid sleeping.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use vigil_contracts::alert::{Alert, AlertDraft, AlertId};
use vigil_contracts::error::{VigilError, VigilResult};
use vigil_contracts::patient::PatientId;

use crate::store::{Admission, AlertStatistics, AlertStore, RetentionPolicy};
use crate::subscription::{AlertCallback, Subscription, SubscriptionFilter, SubscriptionId};

/// Tunables for the service. Defaults follow the engine-wide defaults.
#[derive(Debug, Clone)]
pub struct AlertServiceConfig {
    pub retention: RetentionPolicy,
    pub sweep_interval: Duration,
    pub queue_capacity: usize,
}

impl Default for AlertServiceConfig {
    fn default() -> Self {
        Self {
            retention: RetentionPolicy::default(),
            sweep_interval: Duration::from_secs(30 * 60),
            queue_capacity: 256,
        }
    }
}

enum Command {
    Enqueue(Alert),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Handle to the running alert service.
///
/// Cheap to share by reference (typically behind an `Arc`); owns the drain
/// and sweeper tasks, which stop on [`AlertService::shutdown`].
pub struct AlertService {
    store: Arc<Mutex<AlertStore>>,
    subscriptions: Arc<Mutex<Vec<Subscription>>>,
    tx: mpsc::Sender<Command>,
    drain: Mutex<Option<JoinHandle<()>>>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl AlertService {
    /// Start the drain task and the expiry sweeper.
    pub fn spawn(config: AlertServiceConfig) -> Self {
        let store = Arc::new(Mutex::new(AlertStore::new(config.retention.clone())));
        let subscriptions: Arc<Mutex<Vec<Subscription>>> = Arc::new(Mutex::new(Vec::new()));
        let (tx, mut rx) = mpsc::channel::<Command>(config.queue_capacity);

        let drain_store = Arc::clone(&store);
        let drain_subs = Arc::clone(&subscriptions);
        let drain = tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::Enqueue(alert) => {
                        let admission = match drain_store.lock() {
                            Ok(mut store) => store.admit(alert.clone(), Utc::now()),
                            Err(e) => {
                                warn!(error = %e, "alert store lock poisoned; dropping alert");
                                continue;
                            }
                        };
                        if admission == Admission::Accepted {
                            notify(&drain_subs, &alert);
                        }
                    }
                    Command::Flush(ack) => {
                        let _ = ack.send(());
                    }
                    Command::Shutdown => break,
                }
            }
            debug!("alert drain task stopped");
        });

        let sweep_store = Arc::clone(&store);
        let sweep_interval = config.sweep_interval;
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            // The first tick resolves immediately; consume it so the first
            // real sweep happens one interval from startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let expired = match sweep_store.lock() {
                    Ok(mut store) => store.sweep(Utc::now()),
                    Err(e) => {
                        warn!(error = %e, "alert store lock poisoned; stopping sweeper");
                        break;
                    }
                };
                if expired > 0 {
                    info!(expired, "expired aged alerts");
                }
            }
        });

        info!(
            sweep_interval_secs = sweep_interval.as_secs(),
            "alert service started"
        );

        Self {
            store,
            subscriptions,
            tx,
            drain: Mutex::new(Some(drain)),
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    fn lock_store(&self) -> VigilResult<MutexGuard<'_, AlertStore>> {
        self.store.lock().map_err(|e| VigilError::ServiceStopped {
            reason: format!("alert store lock poisoned: {}", e),
        })
    }

    fn lock_subscriptions(&self) -> VigilResult<MutexGuard<'_, Vec<Subscription>>> {
        self.subscriptions
            .lock()
            .map_err(|e| VigilError::ServiceStopped {
                reason: format!("subscription table lock poisoned: {}", e),
            })
    }

    /// Materialize a draft and enqueue it for admission.
    ///
    /// The returned id is assigned immediately; the alert becomes visible
    /// once the drain task admits it (await [`AlertService::flush`] to
    /// synchronize).
    pub async fn create_alert(&self, draft: AlertDraft) -> VigilResult<AlertId> {
        let id = draft.id.unwrap_or_else(AlertId::new);
        let alert = Alert {
            id: id.clone(),
            patient_id: draft.patient_id,
            alert_type: draft.alert_type,
            severity: draft.severity,
            title: draft.title,
            message: draft.message,
            created_at: Utc::now(),
            source: draft.source,
            actionable: draft.actionable,
            dismissal: None,
            related_data: draft.related_data,
        };

        self.tx
            .send(Command::Enqueue(alert))
            .await
            .map_err(|_| VigilError::ServiceStopped {
                reason: "alert queue closed".to_string(),
            })?;
        Ok(id)
    }

    /// Resolve once every alert enqueued before this call has been admitted.
    pub async fn flush(&self) -> VigilResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .await
            .map_err(|_| VigilError::ServiceStopped {
                reason: "alert queue closed".to_string(),
            })?;
        ack_rx.await.map_err(|_| VigilError::ServiceStopped {
            reason: "drain task stopped before flush completed".to_string(),
        })
    }

    /// Register a callback for alerts matching `filter`.
    pub fn subscribe(
        &self,
        filter: SubscriptionFilter,
        callback: AlertCallback,
    ) -> VigilResult<SubscriptionId> {
        let id = SubscriptionId::new();
        self.lock_subscriptions()?.push(Subscription {
            id,
            filter,
            callback,
        });
        Ok(id)
    }

    /// Remove a subscription. Returns false when the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> VigilResult<bool> {
        let mut subs = self.lock_subscriptions()?;
        let before = subs.len();
        subs.retain(|s| s.id != id);
        Ok(subs.len() != before)
    }

    /// Dismiss an active alert. Returns false when the id is not active.
    pub fn dismiss_alert(
        &self,
        id: &AlertId,
        dismissed_by: &str,
        reason: Option<String>,
    ) -> VigilResult<bool> {
        Ok(self.lock_store()?.dismiss(id, dismissed_by, reason, Utc::now()))
    }

    /// Active alerts for a patient, severity descending, most recent first.
    pub fn active_alerts_for_patient(&self, patient_id: &PatientId) -> VigilResult<Vec<Alert>> {
        Ok(self.lock_store()?.active_for_patient(patient_id))
    }

    /// Aggregate statistics over alerts created in `range`, or over all
    /// recorded alerts when `None`.
    pub fn statistics(
        &self,
        range: Option<(chrono::DateTime<Utc>, chrono::DateTime<Utc>)>,
    ) -> VigilResult<AlertStatistics> {
        Ok(self.lock_store()?.statistics(range))
    }

    /// Drain outstanding work and stop both background tasks.
    ///
    /// Idempotent; any `create_alert` after this returns `ServiceStopped`.
    pub async fn shutdown(&self) -> VigilResult<()> {
        // Tolerate an already-closed queue so repeated shutdowns are no-ops.
        if self.flush().await.is_err() {
            debug!("alert queue already closed");
        }
        let _ = self.tx.send(Command::Shutdown).await;

        let drain = self
            .drain
            .lock()
            .map_err(|e| VigilError::ServiceStopped {
                reason: format!("drain handle lock poisoned: {}", e),
            })?
            .take();
        if let Some(handle) = drain {
            if handle.await.is_err() {
                warn!("alert drain task panicked during shutdown");
            }
        }

        let sweeper = self
            .sweeper
            .lock()
            .map_err(|e| VigilError::ServiceStopped {
                reason: format!("sweeper handle lock poisoned: {}", e),
            })?
            .take();
        if let Some(handle) = sweeper {
            handle.abort();
        }

        info!("alert service stopped");
        Ok(())
    }
}

/// Deliver one admitted alert to every matching subscriber.
///
/// A callback error is logged and never aborts delivery to the rest.
fn notify(subscriptions: &Mutex<Vec<Subscription>>, alert: &Alert) {
    let subs = match subscriptions.lock() {
        Ok(subs) => subs,
        Err(e) => {
            warn!(error = %e, "subscription table lock poisoned; skipping notification");
            return;
        }
    };

    for sub in subs.iter().filter(|s| s.filter.matches(alert)) {
        if let Err(e) = (sub.callback)(alert) {
            warn!(
                subscription = %sub.id.0,
                alert_id = %alert.id.0,
                error = %e,
                "alert subscriber callback failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use vigil_contracts::alert::{AlertSeverity, AlertType};

    use super::*;

    fn draft(patient: &str, title: &str, severity: AlertSeverity) -> AlertDraft {
        AlertDraft {
            patient_id: PatientId::new(patient),
            alert_type: AlertType::DrugInteraction,
            severity,
            title: title.to_string(),
            message: format!("details for {}", title),
            source: "test".to_string(),
            actionable: true,
            related_data: serde_json::Value::Null,
            id: None,
        }
    }

    #[tokio::test]
    async fn created_alert_is_active_after_flush() {
        let service = AlertService::spawn(AlertServiceConfig::default());
        let patient = PatientId::new("pt-svc-1");

        service
            .create_alert(draft("pt-svc-1", "warfarin + aspirin", AlertSeverity::Critical))
            .await
            .unwrap();
        service.flush().await.unwrap();

        let active = service.active_alerts_for_patient(&patient).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "warfarin + aspirin");

        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_drafts_collapse_to_one_active_alert() {
        let service = AlertService::spawn(AlertServiceConfig::default());
        let patient = PatientId::new("pt-svc-2");

        for _ in 0..3 {
            service
                .create_alert(draft("pt-svc-2", "penicillin allergy", AlertSeverity::Critical))
                .await
                .unwrap();
        }
        service.flush().await.unwrap();

        assert_eq!(service.active_alerts_for_patient(&patient).unwrap().len(), 1);
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn failing_subscriber_does_not_block_others() {
        let service = AlertService::spawn(AlertServiceConfig::default());
        let delivered: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        service
            .subscribe(
                SubscriptionFilter::default(),
                Box::new(|_| {
                    Err(VigilError::ServiceStopped {
                        reason: "subscriber broke".to_string(),
                    })
                }),
            )
            .unwrap();

        let sink = Arc::clone(&delivered);
        service
            .subscribe(
                SubscriptionFilter::default(),
                Box::new(move |alert| {
                    sink.lock().unwrap().push(alert.title.clone());
                    Ok(())
                }),
            )
            .unwrap();

        service
            .create_alert(draft("pt-svc-3", "notified", AlertSeverity::Warning))
            .await
            .unwrap();
        service.flush().await.unwrap();

        assert_eq!(*delivered.lock().unwrap(), vec!["notified".to_string()]);
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn filtered_subscriber_only_sees_matching_patient() {
        let service = AlertService::spawn(AlertServiceConfig::default());
        let delivered: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&delivered);
        let filter = SubscriptionFilter {
            patient_ids: vec![PatientId::new("pt-watch")],
            ..SubscriptionFilter::default()
        };
        service
            .subscribe(
                filter,
                Box::new(move |alert| {
                    sink.lock().unwrap().push(alert.patient_id.to_string());
                    Ok(())
                }),
            )
            .unwrap();

        service
            .create_alert(draft("pt-watch", "seen", AlertSeverity::Info))
            .await
            .unwrap();
        service
            .create_alert(draft("pt-other", "unseen", AlertSeverity::Info))
            .await
            .unwrap();
        service.flush().await.unwrap();

        assert_eq!(*delivered.lock().unwrap(), vec!["pt-watch".to_string()]);
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn unsubscribe_unknown_id_returns_false() {
        let service = AlertService::spawn(AlertServiceConfig::default());

        let id = service
            .subscribe(SubscriptionFilter::default(), Box::new(|_| Ok(())))
            .unwrap();
        assert!(service.unsubscribe(id).unwrap());
        assert!(!service.unsubscribe(id).unwrap());
        assert!(!service.unsubscribe(SubscriptionId::new()).unwrap());

        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn dismissed_alert_leaves_the_active_set() {
        let service = AlertService::spawn(AlertServiceConfig::default());
        let patient = PatientId::new("pt-svc-4");

        let id = service
            .create_alert(draft("pt-svc-4", "to dismiss", AlertSeverity::Warning))
            .await
            .unwrap();
        service.flush().await.unwrap();

        assert!(service
            .dismiss_alert(&id, "dr-grey", Some("reviewed".to_string()))
            .unwrap());
        assert!(service.active_alerts_for_patient(&patient).unwrap().is_empty());
        // A second dismissal of the same id is a no-op.
        assert!(!service.dismiss_alert(&id, "dr-grey", None).unwrap());

        service.shutdown().await.unwrap();
    }
}

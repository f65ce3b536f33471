//! The CDS orchestrator.
//!
//! `CdsEngine` wires the matchers, calculators and evaluators behind the
//! hook surface and the assessment operations. The load-bearing guarantee
//! sits in `process_hook`: whatever happens internally, the caller gets a
//! structurally valid `HookResponse` — an advisory card for a bad request,
//! a single fallback warning card when processing fails.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use vigil_alerts::AlertService;
use vigil_contracts::alert::{AlertDraft, AlertSeverity, AlertType};
use vigil_contracts::error::{VigilError, VigilResult};
use vigil_contracts::finding::{InteractionSeverity, MatchSeverity};
use vigil_contracts::guideline::MeasureEvaluation;
use vigil_contracts::hook::{Card, HookRequest, HookResponse, HookType};
use vigil_contracts::finding::DrugInteraction;
use vigil_contracts::patient::{Medication, MedicationStatus, PatientId, PatientSnapshot};
use vigil_contracts::score::{RiskBand, RiskScore};
use vigil_guidelines::{measures::evaluate_measure, GuidelineCatalog};
use vigil_interactions::cache::InteractionCache;
use vigil_reference::{name_matches, ReferenceData};

use crate::config::EngineConfig;
use crate::reader::SnapshotReader;
use crate::reports::{
    MedicationSafetyReport, PatientAssessment, PatientDashboard, PopulationReport,
};

/// Population runs assess this many patients concurrently.
const POPULATION_CHUNK: usize = 10;

/// The assembled decision support engine.
///
/// Cheap to clone: all components are shared. Clones are used to move the
/// engine into population worker tasks.
#[derive(Clone)]
pub struct CdsEngine {
    config: Arc<EngineConfig>,
    reference: Arc<ReferenceData>,
    catalog: Arc<GuidelineCatalog>,
    reader: Arc<dyn SnapshotReader>,
    alerts: Arc<AlertService>,
    /// Pair-keyed cache standing in for a remote interaction database.
    interaction_cache: Arc<Mutex<InteractionCache>>,
}

impl CdsEngine {
    /// Assemble the engine: seed reference data and the guideline catalog,
    /// start the alert service.
    pub fn new(config: EngineConfig, reader: Arc<dyn SnapshotReader>) -> Self {
        let alerts = AlertService::spawn(config.alert_service_config());
        let interaction_cache = InteractionCache::with_staleness(config.interaction_staleness());
        info!("CDS engine assembled");
        Self {
            config: Arc::new(config),
            reference: Arc::new(ReferenceData::seed()),
            catalog: Arc::new(GuidelineCatalog::seed()),
            reader,
            alerts: Arc::new(alerts),
            interaction_cache: Arc::new(Mutex::new(interaction_cache)),
        }
    }

    /// The alert service, for dismissals, subscriptions and statistics.
    pub fn alerts(&self) -> &AlertService {
        &self.alerts
    }

    /// Stop the alert service's background tasks.
    pub async fn shutdown(&self) -> VigilResult<()> {
        self.alerts.shutdown().await
    }

    // ── Hook surface ─────────────────────────────────────────────────────────

    /// Handle one inbound hook invocation.
    ///
    /// Never fails: a request without a usable patient id gets a single
    /// advisory card, and any internal error degrades to a single fallback
    /// warning card. Processing past the soft timeout is logged, not
    /// aborted.
    pub async fn process_hook(&self, request: HookRequest) -> HookResponse {
        if request.patient_id.0.trim().is_empty() {
            warn!("hook request rejected: empty patient id");
            return HookResponse {
                cards: vec![advisory_card("The request did not name a patient")],
            };
        }

        let started = tokio::time::Instant::now();
        let response = match self.hook_cards(&request).await {
            Ok(cards) => HookResponse { cards },
            Err(VigilError::InvalidRequest { reason }) => {
                warn!(patient = %request.patient_id, reason = %reason, "invalid hook request");
                HookResponse {
                    cards: vec![advisory_card(&reason)],
                }
            }
            Err(e) => {
                warn!(patient = %request.patient_id, error = %e, "hook processing failed");
                HookResponse {
                    cards: vec![fallback_card()],
                }
            }
        };

        let elapsed = started.elapsed();
        if elapsed > self.config.hook_timeout() {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = self.config.hook_timeout_ms,
                "hook processing exceeded soft timeout"
            );
        }
        response
    }

    async fn hook_cards(&self, request: &HookRequest) -> VigilResult<Vec<Card>> {
        let snapshot = self.reader.snapshot(&request.patient_id).await?;

        match request.hook_type {
            HookType::PatientView => {
                let assessment = self.assess_patient(&snapshot).await?;
                Ok(assessment_cards(&assessment))
            }
            HookType::MedicationPrescribe | HookType::OrderSelect => {
                let medication = request
                    .context
                    .get("medication")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| VigilError::InvalidRequest {
                        reason: "The request did not name a medication".to_string(),
                    })?;
                let report = self.check_medication_safety(medication, &snapshot).await?;
                Ok(self.safety_cards(&report))
            }
        }
    }

    // ── Assessment operations ────────────────────────────────────────────────

    /// Full chart-open assessment: risk scores, applicable guidelines and
    /// preventive care, evaluated concurrently. Every elevated score raises
    /// an alert.
    pub async fn assess_patient(&self, snapshot: &PatientSnapshot) -> VigilResult<PatientAssessment> {
        let categories = self.config.categories;

        let (scores, guidelines, preventive_care) = tokio::join!(
            async {
                if categories.risk_scores {
                    vigil_scoring::all_scores(snapshot)
                } else {
                    Vec::new()
                }
            },
            async {
                if categories.guidelines {
                    self.catalog
                        .applicable_guidelines(snapshot)
                        .into_iter()
                        .cloned()
                        .collect()
                } else {
                    Vec::new()
                }
            },
            async {
                if categories.guidelines {
                    self.catalog.preventive_care(snapshot)
                } else {
                    Vec::new()
                }
            },
        );

        for score in scores.iter().filter(|s| s.band.is_elevated()) {
            self.alerts
                .create_alert(risk_score_draft(&snapshot.patient_id, score))
                .await?;
        }

        debug!(
            patient = %snapshot.patient_id,
            scores = scores.len(),
            guidelines = guidelines.len(),
            "patient assessment complete"
        );

        Ok(PatientAssessment {
            patient_id: snapshot.patient_id.clone(),
            scores,
            guidelines,
            preventive_care,
            generated_at: Utc::now(),
        })
    }

    /// All safety checks for one proposed medication. Every finding at or
    /// above its category threshold is forwarded to the alert service.
    pub async fn check_medication_safety(
        &self,
        medication: &str,
        snapshot: &PatientSnapshot,
    ) -> VigilResult<MedicationSafetyReport> {
        let categories = self.config.categories;
        let patient_id = &snapshot.patient_id;

        let mut interactions = Vec::new();
        if categories.drug_interactions {
            interactions = self.pair_interactions(medication, &snapshot.medications);

            // The proposed drug can be the one completing a multi-drug
            // pattern, so it joins the list for this check.
            let mut with_proposed = snapshot.medications.clone();
            with_proposed.push(proposed_medication(medication));
            interactions.extend(vigil_interactions::check_high_risk_combinations(
                &with_proposed,
                &self.reference,
            ));
            vigil_interactions::sort_by_severity(&mut interactions);
        }

        let contraindications = if categories.contraindications {
            vigil_interactions::check_contraindications(medication, snapshot, &self.reference)
        } else {
            Vec::new()
        };

        let allergy_findings = if categories.allergies {
            vigil_allergy::check_allergies(medication, &snapshot.allergies, &self.reference)
        } else {
            Vec::new()
        };

        let guideline_warnings = if categories.guidelines {
            self.guideline_warnings(medication, snapshot)
        } else {
            Vec::new()
        };

        for finding in &interactions {
            if finding.severity.rank() < self.config.interaction_alert_threshold.rank() {
                continue;
            }
            self.alerts
                .create_alert(AlertDraft {
                    patient_id: patient_id.clone(),
                    alert_type: AlertType::DrugInteraction,
                    severity: interaction_alert_severity(finding.severity),
                    title: format!("{} + {}", finding.drug_a, finding.drug_b),
                    message: format!("{}. {}", finding.mechanism, finding.management),
                    source: "drug-interaction-check".to_string(),
                    actionable: true,
                    related_data: serde_json::to_value(finding).unwrap_or_default(),
                    id: None,
                })
                .await?;
        }

        for finding in
            vigil_allergy::escalating(&allergy_findings, self.config.allergy_match_threshold)
        {
            self.alerts
                .create_alert(AlertDraft {
                    patient_id: patient_id.clone(),
                    alert_type: AlertType::Allergy,
                    severity: allergy_alert_severity(finding.severity),
                    title: format!("{} vs {} allergy", finding.medication, finding.allergen),
                    message: finding.mechanism.clone(),
                    source: "allergy-check".to_string(),
                    actionable: true,
                    related_data: serde_json::to_value(finding).unwrap_or_default(),
                    id: None,
                })
                .await?;
        }

        for finding in &contraindications {
            self.alerts
                .create_alert(AlertDraft {
                    patient_id: patient_id.clone(),
                    alert_type: AlertType::Contraindication,
                    severity: interaction_alert_severity(finding.severity),
                    title: format!("{} contraindicated ({})", finding.medication, finding.condition_code),
                    message: finding.reason.clone(),
                    source: "contraindication-check".to_string(),
                    actionable: true,
                    related_data: serde_json::to_value(finding).unwrap_or_default(),
                    id: None,
                })
                .await?;
        }

        for warning in &guideline_warnings {
            self.alerts
                .create_alert(AlertDraft {
                    patient_id: patient_id.clone(),
                    alert_type: AlertType::Guideline,
                    severity: AlertSeverity::Warning,
                    title: format!("{} advised against", medication),
                    message: warning.clone(),
                    source: "guideline-check".to_string(),
                    actionable: true,
                    related_data: serde_json::Value::Null,
                    id: None,
                })
                .await?;
        }

        let risk_score = vigil_interactions::interaction_risk_score(&interactions);

        Ok(MedicationSafetyReport {
            medication: medication.to_string(),
            interactions,
            contraindications,
            allergy_findings,
            guideline_warnings,
            risk_score,
        })
    }

    /// Evaluate every catalog measure for the patient; each compliance gap
    /// raises a QualityMeasure alert.
    pub async fn analyze_quality_gaps(
        &self,
        snapshot: &PatientSnapshot,
    ) -> VigilResult<Vec<MeasureEvaluation>> {
        if !self.config.categories.quality_measures {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut evaluations = Vec::new();

        for measure in self.catalog.measures() {
            let evaluation = evaluate_measure(measure, snapshot, now);
            if let Some(gap) = &evaluation.gap {
                self.alerts
                    .create_alert(AlertDraft {
                        patient_id: snapshot.patient_id.clone(),
                        alert_type: AlertType::QualityMeasure,
                        severity: AlertSeverity::Warning,
                        title: format!("Care gap: {}", evaluation.measure_id),
                        message: gap.description.clone(),
                        source: "quality-measure-check".to_string(),
                        actionable: true,
                        related_data: serde_json::to_value(gap).unwrap_or_default(),
                        id: None,
                    })
                    .await?;
            }
            evaluations.push(evaluation);
        }

        Ok(evaluations)
    }

    /// Snapshot fetch + assessment + quality gaps + live alerts in one view.
    pub async fn patient_dashboard(&self, patient_id: &PatientId) -> VigilResult<PatientDashboard> {
        let snapshot = self.reader.snapshot(patient_id).await?;
        let assessment = self.assess_patient(&snapshot).await?;
        let quality = self.analyze_quality_gaps(&snapshot).await?;

        // Raised alerts become visible once the drain task admits them.
        self.alerts.flush().await?;
        let active_alerts = self.alerts.active_alerts_for_patient(patient_id)?;

        Ok(PatientDashboard {
            assessment,
            quality,
            active_alerts,
        })
    }

    /// Assess a patient panel in chunks of ten, bounded concurrency per
    /// chunk. A failing patient is logged and excluded; the aggregation is
    /// order-independent.
    pub async fn assess_population(&self, patients: &[PatientId]) -> PopulationReport {
        let mut report = PopulationReport {
            patients_requested: patients.len(),
            ..PopulationReport::default()
        };

        for chunk in patients.chunks(POPULATION_CHUNK) {
            let mut tasks = JoinSet::new();
            for patient_id in chunk {
                let engine = self.clone();
                let patient_id = patient_id.clone();
                tasks.spawn(async move {
                    let outcome = engine.assess_one(&patient_id).await;
                    (patient_id, outcome)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                let (patient_id, outcome) = match joined {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(error = %e, "population worker task failed");
                        continue;
                    }
                };
                match outcome {
                    Ok((high_risk, gaps)) => {
                        report.patients_assessed += 1;
                        report.total_care_gaps += gaps;
                        if high_risk {
                            report.high_risk_patients.push(patient_id);
                        }
                    }
                    Err(e) => {
                        warn!(patient = %patient_id, error = %e, "patient excluded from population run");
                    }
                }
            }
        }

        info!(
            requested = report.patients_requested,
            assessed = report.patients_assessed,
            high_risk = report.high_risk_patients.len(),
            gaps = report.total_care_gaps,
            "population assessment complete"
        );
        report
    }

    /// One population work item: (is high risk, open gap count).
    async fn assess_one(&self, patient_id: &PatientId) -> VigilResult<(bool, usize)> {
        let snapshot = self.reader.snapshot(patient_id).await?;
        let assessment = self.assess_patient(&snapshot).await?;
        let quality = self.analyze_quality_gaps(&snapshot).await?;

        let high_risk = assessment.elevated_scores().next().is_some();
        let gaps = quality.iter().filter(|e| e.gap.is_some()).count();
        Ok((high_risk, gaps))
    }

    /// Per-pair interaction lookup through the staleness-windowed cache.
    ///
    /// A fresh cache entry (including an empty "checked, nothing found"
    /// one) is used as-is; a miss or stale entry recomputes the pair and
    /// refreshes the cache.
    fn pair_interactions(&self, medication: &str, meds: &[Medication]) -> Vec<DrugInteraction> {
        let now = Utc::now();
        let mut findings = Vec::new();

        for med in meds.iter().filter(|m| m.is_active()) {
            if name_matches(&med.name, medication) {
                continue;
            }

            let cached = match self.interaction_cache.lock() {
                Ok(cache) => cache.get(medication, &med.name, now).map(<[_]>::to_vec),
                Err(e) => {
                    warn!(error = %e, "interaction cache lock poisoned; computing uncached");
                    None
                }
            };

            let pair = match cached {
                Some(hit) => hit,
                None => {
                    let computed = vigil_interactions::check_interactions(
                        medication,
                        std::slice::from_ref(med),
                        &self.reference,
                    );
                    if let Ok(mut cache) = self.interaction_cache.lock() {
                        cache.put(medication, &med.name, computed.clone(), now);
                    }
                    computed
                }
            };
            findings.extend(pair);
        }

        vigil_interactions::sort_by_severity(&mut findings);
        findings
    }

    // ── Card construction ────────────────────────────────────────────────────

    fn guideline_warnings(&self, medication: &str, snapshot: &PatientSnapshot) -> Vec<String> {
        self.catalog
            .applicable_guidelines(snapshot)
            .into_iter()
            .filter(|g| {
                g.contraindicated_medications
                    .iter()
                    .any(|m| name_matches(medication, m))
            })
            .map(|g| format!("{} advises against {} ({})", g.title, medication, g.source))
            .collect()
    }

    fn safety_cards(&self, report: &MedicationSafetyReport) -> Vec<Card> {
        let mut cards = Vec::new();

        for finding in &report.interactions {
            if finding.severity.rank() < self.config.interaction_alert_threshold.rank() {
                continue;
            }
            cards.push(Card {
                summary: format!(
                    "Interaction: {} + {}",
                    finding.drug_a, finding.drug_b
                ),
                detail: Some(format!("{}. {}", finding.mechanism, finding.management)),
                severity: interaction_alert_severity(finding.severity),
                source: "drug-interaction-check".to_string(),
                suggested_actions: vec![finding.management.clone()],
                override_reasons: override_reasons(finding.severity),
            });
        }

        for finding in
            vigil_allergy::escalating(&report.allergy_findings, self.config.allergy_match_threshold)
        {
            cards.push(Card {
                summary: format!(
                    "Allergy: {} vs documented {} allergy",
                    finding.medication, finding.allergen
                ),
                detail: Some(finding.mechanism.clone()),
                severity: allergy_alert_severity(finding.severity),
                source: "allergy-check".to_string(),
                suggested_actions: vec!["Select an alternative agent".to_string()],
                override_reasons: vec![
                    "Benefit outweighs risk".to_string(),
                    "Tolerated previously".to_string(),
                ],
            });
        }

        for finding in &report.contraindications {
            cards.push(Card {
                summary: format!(
                    "Contraindication: {} with {}",
                    finding.medication, finding.condition_code
                ),
                detail: Some(finding.reason.clone()),
                severity: interaction_alert_severity(finding.severity),
                source: "contraindication-check".to_string(),
                suggested_actions: vec![],
                override_reasons: override_reasons(finding.severity),
            });
        }

        for warning in &report.guideline_warnings {
            cards.push(Card {
                summary: warning.clone(),
                detail: None,
                severity: AlertSeverity::Warning,
                source: "guideline-check".to_string(),
                suggested_actions: vec![],
                override_reasons: vec![],
            });
        }

        cards
    }
}

// ── Severity mapping and fixed cards ─────────────────────────────────────────

/// A stand-in list entry for a drug that is proposed but not yet
/// prescribed.
fn proposed_medication(name: &str) -> Medication {
    Medication {
        name: name.to_string(),
        dose: String::new(),
        route: String::new(),
        frequency: String::new(),
        status: MedicationStatus::Active,
    }
}

fn interaction_alert_severity(severity: InteractionSeverity) -> AlertSeverity {
    match severity {
        InteractionSeverity::Contraindicated | InteractionSeverity::Major => AlertSeverity::Critical,
        InteractionSeverity::Moderate => AlertSeverity::Warning,
        InteractionSeverity::Minor => AlertSeverity::Info,
    }
}

fn allergy_alert_severity(severity: MatchSeverity) -> AlertSeverity {
    match severity {
        MatchSeverity::High => AlertSeverity::Critical,
        MatchSeverity::Medium => AlertSeverity::Warning,
        MatchSeverity::Low => AlertSeverity::Info,
    }
}

fn risk_score_draft(patient_id: &PatientId, score: &RiskScore) -> AlertDraft {
    let severity = match score.band {
        RiskBand::VeryHigh => AlertSeverity::Critical,
        _ => AlertSeverity::Warning,
    };
    AlertDraft {
        patient_id: patient_id.clone(),
        alert_type: AlertType::RiskScore,
        severity,
        title: format!("{} elevated", score.name),
        message: score.interpretation.clone(),
        source: "risk-scoring".to_string(),
        actionable: true,
        related_data: serde_json::to_value(score).unwrap_or_default(),
        id: None,
    }
}

fn override_reasons(severity: InteractionSeverity) -> Vec<String> {
    if severity.rank() >= InteractionSeverity::Major.rank() {
        vec![
            "Benefit outweighs risk".to_string(),
            "Will monitor closely".to_string(),
            "Specialist recommendation".to_string(),
        ]
    } else {
        vec![]
    }
}

fn assessment_cards(assessment: &PatientAssessment) -> Vec<Card> {
    let mut cards = Vec::new();

    for score in assessment.elevated_scores() {
        cards.push(Card {
            summary: format!("{}: {} ({:?})", score.name, score.points, score.band),
            detail: Some(score.interpretation.clone()),
            severity: AlertSeverity::Warning,
            source: "risk-scoring".to_string(),
            suggested_actions: vec![],
            override_reasons: vec![],
        });
    }

    for recommendation in &assessment.preventive_care {
        cards.push(Card {
            summary: recommendation.text.clone(),
            detail: None,
            severity: AlertSeverity::Info,
            source: "preventive-care".to_string(),
            suggested_actions: vec![],
            override_reasons: vec![],
        });
    }

    cards
}

fn advisory_card(reason: &str) -> Card {
    Card {
        summary: "Request could not be processed".to_string(),
        detail: Some(reason.to_string()),
        severity: AlertSeverity::Info,
        source: "vigil-engine".to_string(),
        suggested_actions: vec![],
        override_reasons: vec![],
    }
}

fn fallback_card() -> Card {
    Card {
        summary: "Decision support temporarily unavailable".to_string(),
        detail: Some("Clinical checks could not be completed; proceed with manual review".to_string()),
        severity: AlertSeverity::Warning,
        source: "vigil-engine".to_string(),
        suggested_actions: vec![],
        override_reasons: vec![],
    }
}

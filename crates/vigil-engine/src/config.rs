//! Engine configuration.
//!
//! `EngineConfig` is loaded from TOML; every field has a default, so an
//! empty document yields a fully working configuration. Timing fields use
//! explicit units in their names and are converted to durations by the
//! accessor methods.

use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::Deserialize;

use vigil_alerts::{AlertServiceConfig, RetentionPolicy};
use vigil_contracts::error::{VigilError, VigilResult};
use vigil_contracts::finding::{InteractionSeverity, MatchSeverity};

/// Which rule categories the engine runs. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryToggles {
    pub drug_interactions: bool,
    pub allergies: bool,
    pub contraindications: bool,
    pub risk_scores: bool,
    pub guidelines: bool,
    pub quality_measures: bool,
}

impl Default for CategoryToggles {
    fn default() -> Self {
        Self {
            drug_interactions: true,
            allergies: true,
            contraindications: true,
            risk_scores: true,
            guidelines: true,
            quality_measures: true,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub categories: CategoryToggles,
    /// Minimum allergy match strength that raises an alert.
    pub allergy_match_threshold: MatchSeverity,
    /// Minimum interaction severity that raises an alert.
    pub interaction_alert_threshold: InteractionSeverity,
    /// Soft budget for hook processing. Exceeding it is logged, never
    /// aborted.
    pub hook_timeout_ms: u64,
    pub sweep_interval_minutes: u64,
    pub dedup_window_minutes: u32,
    pub medication_safety_max_age_hours: u32,
    pub risk_score_max_age_days: u32,
    pub guideline_max_age_days: u32,
    pub interaction_staleness_hours: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            categories: CategoryToggles::default(),
            allergy_match_threshold: MatchSeverity::Medium,
            interaction_alert_threshold: InteractionSeverity::Moderate,
            hook_timeout_ms: 5_000,
            sweep_interval_minutes: 30,
            dedup_window_minutes: 60,
            medication_safety_max_age_hours: 24,
            risk_score_max_age_days: 7,
            guideline_max_age_days: 30,
            interaction_staleness_hours: 24,
        }
    }
}

impl EngineConfig {
    /// Parse `s` as TOML. An empty document yields pure defaults.
    pub fn from_toml_str(s: &str) -> VigilResult<Self> {
        toml::from_str(s).map_err(|e| VigilError::Config {
            reason: format!("failed to parse engine config TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as engine configuration.
    pub fn from_file(path: &Path) -> VigilResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| VigilError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Soft hook-processing budget.
    pub fn hook_timeout(&self) -> StdDuration {
        StdDuration::from_millis(self.hook_timeout_ms)
    }

    /// Staleness window for cached interaction lookups.
    pub fn interaction_staleness(&self) -> Duration {
        Duration::hours(self.interaction_staleness_hours as i64)
    }

    /// Dedup window and per-type max ages for the alert store.
    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            dedup_window: Duration::minutes(self.dedup_window_minutes as i64),
            medication_safety_max_age: Duration::hours(self.medication_safety_max_age_hours as i64),
            risk_score_max_age: Duration::days(self.risk_score_max_age_days as i64),
            guideline_max_age: Duration::days(self.guideline_max_age_days as i64),
        }
    }

    /// The alert service configuration derived from this engine config.
    pub fn alert_service_config(&self) -> AlertServiceConfig {
        AlertServiceConfig {
            retention: self.retention(),
            sweep_interval: StdDuration::from_secs(self.sweep_interval_minutes * 60),
            ..AlertServiceConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_pure_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.hook_timeout(), StdDuration::from_secs(5));
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
            hook_timeout_ms = 250
            dedup_window_minutes = 15

            [categories]
            quality_measures = false
            "#,
        )
        .unwrap();

        assert_eq!(config.hook_timeout_ms, 250);
        assert_eq!(config.retention().dedup_window, Duration::minutes(15));
        assert!(!config.categories.quality_measures);
        // Untouched fields keep defaults.
        assert!(config.categories.drug_interactions);
        assert_eq!(config.risk_score_max_age_days, 7);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = EngineConfig::from_toml_str("hook_timeout_ms = [").unwrap_err();
        assert!(matches!(err, VigilError::Config { .. }));
    }
}

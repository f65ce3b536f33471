//! Result cache for an external interaction-database collaborator.
//!
//! The core ships only the static reference table; a deployment may layer a
//! remote lookup on top. Remote results are cached here under the same
//! bidirectional pair key and consulted only while fresh. Refreshing a
//! stale entry is the collaborator's job; the core never blocks on it.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use vigil_contracts::finding::DrugInteraction;
use vigil_reference::pair_key;

/// Default staleness window for remotely fetched interaction results.
pub const DEFAULT_STALENESS_HOURS: i64 = 24;

/// A cached remote lookup result for one drug pair.
#[derive(Debug, Clone)]
pub struct CachedLookup {
    /// Findings returned by the remote source; empty means "checked,
    /// no interaction" (distinct from never checked).
    pub findings: Vec<DrugInteraction>,
    pub fetched_at: DateTime<Utc>,
}

impl CachedLookup {
    /// True once the entry has outlived the staleness window.
    pub fn is_stale(&self, now: DateTime<Utc>, staleness: Duration) -> bool {
        now - self.fetched_at > staleness
    }
}

/// Pair-keyed cache of remote interaction lookups.
#[derive(Debug, Default)]
pub struct InteractionCache {
    entries: HashMap<String, CachedLookup>,
    staleness: Option<Duration>,
}

impl InteractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the default 24-hour staleness window.
    pub fn with_staleness(staleness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            staleness: Some(staleness),
        }
    }

    fn staleness(&self) -> Duration {
        self.staleness
            .unwrap_or_else(|| Duration::hours(DEFAULT_STALENESS_HOURS))
    }

    /// Fresh findings for a pair, or `None` when never fetched or stale.
    pub fn get(&self, drug_a: &str, drug_b: &str, now: DateTime<Utc>) -> Option<&[DrugInteraction]> {
        let entry = self.entries.get(&pair_key(drug_a, drug_b))?;
        if entry.is_stale(now, self.staleness()) {
            return None;
        }
        Some(&entry.findings)
    }

    /// Store a remote lookup result, replacing any previous entry.
    pub fn put(
        &mut self,
        drug_a: &str,
        drug_b: &str,
        findings: Vec<DrugInteraction>,
        fetched_at: DateTime<Utc>,
    ) {
        self.entries.insert(
            pair_key(drug_a, drug_b),
            CachedLookup { findings, fetched_at },
        );
    }

    /// Pair keys whose entries are stale and due for refresh.
    pub fn stale_keys(&self, now: DateTime<Utc>) -> Vec<&str> {
        let staleness = self.staleness();
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_stale(now, staleness))
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_returned_order_independently() {
        let mut cache = InteractionCache::new();
        let now = Utc::now();
        cache.put("warfarin", "aspirin", vec![], now);

        assert!(cache.get("aspirin", "warfarin", now).is_some());
        assert!(cache.get("warfarin", "aspirin", now).unwrap().is_empty());
    }

    #[test]
    fn entry_goes_stale_after_the_window() {
        let mut cache = InteractionCache::new();
        let fetched = Utc::now();
        cache.put("warfarin", "aspirin", vec![], fetched);

        let later = fetched + Duration::hours(25);
        assert!(cache.get("warfarin", "aspirin", later).is_none());
        assert_eq!(cache.stale_keys(later), vec!["aspirin|warfarin"]);
    }

    #[test]
    fn never_fetched_pair_is_none_not_empty() {
        let cache = InteractionCache::new();
        assert!(cache.get("a", "b", Utc::now()).is_none());
    }
}

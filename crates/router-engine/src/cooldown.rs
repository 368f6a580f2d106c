//! Timed exclusion of failing models.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use router_core::ModelId;
use router_state::PersistedCooldowns;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::warn;

/// Per-model "unavailable until" timestamps.
///
/// A model enters cooldown when every credential fails for it during one
/// operation. The window is binary and fixed: repeated failures re-arm the
/// same duration, they do not stack or back off. No entry, or an expired
/// one, means the model is eligible.
pub struct CooldownManager {
    cooldown: ChronoDuration,
    inner: RwLock<HashMap<ModelId, DateTime<Utc>>>,
}

impl CooldownManager {
    /// Create an empty manager with the given cooldown window.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown: ChronoDuration::from_std(cooldown).unwrap_or(ChronoDuration::MAX),
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a manager from its persisted form.
    #[must_use]
    pub fn from_persisted(cooldown: Duration, persisted: PersistedCooldowns) -> Self {
        let manager = Self::new(cooldown);
        manager.inner.write().extend(persisted);
        manager
    }

    /// Persisted form. Expired entries are dropped: absent means eligible.
    #[must_use]
    pub fn to_persisted(&self, now: DateTime<Utc>) -> PersistedCooldowns {
        self.inner
            .read()
            .iter()
            .filter(|(_, expires_at)| now < **expires_at)
            .map(|(model, expires_at)| (model.clone(), *expires_at))
            .collect()
    }

    /// Put `model` in cooldown until `at + cooldown`, overwriting any
    /// existing entry. An expiry past the representable range saturates to
    /// the far future instead of overflowing.
    pub fn mark_failed(&self, model: &ModelId, at: DateTime<Utc>) {
        let expires_at = at
            .checked_add_signed(self.cooldown)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.inner.write().insert(model.clone(), expires_at);
        warn!(model = %model, expires_at = %expires_at, "model placed in cooldown");
    }

    /// Whether `model` may be probed or routed to at `now`.
    #[must_use]
    pub fn is_eligible(&self, model: &ModelId, now: DateTime<Utc>) -> bool {
        match self.inner.read().get(model) {
            Some(expires_at) => now >= *expires_at,
            None => true,
        }
    }

    /// All cooldowns still active at `now`, for diagnostics.
    #[must_use]
    pub fn active(&self, now: DateTime<Utc>) -> BTreeMap<ModelId, DateTime<Utc>> {
        self.inner
            .read()
            .iter()
            .filter(|(_, expires_at)| now < **expires_at)
            .map(|(model, expires_at)| (model.clone(), *expires_at))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_secs(60);

    #[test]
    fn test_cooldown_boundary() {
        let manager = CooldownManager::new(COOLDOWN);
        let model = ModelId::from("m");
        let t = Utc::now();

        manager.mark_failed(&model, t);
        assert!(!manager.is_eligible(&model, t + ChronoDuration::seconds(59)));
        assert!(manager.is_eligible(&model, t + ChronoDuration::seconds(60)));
    }

    #[test]
    fn test_no_entry_means_eligible() {
        let manager = CooldownManager::new(COOLDOWN);
        assert!(manager.is_eligible(&ModelId::from("m"), Utc::now()));
    }

    #[test]
    fn test_rearm_overwrites_instead_of_stacking() {
        let manager = CooldownManager::new(COOLDOWN);
        let model = ModelId::from("m");
        let t = Utc::now();

        manager.mark_failed(&model, t);
        manager.mark_failed(&model, t + ChronoDuration::seconds(30));

        // Expiry follows the latest failure, not the sum of both windows.
        assert!(!manager.is_eligible(&model, t + ChronoDuration::seconds(89)));
        assert!(manager.is_eligible(&model, t + ChronoDuration::seconds(90)));
    }

    #[test]
    fn test_huge_cooldown_saturates_instead_of_panicking() {
        let manager = CooldownManager::new(Duration::from_secs(u64::MAX));
        let model = ModelId::from("m");
        let t = Utc::now();

        manager.mark_failed(&model, t);
        assert!(!manager.is_eligible(&model, t + ChronoDuration::days(365_000)));
    }

    #[test]
    fn test_active_filters_expired_entries() {
        let manager = CooldownManager::new(COOLDOWN);
        let t = Utc::now();
        manager.mark_failed(&ModelId::from("hot"), t);
        manager.mark_failed(&ModelId::from("stale"), t - ChronoDuration::seconds(120));

        let active = manager.active(t);
        assert_eq!(active.len(), 1);
        assert!(active.contains_key(&ModelId::from("hot")));
    }

    #[test]
    fn test_persisted_round_trip_drops_expired() {
        let manager = CooldownManager::new(COOLDOWN);
        let t = Utc::now();
        manager.mark_failed(&ModelId::from("hot"), t);
        manager.mark_failed(&ModelId::from("stale"), t - ChronoDuration::seconds(120));

        let persisted = manager.to_persisted(t);
        assert_eq!(persisted.len(), 1);

        let rebuilt = CooldownManager::from_persisted(COOLDOWN, persisted);
        assert!(!rebuilt.is_eligible(&ModelId::from("hot"), t));
        assert!(rebuilt.is_eligible(&ModelId::from("stale"), t));
    }
}

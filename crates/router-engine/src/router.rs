//! Top-level routing decision.

use crate::cooldown::CooldownManager;
use crate::stats::StatsStore;
use crate::tiers::{TierClassifier, TierTable};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use router_core::{ModelId, RouterError, RouterResult, Tier};
use router_state::PersistedRouterState;
use std::sync::Arc;
use tracing::{debug, info};

/// Picks one model from the current eligible snapshot.
///
/// Routing is a fast, synchronous computation over snapshots of the stats
/// store and the cooldown manager; it performs no I/O. A set lock is an
/// operator override: the locked model is returned unconditionally, with no
/// eligibility or tier check, and `lock` does not validate the model id.
pub struct Router {
    stats: Arc<StatsStore>,
    cooldowns: Arc<CooldownManager>,
    locked: RwLock<Option<ModelId>>,
}

impl Router {
    /// Create a router over the shared engine structures, with no lock set.
    pub fn new(stats: Arc<StatsStore>, cooldowns: Arc<CooldownManager>) -> Self {
        Self {
            stats,
            cooldowns,
            locked: RwLock::new(None),
        }
    }

    /// Create a router restoring persisted lock state.
    pub fn from_persisted(
        stats: Arc<StatsStore>,
        cooldowns: Arc<CooldownManager>,
        state: PersistedRouterState,
    ) -> Self {
        Self {
            stats,
            cooldowns,
            locked: RwLock::new(state.locked_model),
        }
    }

    /// Persisted form of the lock state.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedRouterState {
        PersistedRouterState {
            locked_model: self.locked.read().clone(),
        }
    }

    /// Currently locked model, if any.
    #[must_use]
    pub fn locked(&self) -> Option<ModelId> {
        self.locked.read().clone()
    }

    /// Force every subsequent `route` call to return `model`.
    pub fn lock(&self, model: ModelId) {
        info!(model = %model, "router locked");
        *self.locked.write() = Some(model);
    }

    /// Clear the lock and resume normal tiering.
    pub fn unlock(&self) {
        info!("router unlocked");
        *self.locked.write() = None;
    }

    /// Tier classification over models that are eligible at `now`: probed
    /// at least once, not in cooldown, and not the locked model.
    #[must_use]
    pub fn tier_table(&self, now: DateTime<Utc>) -> TierTable {
        let locked = self.locked();
        let snapshot = self
            .stats
            .snapshot()
            .into_iter()
            .filter(|(model, _)| {
                self.cooldowns.is_eligible(model, now) && Some(model) != locked.as_ref()
            })
            .collect();
        TierClassifier::classify(&snapshot)
    }

    /// Pick one model.
    ///
    /// A set lock short-circuits everything. Otherwise the eligible
    /// snapshot is classified and the candidate tiers are walked in order —
    /// the preference first when given, then S > A > B > C — taking the
    /// best balance score from the first non-empty tier.
    ///
    /// # Errors
    /// `NoEligibleModel` when no unlocked, cooldown-free model has stats.
    pub fn route(&self, now: DateTime<Utc>, preference: Option<Tier>) -> RouterResult<ModelId> {
        if let Some(model) = self.locked() {
            debug!(model = %model, "routing to locked model");
            return Ok(model);
        }

        let table = self.tier_table(now);
        let candidate_tiers = preference
            .into_iter()
            .chain(Tier::DESCENDING.into_iter().filter(|t| Some(*t) != preference));

        for tier in candidate_tiers {
            if let Some(model) = table.balance_members(tier).next() {
                debug!(model = %model, tier = %tier, "routing decision");
                return Ok(model.clone());
            }
        }

        Err(RouterError::NoEligibleModel)
    }
}

//! Shapes of the persisted records.

use chrono::{DateTime, Utc};
use router_core::{ModelId, ProbeSample};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record key for the rolling sample windows.
pub const STATS_RECORD: &str = "stats";

/// Record key for the cooldown expiries.
pub const COOLDOWNS_RECORD: &str = "cooldowns";

/// Record key for the router lock state.
pub const ROUTER_STATE_RECORD: &str = "router_state";

/// Persisted form of the stats store: model id to its bounded sample list,
/// oldest sample first.
pub type PersistedStats = BTreeMap<ModelId, Vec<ProbeSample>>;

/// Persisted form of the cooldown manager: model id to cooldown expiry.
/// A model with no entry is eligible.
pub type PersistedCooldowns = BTreeMap<ModelId, DateTime<Utc>>;

/// Persisted router lock state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRouterState {
    /// Model every `route` call must return, when set.
    pub locked_model: Option<ModelId>,
}

//! Percentile tier classification.

use router_core::{ModelId, ModelMetrics, Tier, TierAssignment};
use std::collections::BTreeMap;

/// Classification of an eligible snapshot into percentile tiers.
///
/// Recomputed on demand as a pure function of the metrics it was built
/// from; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    assignments: BTreeMap<ModelId, TierAssignment>,
    balance_order: Vec<ModelId>,
}

impl TierTable {
    /// Whether no model was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of classified models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Tier placement for one model.
    #[must_use]
    pub fn get(&self, model: &ModelId) -> Option<TierAssignment> {
        self.assignments.get(model).copied()
    }

    /// Every placement, keyed by model id.
    #[must_use]
    pub fn assignments(&self) -> &BTreeMap<ModelId, TierAssignment> {
        &self.assignments
    }

    /// Models whose balance tier is `tier`, best balance score first.
    pub fn balance_members(&self, tier: Tier) -> impl Iterator<Item = &ModelId> {
        self.balance_order
            .iter()
            .filter(move |model| self.assignments.get(*model).map(|a| a.balance) == Some(tier))
    }
}

/// Partitions eligible models into percentile tiers per metric.
pub struct TierClassifier;

impl TierClassifier {
    /// Classify a snapshot already filtered to eligible, unlocked models.
    ///
    /// Each of the three dimensions is ranked better-first (latency
    /// ascending, tokens descending, balance ascending) with the model id
    /// as the documented secondary key, then cut at the integer floor
    /// boundaries `n/5`, `n/2`, `4n/5`. With fewer than five models some
    /// tiers come out empty; that is accepted, not special-cased.
    #[must_use]
    pub fn classify(metrics: &BTreeMap<ModelId, ModelMetrics>) -> TierTable {
        let latency_order = Self::rank(metrics, |m| m.avg_latency_ms);
        let tokens_order = Self::rank(metrics, |m| -m.avg_max_tokens);
        let balance_order = Self::rank(metrics, ModelMetrics::balance_score);

        let count = metrics.len();
        let assignments = metrics
            .keys()
            .map(|model| {
                let assignment = TierAssignment {
                    latency: Self::tier_of(&latency_order, model, count),
                    tokens: Self::tier_of(&tokens_order, model, count),
                    balance: Self::tier_of(&balance_order, model, count),
                };
                (model.clone(), assignment)
            })
            .collect();

        TierTable {
            assignments,
            balance_order,
        }
    }

    fn tier_of(order: &[ModelId], model: &ModelId, count: usize) -> Tier {
        let index = order.iter().position(|m| m == model).unwrap_or(count);
        Self::tier_for(index, count)
    }

    /// Rank models by `key`, smaller-is-better, ties broken by model id.
    ///
    /// The input map iterates in id order and the sort is stable, so equal
    /// keys keep their lexicographic order — the tie-break is deterministic
    /// across runs.
    fn rank<F>(metrics: &BTreeMap<ModelId, ModelMetrics>, key: F) -> Vec<ModelId>
    where
        F: Fn(&ModelMetrics) -> f64,
    {
        let mut order: Vec<(&ModelId, f64)> =
            metrics.iter().map(|(model, m)| (model, key(m))).collect();
        order.sort_by(|a, b| a.1.total_cmp(&b.1));
        order.into_iter().map(|(model, _)| model.clone()).collect()
    }

    /// Tier for rank `index` out of `count`, by floor percentile boundary:
    /// top 20% S, next 30% A, next 30% B, remaining 20% C.
    fn tier_for(index: usize, count: usize) -> Tier {
        if index < count / 5 {
            Tier::S
        } else if index < count / 2 {
            Tier::A
        } else if index < count * 4 / 5 {
            Tier::B
        } else {
            Tier::C
        }
    }
}

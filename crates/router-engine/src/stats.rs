//! Rolling performance statistics per model.

use parking_lot::RwLock;
use router_core::{ModelId, ModelMetrics, ProbeSample};
use router_state::PersistedStats;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::debug;

/// Bounded rolling history of probe samples per model.
///
/// Each model keeps at most `window` samples, oldest evicted first. A model
/// appears lazily on its first recorded sample and is never removed, only
/// trimmed. Appends for one model are atomic under the store's lock, so
/// concurrent probes cannot corrupt a window.
pub struct StatsStore {
    window: usize,
    inner: RwLock<HashMap<ModelId, VecDeque<ProbeSample>>>,
}

impl StatsStore {
    /// Create an empty store with the given window bound.
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a store from its persisted form, trimming each window to the
    /// bound and keeping the most recent samples.
    #[must_use]
    pub fn from_persisted(window: usize, persisted: PersistedStats) -> Self {
        let store = Self::new(window);
        {
            let mut inner = store.inner.write();
            for (model, samples) in persisted {
                let mut deque: VecDeque<ProbeSample> = samples.into();
                while deque.len() > store.window {
                    deque.pop_front();
                }
                inner.insert(model, deque);
            }
        }
        store
    }

    /// Persisted form: every model's window, oldest sample first.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedStats {
        self.inner
            .read()
            .iter()
            .map(|(model, samples)| (model.clone(), samples.iter().cloned().collect()))
            .collect()
    }

    /// Append a sample for `model`, evicting the oldest when the window is
    /// full. Always succeeds.
    pub fn record(&self, model: &ModelId, sample: ProbeSample) {
        let mut inner = self.inner.write();
        let window = inner.entry(model.clone()).or_default();
        if window.len() >= self.window {
            window.pop_front();
        }
        window.push_back(sample);
        debug!(model = %model, samples = window.len(), "sample recorded");
    }

    /// Aggregate metrics for every model with at least one sample.
    ///
    /// Models never probed are absent: they are excluded from tiering, not
    /// defaulted to a score.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<ModelId, ModelMetrics> {
        self.inner
            .read()
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(model, samples)| (model.clone(), Self::metrics_of(samples)))
            .collect()
    }

    /// Raw windows, for diagnostics.
    #[must_use]
    pub fn samples(&self) -> BTreeMap<ModelId, Vec<ProbeSample>> {
        self.inner
            .read()
            .iter()
            .map(|(model, samples)| (model.clone(), samples.iter().cloned().collect()))
            .collect()
    }

    fn metrics_of(samples: &VecDeque<ProbeSample>) -> ModelMetrics {
        let total = samples.len();
        let successes = samples.iter().filter(|s| s.success).count();

        // Failure entries carry a zero latency; averaging them in would
        // reward failing models, so only successful samples count here.
        let latencies: Vec<f64> = samples
            .iter()
            .filter(|s| s.latency_ms > 0.0)
            .map(|s| s.latency_ms)
            .collect();
        let avg_latency_ms = if latencies.is_empty() {
            f64::INFINITY
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        };

        let avg_max_tokens =
            samples.iter().map(|s| f64::from(s.max_tokens)).sum::<f64>() / total as f64;

        ModelMetrics {
            avg_latency_ms,
            success_rate: successes as f64 / total as f64,
            avg_max_tokens,
            samples: total,
        }
    }
}

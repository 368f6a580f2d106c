//! Concurrent probing of eligible models.

use crate::config::EngineConfig;
use crate::cooldown::CooldownManager;
use crate::rotator::CredentialPool;
use crate::stats::StatsStore;
use chrono::{DateTime, Utc};
use router_core::{ModelClient, ModelId, ProbeSample};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// What happened to one model during a probe pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeStatus {
    /// A credential succeeded; the sample was recorded.
    Succeeded {
        /// Observed latency in milliseconds.
        latency_ms: f64,
        /// Token figure reported by the provider.
        max_tokens: u32,
    },
    /// Every credential failed, or the per-model deadline fired; the model
    /// entered cooldown.
    Exhausted,
}

/// Per-model probe result.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    /// Probed model.
    pub model: ModelId,
    /// What happened.
    pub status: ProbeStatus,
}

/// Result of one full probe pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    /// Outcomes for every probed model, in model-id order.
    pub outcomes: Vec<ProbeOutcome>,
    /// Catalog models skipped because they were in cooldown.
    pub skipped: Vec<ModelId>,
}

/// Concurrently exercises every eligible model once, recording outcomes
/// into the stats store and the cooldown manager.
#[derive(Clone)]
pub struct Prober {
    client: Arc<dyn ModelClient>,
    pool: Arc<CredentialPool>,
    stats: Arc<StatsStore>,
    cooldowns: Arc<CooldownManager>,
    concurrency: usize,
    timeout: Duration,
    prompt: String,
}

impl Prober {
    /// Create a prober over the shared engine structures.
    pub fn new(
        client: Arc<dyn ModelClient>,
        pool: Arc<CredentialPool>,
        stats: Arc<StatsStore>,
        cooldowns: Arc<CooldownManager>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            client,
            pool,
            stats,
            cooldowns,
            concurrency: config.probe_concurrency.max(1),
            timeout: config.probe_timeout,
            prompt: config.rank_prompt.clone(),
        }
    }

    /// Probe every cooldown-eligible model in `catalog` once.
    ///
    /// Fan-out is bounded by the configured concurrency; each model's probe
    /// is an isolated failure domain, so one exhausted or timed-out model
    /// never aborts its siblings. Returns only after every probe has
    /// completed or been abandoned by its deadline.
    pub async fn rank_all(&self, catalog: &[ModelId], now: DateTime<Utc>) -> ProbeReport {
        let mut report = ProbeReport::default();
        let mut eligible = Vec::new();
        for model in catalog {
            if self.cooldowns.is_eligible(model, now) {
                eligible.push(model.clone());
            } else {
                debug!(model = %model, "skipping model in cooldown");
                report.skipped.push(model.clone());
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(eligible.len());
        for model in eligible {
            let prober = self.clone();
            let semaphore = Arc::clone(&semaphore);
            handles.push(tokio::spawn(async move {
                // Holding the permit for the whole probe is what bounds the
                // upstream fan-out. A closed semaphore cannot happen while
                // the Arc is alive; fall through unthrottled if it does.
                let _permit = semaphore.acquire_owned().await.ok();
                prober.probe_model(model, now).await
            }));
        }

        for handle in handles {
            match handle.await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(err) => warn!(error = %err, "probe task failed to join"),
            }
        }
        report.outcomes.sort_by(|a, b| a.model.cmp(&b.model));
        report
    }

    /// Probe one model: rotate through the credential pool under the
    /// per-model deadline; first success wins.
    async fn probe_model(&self, model: ModelId, now: DateTime<Utc>) -> ProbeOutcome {
        let attempt_rotation = self.try_credentials(&model);
        let status = match tokio::time::timeout(self.timeout, attempt_rotation).await {
            Ok(Some(status)) => status,
            Ok(None) => {
                warn!(model = %model, credentials = self.pool.len(), "all credentials exhausted");
                ProbeStatus::Exhausted
            }
            Err(_) => {
                warn!(model = %model, timeout_ms = self.timeout.as_millis() as u64, "probe deadline fired");
                ProbeStatus::Exhausted
            }
        };

        if status == ProbeStatus::Exhausted {
            self.stats.record(&model, ProbeSample::failure());
            self.cooldowns.mark_failed(&model, now);
        }

        ProbeOutcome { model, status }
    }

    /// Try each credential in pool order; record and return on the first
    /// success, `None` when every credential failed.
    async fn try_credentials(&self, model: &ModelId) -> Option<ProbeStatus> {
        for (attempt, credential) in self.pool.attempts().enumerate() {
            match self.client.invoke(model, credential, &self.prompt).await {
                Ok(invocation) => {
                    debug!(
                        model = %model,
                        attempt = attempt,
                        latency_ms = invocation.latency_ms,
                        "probe succeeded"
                    );
                    self.stats.record(
                        model,
                        ProbeSample::success(invocation.latency_ms, invocation.max_tokens),
                    );
                    return Some(ProbeStatus::Succeeded {
                        latency_ms: invocation.latency_ms,
                        max_tokens: invocation.max_tokens,
                    });
                }
                Err(err) => {
                    debug!(model = %model, attempt = attempt, error = %err, "probe attempt failed");
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use router_core::{ApiKey, Invocation, RouterError, RouterResult};
    use std::collections::BTreeMap;

    /// Scripted client: fails a model until a given credential is reached.
    struct ScriptedClient {
        /// model id -> index of the first credential that succeeds, or
        /// `None` to fail every attempt.
        succeed_at: BTreeMap<String, Option<usize>>,
        attempts: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedClient {
        fn new(succeed_at: &[(&str, Option<usize>)]) -> Self {
            Self {
                succeed_at: succeed_at
                    .iter()
                    .map(|(m, i)| ((*m).to_string(), *i))
                    .collect(),
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts_for(&self, model: &str) -> Vec<String> {
            self.attempts
                .lock()
                .iter()
                .filter(|(m, _)| m == model)
                .map(|(_, key)| key.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn invoke(
            &self,
            model: &ModelId,
            credential: &ApiKey,
            _prompt: &str,
        ) -> RouterResult<Invocation> {
            let attempt_index = {
                let mut attempts = self.attempts.lock();
                attempts.push((model.to_string(), credential.expose().to_string()));
                attempts.iter().filter(|(m, _)| m == model.as_str()).count() - 1
            };

            match self.succeed_at.get(model.as_str()).copied().flatten() {
                Some(index) if attempt_index >= index => Ok(Invocation {
                    latency_ms: 120.0,
                    max_tokens: 8192,
                    text: "hi".to_string(),
                }),
                _ => Err(RouterError::provider(
                    "scripted",
                    "simulated failure",
                    Some(429),
                    true,
                )),
            }
        }

        async fn list_models(&self, _credential: &ApiKey) -> RouterResult<Vec<ModelId>> {
            Ok(self.succeed_at.keys().map(ModelId::new).collect())
        }
    }

    fn harness(
        client: ScriptedClient,
    ) -> (Arc<ScriptedClient>, Prober, Arc<StatsStore>, Arc<CooldownManager>) {
        let client = Arc::new(client);
        let pool = Arc::new(CredentialPool::new(vec![
            ApiKey::new("key-1"),
            ApiKey::new("key-2"),
            ApiKey::new("key-3"),
        ]));
        let stats = Arc::new(StatsStore::new(20));
        let cooldowns = Arc::new(CooldownManager::new(Duration::from_secs(60)));
        let prober = Prober::new(
            Arc::clone(&client) as Arc<dyn ModelClient>,
            pool,
            Arc::clone(&stats),
            Arc::clone(&cooldowns),
            &EngineConfig::default(),
        );
        (client, prober, stats, cooldowns)
    }

    #[tokio::test]
    async fn test_rotation_stops_at_first_success() {
        // First two credentials fail, the third succeeds.
        let (client, prober, stats, cooldowns) = harness(ScriptedClient::new(&[("m", Some(2))]));
        let now = Utc::now();

        let report = prober.rank_all(&[ModelId::from("m")], now).await;

        assert_eq!(report.outcomes.len(), 1);
        assert!(matches!(
            report.outcomes[0].status,
            ProbeStatus::Succeeded { .. }
        ));
        assert_eq!(
            client.attempts_for("m"),
            vec!["key-1", "key-2", "key-3"],
            "exactly the first two credentials were attempted before the third"
        );
        assert!(cooldowns.is_eligible(&ModelId::from("m"), now));

        let metrics = stats.snapshot()[&ModelId::from("m")];
        assert!((metrics.success_rate - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_exhaustion_records_failure_and_cooldown() {
        let (client, prober, stats, cooldowns) = harness(ScriptedClient::new(&[("m", None)]));
        let now = Utc::now();

        let report = prober.rank_all(&[ModelId::from("m")], now).await;

        assert_eq!(report.outcomes[0].status, ProbeStatus::Exhausted);
        assert_eq!(client.attempts_for("m").len(), 3);
        assert!(!cooldowns.is_eligible(&ModelId::from("m"), now));

        let metrics = stats.snapshot()[&ModelId::from("m")];
        assert!((metrics.success_rate - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_failure_domains_are_isolated() {
        let (_, prober, stats, cooldowns) = harness(ScriptedClient::new(&[
            ("bad", None),
            ("good", Some(0)),
        ]));
        let now = Utc::now();

        let report = prober
            .rank_all(&[ModelId::from("bad"), ModelId::from("good")], now)
            .await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[0].model, ModelId::from("bad"));
        assert_eq!(report.outcomes[0].status, ProbeStatus::Exhausted);
        assert!(matches!(
            report.outcomes[1].status,
            ProbeStatus::Succeeded { .. }
        ));

        assert!(!cooldowns.is_eligible(&ModelId::from("bad"), now));
        assert!(cooldowns.is_eligible(&ModelId::from("good"), now));
        assert_eq!(stats.snapshot().len(), 2);
    }

    /// Client where one model never answers and the rest reply at once.
    struct StallingClient {
        stalled: ModelId,
    }

    #[async_trait]
    impl ModelClient for StallingClient {
        async fn invoke(
            &self,
            model: &ModelId,
            _credential: &ApiKey,
            _prompt: &str,
        ) -> RouterResult<Invocation> {
            if model == &self.stalled {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(Invocation {
                latency_ms: 80.0,
                max_tokens: 4096,
                text: "hi".to_string(),
            })
        }

        async fn list_models(&self, _credential: &ApiKey) -> RouterResult<Vec<ModelId>> {
            Ok(vec![self.stalled.clone()])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_arms_cooldown_without_aborting_siblings() {
        let client = Arc::new(StallingClient {
            stalled: ModelId::from("slow"),
        });
        let pool = Arc::new(CredentialPool::new(vec![ApiKey::new("key-1")]));
        let stats = Arc::new(StatsStore::new(20));
        let cooldowns = Arc::new(CooldownManager::new(Duration::from_secs(60)));
        let config = EngineConfig::default().with_probe_timeout(Duration::from_millis(100));
        let prober = Prober::new(
            client,
            pool,
            Arc::clone(&stats),
            Arc::clone(&cooldowns),
            &config,
        );
        let now = Utc::now();

        let report = prober
            .rank_all(&[ModelId::from("fast"), ModelId::from("slow")], now)
            .await;

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.outcomes[1].model, ModelId::from("slow"));
        assert_eq!(report.outcomes[1].status, ProbeStatus::Exhausted);
        assert!(!cooldowns.is_eligible(&ModelId::from("slow"), now));

        assert!(matches!(
            report.outcomes[0].status,
            ProbeStatus::Succeeded { .. }
        ));
        assert!(cooldowns.is_eligible(&ModelId::from("fast"), now));

        let metrics = stats.snapshot()[&ModelId::from("slow")];
        assert!((metrics.success_rate - 0.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_models_in_cooldown_are_skipped() {
        let (client, prober, _, cooldowns) = harness(ScriptedClient::new(&[("m", Some(0))]));
        let now = Utc::now();
        cooldowns.mark_failed(&ModelId::from("m"), now);

        let report = prober.rank_all(&[ModelId::from("m")], now).await;

        assert!(report.outcomes.is_empty());
        assert_eq!(report.skipped, vec![ModelId::from("m")]);
        assert!(client.attempts_for("m").is_empty());
    }
}

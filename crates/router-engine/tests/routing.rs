//! End-to-end flow: probe, classify, route.

use async_trait::async_trait;
use chrono::Utc;
use router_core::{ApiKey, Invocation, ModelClient, ModelId, RouterError, RouterResult, Tier};
use router_engine::{CooldownManager, CredentialPool, EngineConfig, Prober, Router, StatsStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Client with fixed per-model behaviour: latency/token figures for models
/// that answer, failure for the rest.
struct FixtureClient {
    responses: BTreeMap<String, (f64, u32)>,
}

impl FixtureClient {
    fn new(responses: &[(&str, f64, u32)]) -> Self {
        Self {
            responses: responses
                .iter()
                .map(|(m, latency, tokens)| ((*m).to_string(), (*latency, *tokens)))
                .collect(),
        }
    }
}

#[async_trait]
impl ModelClient for FixtureClient {
    async fn invoke(
        &self,
        model: &ModelId,
        _credential: &ApiKey,
        _prompt: &str,
    ) -> RouterResult<Invocation> {
        match self.responses.get(model.as_str()) {
            Some((latency_ms, max_tokens)) => Ok(Invocation {
                latency_ms: *latency_ms,
                max_tokens: *max_tokens,
                text: "ok".to_string(),
            }),
            None => Err(RouterError::provider(
                "fixture",
                "model unavailable",
                Some(503),
                true,
            )),
        }
    }

    async fn list_models(&self, _credential: &ApiKey) -> RouterResult<Vec<ModelId>> {
        Ok(self.responses.keys().map(ModelId::new).collect())
    }
}

fn engine(
    client: FixtureClient,
) -> (Prober, Router, Arc<StatsStore>, Arc<CooldownManager>) {
    let config = EngineConfig::default().with_cooldown(Duration::from_secs(60));
    let stats = Arc::new(StatsStore::new(config.rolling_window));
    let cooldowns = Arc::new(CooldownManager::new(config.cooldown));
    let pool = Arc::new(CredentialPool::new(vec![
        ApiKey::new("key-1"),
        ApiKey::new("key-2"),
    ]));
    let prober = Prober::new(
        Arc::new(client),
        pool,
        Arc::clone(&stats),
        Arc::clone(&cooldowns),
        &config,
    );
    let router = Router::new(Arc::clone(&stats), Arc::clone(&cooldowns));
    (prober, router, stats, cooldowns)
}

#[tokio::test]
async fn probe_then_route_picks_fastest_balanced_model() {
    let (prober, router, stats, _) = engine(FixtureClient::new(&[
        ("model-a", 100.0, 1000),
        ("model-b", 500.0, 2000),
        ("model-c", 50.0, 500),
    ]));
    let now = Utc::now();
    let catalog: Vec<ModelId> = ["model-a", "model-b", "model-c"]
        .iter()
        .map(|m| ModelId::from(*m))
        .collect();

    let report = prober.rank_all(&catalog, now).await;
    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(stats.snapshot().len(), 3);

    // Balance scores: a = 100 - 100 = 0, b = 500 - 200 = 300,
    // c = 50 - 50 = 0; the a/c tie breaks on model id.
    let chosen = router.route(now, None).expect("route");
    assert_eq!(chosen, ModelId::from("model-a"));
}

#[tokio::test]
async fn exhausted_model_cools_down_and_routing_avoids_it() {
    let (prober, router, _, cooldowns) = engine(FixtureClient::new(&[
        ("model-b", 500.0, 2000),
        // model-a missing: every credential fails for it.
    ]));
    let now = Utc::now();
    let catalog = vec![ModelId::from("model-a"), ModelId::from("model-b")];

    prober.rank_all(&catalog, now).await;

    assert!(!cooldowns.is_eligible(&ModelId::from("model-a"), now));
    assert_eq!(router.route(now, None).expect("route"), ModelId::from("model-b"));

    // Once the cooldown lapses the failed model is probeable again, but its
    // failure sample keeps its balance score behind the healthy model.
    let later = now + chrono::Duration::seconds(61);
    assert!(cooldowns.is_eligible(&ModelId::from("model-a"), later));
    assert_eq!(router.route(later, None).expect("route"), ModelId::from("model-b"));
}

#[tokio::test]
async fn lock_bypasses_probing_state_entirely() {
    let (prober, router, _, _) = engine(FixtureClient::new(&[("model-a", 100.0, 1000)]));
    let now = Utc::now();

    prober.rank_all(&[ModelId::from("model-a")], now).await;
    router.lock(ModelId::from("never-probed"));

    assert_eq!(
        router.route(now, Some(Tier::S)).expect("route"),
        ModelId::from("never-probed")
    );

    router.unlock();
    assert_eq!(router.route(now, None).expect("route"), ModelId::from("model-a"));
}

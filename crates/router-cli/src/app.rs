//! Shared command context: configuration, persisted state, engine wiring.

use chrono::{DateTime, Utc};
use router_core::{ModelClient, ModelId, RouterResult};
use router_engine::{CooldownManager, CredentialPool, Prober, Router, StatsStore};
use router_providers::GeminiClient;
use router_state::{
    load_or_default, save_record, JsonFileStore, PersistedCooldowns, PersistedRouterState,
    PersistedStats, COOLDOWNS_RECORD, ROUTER_STATE_RECORD, STATS_RECORD,
};
use std::path::Path;
use std::sync::Arc;

use crate::config::CliConfig;

/// Everything a command needs: configuration from the environment, the
/// three engine structures restored from the state store, and save helpers
/// that write each structure back as one atomic record.
pub struct App {
    /// Environment configuration.
    pub config: CliConfig,
    /// Rolling statistics, restored from the `stats` record.
    pub stats: Arc<StatsStore>,
    /// Cooldowns, restored from the `cooldowns` record.
    pub cooldowns: Arc<CooldownManager>,
    /// Router with restored lock state.
    pub router: Router,
    store: JsonFileStore,
}

impl App {
    /// Load configuration and persisted state.
    ///
    /// Malformed records reset to their defaults with a warning; read
    /// failures abort rather than proceeding on stale assumptions.
    pub async fn load(state_dir: &Path) -> RouterResult<Self> {
        let config = CliConfig::from_env()?;
        let store = JsonFileStore::new(state_dir);

        let stats_record: PersistedStats = load_or_default(&store, STATS_RECORD).await?;
        let cooldowns_record: PersistedCooldowns =
            load_or_default(&store, COOLDOWNS_RECORD).await?;
        let state_record: PersistedRouterState =
            load_or_default(&store, ROUTER_STATE_RECORD).await?;

        let stats = Arc::new(StatsStore::from_persisted(
            config.engine.rolling_window,
            stats_record,
        ));
        let cooldowns = Arc::new(CooldownManager::from_persisted(
            config.engine.cooldown,
            cooldowns_record,
        ));
        let router = Router::from_persisted(
            Arc::clone(&stats),
            Arc::clone(&cooldowns),
            state_record,
        );

        Ok(Self {
            config,
            stats,
            cooldowns,
            router,
            store,
        })
    }

    /// Build the upstream client.
    pub fn client(&self) -> RouterResult<Arc<dyn ModelClient>> {
        Ok(Arc::new(GeminiClient::with_defaults()?))
    }

    /// Build a prober over the shared structures.
    pub fn prober(&self, client: Arc<dyn ModelClient>, pool: CredentialPool) -> Prober {
        Prober::new(
            client,
            Arc::new(pool),
            Arc::clone(&self.stats),
            Arc::clone(&self.cooldowns),
            &self.config.engine,
        )
    }

    /// The model catalog: `ROUTER_MODELS` when set, otherwise discovered
    /// through the provider with the first credential.
    pub async fn catalog(&self, client: &dyn ModelClient) -> RouterResult<Vec<ModelId>> {
        if let Some(models) = &self.config.models {
            return Ok(models.clone());
        }
        let pool = self.config.credentials()?;
        let first = pool
            .attempts()
            .next()
            .cloned()
            .ok_or_else(|| router_core::RouterError::configuration("empty credential pool"))?;
        client.list_models(&first).await
    }

    /// Persist the rolling statistics.
    pub async fn save_stats(&self) -> RouterResult<()> {
        save_record(&self.store, STATS_RECORD, &self.stats.to_persisted()).await
    }

    /// Persist the active cooldowns.
    pub async fn save_cooldowns(&self, now: DateTime<Utc>) -> RouterResult<()> {
        save_record(&self.store, COOLDOWNS_RECORD, &self.cooldowns.to_persisted(now)).await
    }

    /// Persist the router lock state.
    pub async fn save_router_state(&self) -> RouterResult<()> {
        save_record(&self.store, ROUTER_STATE_RECORD, &self.router.to_persisted()).await
    }
}

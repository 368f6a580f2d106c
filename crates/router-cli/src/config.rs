//! Environment configuration surface.

use router_core::{ApiKey, ModelId, RouterError, RouterResult};
use router_engine::{CredentialPool, EngineConfig};
use std::time::Duration;

/// Variable prefix for credentials: `GEMINI_API_KEY`, `GEMINI_API_KEY_2`,
/// and so on. Rotation order is the lexicographic order of the variable
/// names.
const API_KEY_PREFIX: &str = "GEMINI_API_KEY";

/// Configuration assembled from the environment.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Engine tunables.
    pub engine: EngineConfig,
    /// Ordered credential pool. May be empty; commands that talk to the
    /// upstream check via [`CliConfig::credentials`].
    pub pool: CredentialPool,
    /// Explicit model catalog, when `ROUTER_MODELS` is set. Absent means
    /// discover via the provider.
    pub models: Option<Vec<ModelId>>,
}

impl CliConfig {
    /// Read the configuration from process environment variables.
    ///
    /// # Errors
    /// `Configuration` when a numeric variable does not parse.
    pub fn from_env() -> RouterResult<Self> {
        let mut engine = EngineConfig::default();
        if let Some(window) = env_parse::<usize>("ROUTER_ROLLING_WINDOW")? {
            engine = engine.with_rolling_window(window);
        }
        if let Some(secs) = env_parse::<u64>("ROUTER_COOLDOWN_SECS")? {
            engine = engine.with_cooldown(Duration::from_secs(secs));
        }
        if let Some(concurrency) = env_parse::<usize>("ROUTER_PROBE_CONCURRENCY")? {
            engine = engine.with_probe_concurrency(concurrency);
        }
        if let Some(secs) = env_parse::<u64>("ROUTER_PROBE_TIMEOUT_SECS")? {
            engine = engine.with_probe_timeout(Duration::from_secs(secs));
        }

        let pool = collect_api_keys(std::env::vars());
        let models = std::env::var("ROUTER_MODELS")
            .ok()
            .map(|raw| parse_model_list(&raw))
            .filter(|models| !models.is_empty());

        Ok(Self {
            engine,
            pool,
            models,
        })
    }

    /// The credential pool, required to be non-empty.
    ///
    /// # Errors
    /// `Configuration` when no `GEMINI_API_KEY*` variable is set.
    pub fn credentials(&self) -> RouterResult<&CredentialPool> {
        if self.pool.is_empty() {
            return Err(RouterError::configuration(format!(
                "no {API_KEY_PREFIX}* environment variables found"
            )));
        }
        Ok(&self.pool)
    }
}

/// Collect `GEMINI_API_KEY*` variables into a pool, ordered by variable
/// name so the rotation order is stable across runs.
fn collect_api_keys(vars: impl Iterator<Item = (String, String)>) -> CredentialPool {
    let mut named: Vec<(String, String)> = vars
        .filter(|(name, value)| name.starts_with(API_KEY_PREFIX) && !value.is_empty())
        .collect();
    named.sort_by(|a, b| a.0.cmp(&b.0));
    CredentialPool::new(named.into_iter().map(|(_, value)| ApiKey::new(value)).collect())
}

/// Parse a comma-separated model list.
fn parse_model_list(raw: &str) -> Vec<ModelId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ModelId::from)
        .collect()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> RouterResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            RouterError::configuration(format!("{name} is not a valid value: '{raw}'"))
        }),
        Err(_) => Ok(None),
    }
}

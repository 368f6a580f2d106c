//! Engine configuration.

use std::time::Duration;

/// Default bound on the rolling sample window per model.
pub const DEFAULT_ROLLING_WINDOW: usize = 20;

/// Default cooldown applied after total credential exhaustion.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Default number of models probed concurrently.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 8;

/// Default per-model probe deadline.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default prompt sent when probing a model.
pub const DEFAULT_RANK_PROMPT: &str = "Say hi.";

/// Tunables for the routing engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum samples retained per model; oldest evicted first.
    pub rolling_window: usize,
    /// How long a model stays ineligible after exhausting every credential.
    pub cooldown: Duration,
    /// Bound on concurrently running probes.
    pub probe_concurrency: usize,
    /// Deadline for one model's whole probe, rotation included.
    pub probe_timeout: Duration,
    /// Prompt sent by the prober.
    pub rank_prompt: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            cooldown: DEFAULT_COOLDOWN,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            rank_prompt: DEFAULT_RANK_PROMPT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Set the rolling window size.
    #[must_use]
    pub fn with_rolling_window(mut self, window: usize) -> Self {
        self.rolling_window = window;
        self
    }

    /// Set the cooldown duration.
    #[must_use]
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the probe concurrency bound.
    #[must_use]
    pub fn with_probe_concurrency(mut self, concurrency: usize) -> Self {
        self.probe_concurrency = concurrency.max(1);
        self
    }

    /// Set the per-model probe deadline.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the probe prompt.
    #[must_use]
    pub fn with_rank_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.rank_prompt = prompt.into();
        self
    }
}

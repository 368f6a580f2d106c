//! The upstream model client capability.

use crate::error::RouterResult;
use crate::types::{ApiKey, ModelId};
use async_trait::async_trait;

/// Outcome of a successful model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Wall-clock latency of the call in milliseconds.
    pub latency_ms: f64,
    /// Token figure reported by the provider for this call.
    pub max_tokens: u32,
    /// Generated text.
    pub text: String,
}

/// Capability for invoking upstream models.
///
/// The routing core never talks to the network directly; it drives this
/// trait with one credential at a time and interprets failures through
/// [`crate::RouterError`]. Implementations live in provider crates.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Invoke `model` with `credential`, sending `prompt`.
    ///
    /// # Errors
    /// Returns a provider or timeout error when the call fails; the caller
    /// decides whether to rotate to the next credential.
    async fn invoke(
        &self,
        model: &ModelId,
        credential: &ApiKey,
        prompt: &str,
    ) -> RouterResult<Invocation>;

    /// List models usable for generation with `credential`.
    ///
    /// # Errors
    /// Returns a provider error when discovery fails.
    async fn list_models(&self, credential: &ApiKey) -> RouterResult<Vec<ModelId>>;
}

//! Google AI Studio (Gemini) model client.
//!
//! Talks to the `generativelanguage.googleapis.com` API:
//! - invoke: `POST /v1beta/models/{MODEL}:generateContent?key={KEY}`
//! - discovery: `GET /v1beta/models?key={KEY}`

use async_trait::async_trait;
use reqwest::Client;
use router_core::{ApiKey, Invocation, ModelClient, ModelId, RouterError, RouterResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const PROVIDER: &str = "gemini";

/// Name fragments identifying models that cannot serve plain generation
/// probes (speech, image, reasoning-only and experimental variants).
const EXCLUDED_NAME_FRAGMENTS: &[&str] = &["tts", "image", "thinking", "exp", "gemma"];

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl GeminiConfig {
    /// Override the base URL (self-hosted proxies, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Gemini implementation of [`ModelClient`].
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns a provider error when the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> RouterResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| RouterError::provider(PROVIDER, err.to_string(), None, false))?;
        Ok(Self { config, client })
    }

    /// Create a client with default configuration.
    ///
    /// # Errors
    /// Returns a provider error when the HTTP client cannot be built.
    pub fn with_defaults() -> RouterResult<Self> {
        Self::new(GeminiConfig::default())
    }

    fn generate_url(&self, model: &ModelId) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }

    fn map_transport_error(model: &ModelId, started: Instant, err: &reqwest::Error) -> RouterError {
        if err.is_timeout() {
            RouterError::timeout(model.as_str(), started.elapsed().as_millis() as u64)
        } else {
            RouterError::provider(PROVIDER, err.to_string(), None, true)
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn invoke(
        &self,
        model: &ModelId,
        credential: &ApiKey,
        prompt: &str,
    ) -> RouterResult<Invocation> {
        let url = self.generate_url(model);
        let body = GenerateContentRequest::from_prompt(prompt);
        trace!(model = %model, url = %url, "sending generateContent request");

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .query(&[("key", credential.expose())])
            .json(&body)
            .send()
            .await
            .map_err(|err| Self::map_transport_error(model, started, &err))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RouterError::provider(
                PROVIDER,
                format!("HTTP {status}: {message}"),
                Some(status.as_u16()),
                status.as_u16() == 429 || status.is_server_error(),
            ));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| Self::map_transport_error(model, started, &err))?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(model = %model, latency_ms = latency_ms, "generateContent succeeded");
        Ok(Invocation {
            latency_ms,
            max_tokens: parsed.token_count(),
            text: parsed.text(),
        })
    }

    async fn list_models(&self, credential: &ApiKey) -> RouterResult<Vec<ModelId>> {
        let url = self.models_url();
        let started = Instant::now();
        let discovery_id = ModelId::from("models.list");

        let response = self
            .client
            .get(&url)
            .query(&[("key", credential.expose())])
            .send()
            .await
            .map_err(|err| Self::map_transport_error(&discovery_id, started, &err))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RouterError::provider(
                PROVIDER,
                format!("HTTP {status}: {message}"),
                Some(status.as_u16()),
                status.as_u16() == 429 || status.is_server_error(),
            ));
        }

        let parsed: ListModelsResponse = response
            .json()
            .await
            .map_err(|err| Self::map_transport_error(&discovery_id, started, &err))?;

        let models = parsed.usable_models();
        debug!(count = models.len(), "model discovery completed");
        Ok(models)
    }
}

// --- Wire format ---

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    fn text(&self) -> String {
        self.candidates
            .iter()
            .flat_map(|c| c.content.iter())
            .flat_map(|content| content.parts.iter())
            .map(|part| part.text.as_str())
            .collect()
    }

    /// The response carries no output-token limit, so the best available
    /// token figure is the usage total.
    fn token_count(&self) -> u32 {
        self.usage_metadata
            .as_ref()
            .and_then(|usage| usage.total_token_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

impl ListModelsResponse {
    fn usable_models(&self) -> Vec<ModelId> {
        self.models
            .iter()
            .filter(|entry| {
                entry
                    .supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .filter(|entry| {
                let lower = entry.name.to_lowercase();
                !EXCLUDED_NAME_FRAGMENTS
                    .iter()
                    .any(|fragment| lower.contains(fragment))
            })
            .map(|entry| {
                let name = entry.name.strip_prefix("models/").unwrap_or(&entry.name);
                ModelId::from(name)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

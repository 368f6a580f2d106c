//! Error types for the tier router.

use thiserror::Error;

/// Convenience alias for results returned by router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors produced by the routing core and its collaborators.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Every configured credential failed for a model during one operation.
    ///
    /// The prober recovers from this locally by arming a cooldown; it is
    /// only surfaced when the caller asked for that specific model.
    #[error("all credentials exhausted for model '{model}'")]
    CredentialExhausted {
        /// Model that exhausted the pool.
        model: String,
    },

    /// No unlocked, cooldown-free model with recorded stats exists.
    #[error("no available model is eligible for routing")]
    NoEligibleModel,

    /// An upstream provider rejected or failed a request.
    #[error("provider '{provider}' error: {message}")]
    Provider {
        /// Provider identifier.
        provider: String,
        /// Human-readable description.
        message: String,
        /// HTTP status code, when the failure came from a response.
        status_code: Option<u16>,
        /// Whether another credential is worth trying.
        retryable: bool,
    },

    /// A probe or invocation exceeded its deadline.
    #[error("model '{model}' timed out after {elapsed_ms}ms")]
    Timeout {
        /// Model that timed out.
        model: String,
        /// Elapsed time before the deadline fired.
        elapsed_ms: u64,
    },

    /// The state store failed to read or write a record.
    #[error("persistence failure for record '{record}': {source}")]
    Persistence {
        /// Record key (`stats`, `cooldowns`, `router_state`).
        record: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A persisted record failed to parse.
    ///
    /// Loaders recover by resetting the record to its default value; this
    /// variant exists for callers that need the parse failure itself.
    #[error("malformed persisted record '{record}': {message}")]
    MalformedState {
        /// Record key.
        record: String,
        /// Parse error description.
        message: String,
    },

    /// The environment configuration is unusable.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RouterError {
    /// Create a credential-exhaustion error.
    pub fn credential_exhausted(model: impl Into<String>) -> Self {
        Self::CredentialExhausted {
            model: model.into(),
        }
    }

    /// Create a provider error.
    pub fn provider(
        provider: impl Into<String>,
        message: impl Into<String>,
        status_code: Option<u16>,
        retryable: bool,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code,
            retryable,
        }
    }

    /// Create a timeout error.
    pub fn timeout(model: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Timeout {
            model: model.into(),
            elapsed_ms,
        }
    }

    /// Create a persistence error for the named record.
    pub fn persistence(record: impl Into<String>, source: std::io::Error) -> Self {
        Self::Persistence {
            record: record.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether trying the next credential could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

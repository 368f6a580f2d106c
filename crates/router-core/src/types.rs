//! Domain types for the tier router.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of an upstream model (e.g. `gemini-1.5-flash`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    /// Create a new model id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// An API credential for an upstream provider.
///
/// The secret value is only exposed at the HTTP call site.
#[derive(Debug, Clone)]
pub struct ApiKey {
    value: SecretString,
}

impl ApiKey {
    /// Create a new API key.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: SecretString::new(value.into()),
        }
    }

    /// Expose the secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }
}

/// Percentile bucket of models ranked by a metric.
///
/// `S` is the top 20%, `A` the next 30%, `B` the next 30%, and `C` the
/// remaining 20%.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Tier {
    /// Top 20%.
    S,
    /// Next 30%.
    A,
    /// Next 30%.
    B,
    /// Bottom 20%.
    C,
}

impl Tier {
    /// All tiers, best first. This is the fall-through order used by the
    /// router when a tier has no members.
    pub const DESCENDING: [Self; 4] = [Self::S, Self::A, Self::B, Self::C];
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        };
        f.write_str(s)
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "S" => Ok(Self::S),
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            other => Err(format!("unknown tier '{other}' (expected S, A, B, or C)")),
        }
    }
}

/// One probe outcome for a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSample {
    /// Observed latency in milliseconds. Zero for failed probes.
    pub latency_ms: f64,
    /// Whether the probe succeeded.
    pub success: bool,
    /// Token figure reported by the provider. Zero for failed probes.
    pub max_tokens: u32,
    /// When the sample was taken.
    pub timestamp: DateTime<Utc>,
}

impl ProbeSample {
    /// Sample for a successful probe, timestamped now.
    #[must_use]
    pub fn success(latency_ms: f64, max_tokens: u32) -> Self {
        Self {
            latency_ms,
            success: true,
            max_tokens,
            timestamp: Utc::now(),
        }
    }

    /// Sample for a probe that exhausted every credential, timestamped now.
    #[must_use]
    pub fn failure() -> Self {
        Self {
            latency_ms: 0.0,
            success: false,
            max_tokens: 0,
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate metrics derived from a model's rolling sample window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelMetrics {
    /// Mean latency over successful samples, in milliseconds.
    ///
    /// `f64::INFINITY` when the window holds no successful sample, which
    /// ranks the model last on every latency-sensitive dimension.
    pub avg_latency_ms: f64,
    /// Fraction of successful samples in the window.
    pub success_rate: f64,
    /// Mean token figure over all samples in the window.
    pub avg_max_tokens: f64,
    /// Number of samples currently in the window.
    pub samples: usize,
}

impl ModelMetrics {
    /// Composite score folding reliability, speed, and capacity into one
    /// rankable number; lower is better.
    ///
    /// The 1000 weight on the failure term makes any success-rate
    /// degradation dominate latency and token differences.
    #[must_use]
    pub fn balance_score(&self) -> f64 {
        (1.0 - self.success_rate) * 1000.0 + self.avg_latency_ms - self.avg_max_tokens * 0.1
    }
}

/// Tier placement of one model across the three ranked dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierAssignment {
    /// Rank by average latency, ascending.
    pub latency: Tier,
    /// Rank by average token figure, descending.
    pub tokens: Tier,
    /// Rank by balance score, ascending.
    pub balance: Tier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_ordering() {
        let a = ModelId::from("gemini-1.5-flash");
        let b = ModelId::from("gemini-1.5-pro");
        assert!(a < b);
        assert_eq!(a.as_str(), "gemini-1.5-flash");
    }

    #[test]
    fn test_tier_parse_and_display() {
        assert_eq!("s".parse::<Tier>(), Ok(Tier::S));
        assert_eq!("A".parse::<Tier>(), Ok(Tier::A));
        assert!("X".parse::<Tier>().is_err());
        assert_eq!(Tier::B.to_string(), "B");
    }

    #[test]
    fn test_balance_score() {
        let metrics = ModelMetrics {
            avg_latency_ms: 100.0,
            success_rate: 1.0,
            avg_max_tokens: 1000.0,
            samples: 10,
        };
        assert!((metrics.balance_score() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_balance_score_monotonic_in_success_rate() {
        let mut prev = f64::NEG_INFINITY;
        for step in 0..=10 {
            let metrics = ModelMetrics {
                avg_latency_ms: 250.0,
                success_rate: 1.0 - f64::from(step) / 10.0,
                avg_max_tokens: 500.0,
                samples: 20,
            };
            let score = metrics.balance_score();
            assert!(score >= prev, "score must not improve as success rate drops");
            prev = score;
        }
    }

    #[test]
    fn test_probe_sample_serde_round_trip() {
        let sample = ProbeSample::success(123.4, 8192);
        let json = serde_json::to_string(&sample).expect("serialize");
        let back: ProbeSample = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(sample, back);
    }

    #[test]
    fn test_api_key_debug_redacts_secret() {
        let key = ApiKey::new("super-secret");
        let debug = format!("{key:?}");
        assert!(!debug.contains("super-secret"));
    }
}

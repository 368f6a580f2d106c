//! # Router Core
//!
//! Core types, traits, and error handling for the tier router.
//!
//! This crate provides the foundational pieces shared by the engine,
//! persistence, provider, and CLI crates:
//! - Validated domain types (newtypes for model ids and credentials)
//! - Probe samples, derived metrics, and tier levels
//! - The `ModelClient` capability trait
//! - Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use client::{Invocation, ModelClient};
pub use error::{RouterError, RouterResult};
pub use types::{ApiKey, ModelId, ModelMetrics, ProbeSample, Tier, TierAssignment};

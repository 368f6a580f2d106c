//! # Router Providers
//!
//! `ModelClient` implementations for upstream providers.
//!
//! Currently ships the Google AI Studio (Gemini) client. The routing
//! engine only sees the `ModelClient` trait; everything provider-specific
//! stays in this crate.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gemini;

pub use gemini::{GeminiClient, GeminiConfig};

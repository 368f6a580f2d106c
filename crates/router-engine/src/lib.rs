//! # Router Engine
//!
//! The routing-decision core: rolling performance statistics, percentile
//! tier classification, credential rotation with cooldown, and the
//! concurrent probing scheduler that keeps the statistics fresh.
//!
//! All shared structures (`StatsStore`, `CooldownManager`, the router lock
//! state) are process-local and mutated only through their own APIs under
//! an internal lock. Persistence is the caller's concern, through the
//! `router-state` capability.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod cooldown;
pub mod prober;
pub mod rotator;
pub mod router;
pub mod stats;
pub mod tiers;

pub use config::EngineConfig;
pub use cooldown::CooldownManager;
pub use prober::{ProbeOutcome, ProbeReport, ProbeStatus, Prober};
pub use rotator::CredentialPool;
pub use router::Router;
pub use stats::StatsStore;
pub use tiers::{TierClassifier, TierTable};

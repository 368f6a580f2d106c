//! CLI command implementations.

pub mod cooldowns;
pub mod lock;
pub mod rank;
pub mod route;
pub mod stats;
pub mod tiers;
pub mod unlock;

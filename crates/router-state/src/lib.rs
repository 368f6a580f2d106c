//! # Router State
//!
//! Persistence capability for the tier router.
//!
//! The routing core never reasons about files or locking directly; it goes
//! through the [`StateStore`] trait, which offers atomic get/put of named
//! JSON-shaped records. This crate also defines the three persisted record
//! shapes and a JSON-file implementation of the store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod records;
pub mod store;

pub use records::{
    PersistedCooldowns, PersistedRouterState, PersistedStats, COOLDOWNS_RECORD,
    ROUTER_STATE_RECORD, STATS_RECORD,
};
pub use store::{load_or_default, save_record, JsonFileStore, StateStore};

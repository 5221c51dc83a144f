//! Cache module - small typed caches on top of Moka.
//!
//! Two kinds of data are cached in memory:
//! - channel metadata (titles, join links) used to build subscription prompts
//! - ids of recently processed updates, to drop transport redeliveries
//!
//! Membership results are never cached: the gate always asks the platform.

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;

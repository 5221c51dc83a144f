//! Channel subscription gate.
//!
//! Users must be members of every configured channel before codes are
//! served. Membership is asked from the platform on every check; only
//! channel titles and links are cached.

mod gate;

pub use gate::{CHECK_SUBSCRIPTION, SubscriptionGate};

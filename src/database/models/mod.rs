//! Persisted document models.

pub mod analytics;
pub mod content;
pub mod profile;

pub use analytics::AnalyticsEvent;
pub use content::StoredContent;
pub use profile::{DEFAULT_LANGUAGE, ProfileBook, UserProfile};

/// Document and log names, also the file stems of the JSON backend
/// (`<name>.json` for documents, `<name>.jsonl` for the analytics log).
pub mod keys {
    pub const USERS: &str = "users";
    pub const CODES: &str = "codes";
    pub const STATS: &str = "stats";
    pub const ANALYTICS: &str = "analytics";
}

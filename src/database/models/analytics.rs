//! Analytics log entries.

use serde::{Deserialize, Serialize};

/// One entry of the append-only `analytics` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub user_id: u64,
    #[serde(default)]
    pub username: Option<String>,
    pub display_name: String,
    /// Free-form tag: `start`, `video_request_<code>`, ...
    pub action: String,
    /// RFC 3339.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

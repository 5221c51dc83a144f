//! Utility functions.
//!
//! Collection of helper functions used across the bot.

pub mod locks;

pub use locks::KeyedLocks;

/// Format a username for display.
///
/// If the user has a username, returns @username.
/// Otherwise, returns the given fallback.
pub fn format_username(username: Option<&str>, fallback: &str) -> String {
    match username {
        Some(u) => format!("@{}", u),
        None => fallback.to_string(),
    }
}

/// First whitespace-separated token of a command argument string.
pub fn first_token(args: &str) -> Option<&str> {
    args.split_whitespace().next()
}

/// Current time as an RFC 3339 timestamp (UTC, second precision).
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_username() {
        assert_eq!(format_username(Some("alice"), "Alice"), "@alice");
        assert_eq!(format_username(None, "Alice"), "Alice");
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("ref123"), Some("ref123"));
        assert_eq!(first_token("  ref123 extra"), Some("ref123"));
        assert_eq!(first_token("   "), None);
    }
}

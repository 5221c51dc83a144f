//! User profile model.
//!
//! Everything the bot remembers about a user lives here, including the
//! conversation state (awaiting feedback) and the live message id, so a
//! restart resumes exactly where the user left off.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Language for users we have never seen.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Per-user state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default = "default_language")]
    pub language: String,

    /// Next text message is feedback, not a code.
    #[serde(default)]
    pub awaiting_feedback: bool,

    /// The bot message currently shown to this user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<i32>,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            language: default_language(),
            awaiting_feedback: false,
            last_message_id: None,
        }
    }
}

/// A profile as found on disk.
///
/// Older deployments stored a bare language code per user; those entries
/// are accepted and upgraded on the next write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredProfile {
    Full(UserProfile),
    LanguageOnly(String),
}

impl From<StoredProfile> for UserProfile {
    fn from(stored: StoredProfile) -> Self {
        match stored {
            StoredProfile::Full(profile) => profile,
            StoredProfile::LanguageOnly(language) => Self {
                language,
                ..Self::default()
            },
        }
    }
}

/// The `users` document: user id (as string) to profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileBook(pub BTreeMap<String, StoredProfile>);

impl ProfileBook {
    fn key(user_id: u64) -> String {
        user_id.to_string()
    }

    pub fn get(&self, user_id: u64) -> Option<UserProfile> {
        self.0.get(&Self::key(user_id)).cloned().map(UserProfile::from)
    }

    /// Mutable access, creating a default profile for unseen users.
    pub fn entry(&mut self, user_id: u64) -> &mut UserProfile {
        let slot = self
            .0
            .entry(Self::key(user_id))
            .or_insert_with(|| StoredProfile::Full(UserProfile::default()));

        if let StoredProfile::LanguageOnly(language) = &mut *slot {
            *slot = StoredProfile::Full(UserProfile {
                language: std::mem::take(language),
                ..UserProfile::default()
            });
        }

        match slot {
            StoredProfile::Full(profile) => profile,
            StoredProfile::LanguageOnly(_) => unreachable!("upgraded above"),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

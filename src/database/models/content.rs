//! Content entries of the `codes` document.

use serde::{Deserialize, Serialize};

use crate::platform::ContentRef;

/// A content entry as stored.
///
/// The legacy format is a bare string per code: a platform file id, or a
/// URL. The structured form names the reference explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredContent {
    Plain(String),
    Entry {
        #[serde(default, alias = "inlineFileHandle", skip_serializing_if = "Option::is_none")]
        file_id: Option<String>,
        #[serde(default, alias = "remoteUrl", skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

impl StoredContent {
    /// The deliverable reference, or `None` if the entry has nothing to send.
    ///
    /// An inline file id wins over a URL: it needs no re-fetch.
    pub fn to_content_ref(&self) -> Option<ContentRef> {
        match self {
            Self::Plain(raw) => {
                let raw = raw.trim();
                if raw.is_empty() {
                    None
                } else if raw.starts_with("http://") || raw.starts_with("https://") {
                    Some(ContentRef::RemoteUrl(raw.to_string()))
                } else {
                    Some(ContentRef::InlineFile(raw.to_string()))
                }
            }
            Self::Entry { file_id, url } => non_empty(file_id.as_ref())
                .map(ContentRef::InlineFile)
                .or_else(|| non_empty(url.as_ref()).map(ContentRef::RemoteUrl)),
        }
    }
}

//! Platform-independent inbound updates.

use crate::platform::MessageId;
use crate::plugins::Command;

/// Who sent an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: u64,
    pub username: Option<String>,
    /// Full name as shown by the platform.
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Command(Command),
    Text(String),
    Callback {
        id: String,
        data: String,
        /// The bot message carrying the pressed button, if still accessible.
        message_id: Option<MessageId>,
    },
}

/// One decoded update, as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingUpdate {
    /// Platform update id, used to drop redeliveries.
    pub id: u32,
    pub sender: Sender,
    pub chat_id: i64,
    pub kind: UpdateKind,
}

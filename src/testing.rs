//! Test doubles: a scripted chat platform and a memory-backed conversation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::conversation::{Conversation, ConversationSettings, IncomingUpdate, Sender, UpdateKind};
use crate::database::models::keys::CODES;
use crate::database::{MemoryStore, Storage};
use crate::i18n::Translations;
use crate::platform::{
    ChannelRef, ChatInfo, ChatPlatform, ContentRef, Keyboard, MemberStatus, MessageId, PlatformError,
};
use crate::plugins::Command;

#[derive(Default)]
struct MockState {
    next_message_id: MessageId,
    delay: Option<Duration>,
    chat_delays: HashMap<i64, Duration>,

    sent: Vec<(i64, String, Option<Keyboard>)>,
    contents: Vec<(i64, ContentRef)>,
    deleted: Vec<(i64, MessageId)>,
    edits: Vec<(i64, MessageId, String)>,
    callback_answers: Vec<(String, Option<String>, bool)>,

    members: HashMap<(String, u64), MemberStatus>,
    member_errors: HashMap<String, PlatformError>,
    membership_queries: Vec<String>,
    chat_info: HashMap<String, ChatInfo>,
    chat_info_queries: usize,

    failing_chats: HashSet<i64>,
    fail_content: bool,
    fail_deletes: bool,
    fail_edits: bool,
}

impl MockState {
    fn next_id(&mut self) -> MessageId {
        self.next_message_id += 1;
        self.next_message_id
    }
}

/// In-memory [`ChatPlatform`] that records every call.
///
/// Unknown memberships are `Left`, unknown chats fail with "chat not found".
#[derive(Clone, Default)]
pub struct MockPlatform {
    state: Arc<Mutex<MockState>>,
}

fn failed(what: &str) -> PlatformError {
    PlatformError::Api(format!("{} failed", what))
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().delay = Some(delay);
    }

    /// Sends to `chat_id` sleep this long before answering.
    pub fn set_chat_delay(&self, chat_id: i64, delay: Duration) {
        self.state.lock().chat_delays.insert(chat_id, delay);
    }

    pub fn set_member(&self, channel: &str, user_id: u64, status: MemberStatus) {
        self.state
            .lock()
            .members
            .insert((channel.to_string(), user_id), status);
    }

    pub fn set_member_error(&self, channel: &str, error: PlatformError) {
        self.state.lock().member_errors.insert(channel.to_string(), error);
    }

    pub fn set_chat_info(&self, channel: &str, info: ChatInfo) {
        self.state.lock().chat_info.insert(channel.to_string(), info);
    }

    pub fn fail_sends_to(&self, chat_id: i64, fail: bool) {
        let mut state = self.state.lock();
        if fail {
            state.failing_chats.insert(chat_id);
        } else {
            state.failing_chats.remove(&chat_id);
        }
    }

    pub fn fail_content(&self, fail: bool) {
        self.state.lock().fail_content = fail;
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.state.lock().fail_deletes = fail;
    }

    pub fn fail_edits(&self, fail: bool) {
        self.state.lock().fail_edits = fail;
    }

    pub fn sent_texts(&self, chat_id: i64) -> Vec<String> {
        self.state
            .lock()
            .sent
            .iter()
            .filter(|(chat, _, _)| *chat == chat_id)
            .map(|(_, text, _)| text.clone())
            .collect()
    }

    /// Keyboard of the most recent message sent to `chat_id`.
    pub fn last_keyboard(&self, chat_id: i64) -> Option<Keyboard> {
        self.state
            .lock()
            .sent
            .iter()
            .rev()
            .find(|(chat, _, _)| *chat == chat_id)
            .and_then(|(_, _, keyboard)| keyboard.clone())
    }

    pub fn contents(&self, chat_id: i64) -> Vec<ContentRef> {
        self.state
            .lock()
            .contents
            .iter()
            .filter(|(chat, _)| *chat == chat_id)
            .map(|(_, content)| content.clone())
            .collect()
    }

    pub fn deleted(&self) -> Vec<(i64, MessageId)> {
        self.state.lock().deleted.clone()
    }

    pub fn edits(&self) -> Vec<(i64, MessageId, String)> {
        self.state.lock().edits.clone()
    }

    pub fn callback_answers(&self) -> Vec<(String, Option<String>, bool)> {
        self.state.lock().callback_answers.clone()
    }

    pub fn membership_queries(&self) -> Vec<String> {
        self.state.lock().membership_queries.clone()
    }

    pub fn chat_info_queries(&self) -> usize {
        self.state.lock().chat_info_queries
    }

    async fn pause(&self) {
        let delay = self.state.lock().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn pause_for(&self, chat_id: i64) {
        self.pause().await;
        let delay = self.state.lock().chat_delays.get(&chat_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Let spawned background work (operator notifications) run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PlatformError> {
        self.pause_for(chat_id).await;
        let mut state = self.state.lock();
        if state.failing_chats.contains(&chat_id) {
            return Err(failed("sendMessage"));
        }
        state.sent.push((chat_id, text.to_string(), keyboard.cloned()));
        Ok(state.next_id())
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: MessageId,
        text: &str,
        _keyboard: Option<&Keyboard>,
    ) -> Result<(), PlatformError> {
        self.pause().await;
        let mut state = self.state.lock();
        if state.fail_edits {
            return Err(failed("editMessageText"));
        }
        state.edits.push((chat_id, message_id, text.to_string()));
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: MessageId) -> Result<(), PlatformError> {
        self.pause().await;
        let mut state = self.state.lock();
        if state.fail_deletes {
            return Err(failed("deleteMessage"));
        }
        state.deleted.push((chat_id, message_id));
        Ok(())
    }

    async fn send_content(&self, chat_id: i64, content: &ContentRef) -> Result<MessageId, PlatformError> {
        self.pause_for(chat_id).await;
        let mut state = self.state.lock();
        if state.fail_content || state.failing_chats.contains(&chat_id) {
            return Err(failed("sendVideo"));
        }
        state.contents.push((chat_id, content.clone()));
        Ok(state.next_id())
    }

    async fn get_chat_member(&self, channel: &ChannelRef, user_id: u64) -> Result<MemberStatus, PlatformError> {
        self.pause().await;
        let key = channel.to_string();
        let mut state = self.state.lock();
        state.membership_queries.push(key.clone());
        if let Some(error) = state.member_errors.get(&key) {
            return Err(error.clone());
        }
        Ok(state
            .members
            .get(&(key, user_id))
            .copied()
            .unwrap_or(MemberStatus::Left))
    }

    async fn get_chat(&self, channel: &ChannelRef) -> Result<ChatInfo, PlatformError> {
        self.pause().await;
        let mut state = self.state.lock();
        state.chat_info_queries += 1;
        state
            .chat_info
            .get(&channel.to_string())
            .cloned()
            .ok_or_else(|| PlatformError::Api("Bad Request: chat not found".into()))
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), PlatformError> {
        self.pause().await;
        self.state.lock().callback_answers.push((
            callback_id.to_string(),
            text.map(str::to_string),
            show_alert,
        ));
        Ok(())
    }
}

pub const OPERATOR: u64 = 999;

/// A conversation over a [`MockPlatform`] and a [`MemoryStore`].
pub struct Fixture {
    pub platform: MockPlatform,
    pub store: MemoryStore,
    pub conversation: Conversation,
    next_update: u32,
}

impl Fixture {
    /// No required channels, operator [`OPERATOR`].
    pub fn new() -> Self {
        Self::build(&[], Some(OPERATOR))
    }

    pub fn with_channels(channels: &[&str]) -> Self {
        Self::build(channels, Some(OPERATOR))
    }

    pub fn without_operator() -> Self {
        Self::build(&[], None)
    }

    fn build(channels: &[&str], operator_id: Option<u64>) -> Self {
        let platform = MockPlatform::new();
        let store = MemoryStore::new();
        let settings = ConversationSettings {
            channels: channels.iter().filter_map(|c| ChannelRef::parse(c)).collect(),
            operator_id,
            stats_top_n: 3,
        };
        let conversation = Conversation::new(
            Arc::new(platform.clone()),
            Storage::new(Arc::new(store.clone())),
            Arc::new(Translations::embedded()),
            settings,
        );
        Self {
            platform,
            store,
            conversation,
            next_update: 0,
        }
    }

    pub fn set_codes(&self, codes: Value) {
        self.store.insert_raw(CODES, codes);
    }

    pub fn sender(user_id: u64) -> Sender {
        Sender {
            id: user_id,
            username: Some(format!("user{}", user_id)),
            display_name: format!("User {}", user_id),
        }
    }

    /// A fresh update from a private chat, where chat id equals user id.
    pub fn update(&mut self, user_id: u64, kind: UpdateKind) -> IncomingUpdate {
        self.next_update += 1;
        IncomingUpdate {
            id: self.next_update,
            sender: Self::sender(user_id),
            chat_id: user_id as i64,
            kind,
        }
    }

    pub async fn text(&mut self, user_id: u64, text: &str) {
        let update = self.update(user_id, UpdateKind::Text(text.to_string()));
        self.conversation.handle_update(update).await;
    }

    pub async fn command(&mut self, user_id: u64, command: Command) {
        let update = self.update(user_id, UpdateKind::Command(command));
        self.conversation.handle_update(update).await;
    }

    pub async fn callback(&mut self, user_id: u64, data: &str, message_id: Option<MessageId>) {
        let id = format!("cb{}", self.next_update + 1);
        let update = self.update(
            user_id,
            UpdateKind::Callback {
                id,
                data: data.to_string(),
                message_id,
            },
        );
        self.conversation.handle_update(update).await;
    }

    pub fn text_for(&self, lang: &str, key: &str) -> String {
        Translations::embedded().get_text(lang, key)
    }
}

//! Analytics recorder.
//!
//! Appends one event per tracked action and tells the operator about it.
//! Neither step may fail the update that triggered it, and the operator
//! message is sent in the background so a slow operator chat never holds
//! up the user's own update.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::conversation::Sender;
use crate::database::AnalyticsRepository;
use crate::database::models::AnalyticsEvent;
use crate::platform::ChatPlatform;
use crate::utils::{format_username, now_rfc3339};

#[derive(Clone)]
pub struct AnalyticsRecorder {
    repo: AnalyticsRepository,
    platform: Arc<dyn ChatPlatform>,
    operator_id: Option<u64>,
}

impl AnalyticsRecorder {
    pub fn new(repo: AnalyticsRepository, platform: Arc<dyn ChatPlatform>, operator_id: Option<u64>) -> Self {
        Self {
            repo,
            platform,
            operator_id,
        }
    }

    pub async fn record(&self, sender: &Sender, action: &str, referrer: Option<&str>) {
        let event = AnalyticsEvent {
            user_id: sender.id,
            username: sender.username.clone(),
            display_name: sender.display_name.clone(),
            action: action.to_string(),
            timestamp: now_rfc3339(),
            referrer: referrer.map(str::to_string),
        };
        let summary = summarize(&event);

        if let Err(e) = self.repo.append(event).await {
            warn!("Dropping analytics event '{}' of user {}: {}", action, sender.id, e);
        }

        let Some(operator) = self.operator_id else {
            return;
        };
        // The operator's own actions are not echoed back to them.
        if operator == sender.id {
            return;
        }

        let platform = self.platform.clone();
        let action = action.to_string();
        tokio::spawn(async move {
            match platform.send_message(operator as i64, &summary, None).await {
                Ok(_) => debug!("Operator notified: {}", action),
                Err(e) => warn!("Failed to notify operator about '{}': {}", action, e),
            }
        });
    }
}

fn summarize(event: &AnalyticsEvent) -> String {
    let who = format_username(event.username.as_deref(), &event.display_name);
    let mut line = format!("📈 {} ({}): {}", who, event.user_id, event.action);
    if let Some(referrer) = &event.referrer {
        line.push_str(&format!(" [ref: {}]", referrer));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, Storage};
    use std::time::Duration;

    use crate::testing::{Fixture, MockPlatform, OPERATOR, settle};

    fn recorder(mock: &MockPlatform, store: &MemoryStore, operator: Option<u64>) -> AnalyticsRecorder {
        let repo = AnalyticsRepository::new(Storage::new(Arc::new(store.clone())));
        AnalyticsRecorder::new(repo, Arc::new(mock.clone()), operator)
    }

    #[tokio::test]
    async fn test_appends_in_order_and_notifies() {
        let mock = MockPlatform::new();
        let store = MemoryStore::new();
        let recorder = recorder(&mock, &store, Some(OPERATOR));

        recorder.record(&Fixture::sender(1), "start", Some("ref123")).await;
        recorder.record(&Fixture::sender(1), "help", None).await;
        settle().await;

        let events = AnalyticsRepository::new(Storage::new(Arc::new(store))).events().await;
        let actions: Vec<_> = events.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["start", "help"]);
        assert_eq!(events[0].referrer.as_deref(), Some("ref123"));
        assert_eq!(events[0].username.as_deref(), Some("user1"));

        assert_eq!(
            mock.sent_texts(OPERATOR as i64),
            vec!["📈 @user1 (1): start [ref: ref123]".to_string(), "📈 @user1 (1): help".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let mock = MockPlatform::new();
        let store = MemoryStore::new();
        store.fail_saves(true);
        mock.fail_sends_to(OPERATOR as i64, true);

        recorder(&mock, &store, Some(OPERATOR))
            .record(&Fixture::sender(1), "start", None)
            .await;
        settle().await;

        assert!(store.log("analytics").is_empty());
        assert!(mock.sent_texts(OPERATOR as i64).is_empty());
    }

    #[tokio::test]
    async fn test_no_operator_no_notification() {
        let mock = MockPlatform::new();
        let store = MemoryStore::new();

        recorder(&mock, &store, None).record(&Fixture::sender(1), "help", None).await;
        settle().await;

        assert_eq!(store.log("analytics").len(), 1);
        assert!(mock.sent_texts(OPERATOR as i64).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_operator_chat_does_not_delay_recording() {
        let mock = MockPlatform::new();
        mock.set_chat_delay(OPERATOR as i64, Duration::from_secs(10));
        let store = MemoryStore::new();
        let recorder = recorder(&mock, &store, Some(OPERATOR));

        let started = tokio::time::Instant::now();
        recorder.record(&Fixture::sender(1), "help", None).await;

        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(store.log("analytics").len(), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(mock.sent_texts(OPERATOR as i64), vec!["📈 @user1 (1): help".to_string()]);
    }
}

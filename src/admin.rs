use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{ChatId, Message, ParseMode},
    Bot,
};
use tracing::instrument;

use crate::{
    config::Config,
    registry::{UserRecord, UserRegistry},
    HandlerResult,
};

/// How many of the most recent registrations /usinfo shows.
const RECENT_WINDOW: usize = 10;

type DeliveryResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Delivery seam for the broadcast fan-out, so the batch loop is testable
/// without a live bot.
pub(crate) trait Deliver {
    async fn deliver(&self, user_id: u64, text: &str) -> DeliveryResult;
}

impl Deliver for Bot {
    async fn deliver(&self, user_id: u64, text: &str) -> DeliveryResult {
        self.send_message(ChatId(user_id as i64), text).await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BroadcastSummary {
    pub sent: usize,
    pub failed: usize,
}

/// Attempts delivery to every user independently. A blocked or otherwise
/// unreachable recipient is counted and skipped, never aborting the batch.
pub(crate) async fn broadcast_to_all<D: Deliver>(
    sender: &D,
    users: &[UserRecord],
    text: &str,
) -> BroadcastSummary {
    let mut summary = BroadcastSummary { sent: 0, failed: 0 };

    for user in users {
        match sender.deliver(user.id, text).await {
            Ok(()) => summary.sent += 1,
            Err(e) => {
                log::warn!("broadcast to {} failed: {e}", user.id);
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Digest of the user registry: total count plus the last registrations.
/// Anyone but the configured admin gets no reply at all.
#[instrument(level = "info", skip(bot, registry, config))]
pub(crate) async fn usinfo(
    bot: Bot,
    msg: Message,
    registry: Arc<UserRegistry>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if !config.is_admin(user.id) {
        return Ok(());
    }

    let total = registry.count();
    let recent = registry.list_recent(RECENT_WINDOW);

    let mut lines = vec![format!("<b>{total}</b> users total. Last {}:", recent.len())];
    for record in recent {
        lines.push(format!(
            "{}: @{} ({}), joined {}",
            record.id,
            record.username.as_deref().unwrap_or("-"),
            record.first_name.as_deref().unwrap_or("-"),
            record.joined
        ));
    }

    bot.send_message(msg.chat.id, lines.join("\n"))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Sends the given text to every registered user and reports a
/// sent/failed summary back to the admin.
#[instrument(level = "info", skip(bot, registry, config))]
pub(crate) async fn broadcast(
    bot: Bot,
    msg: Message,
    text: String,
    registry: Arc<UserRegistry>,
    config: Arc<Config>,
) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    if !config.is_admin(user.id) {
        return Ok(());
    }

    let text = text.trim();
    if text.is_empty() {
        bot.send_message(msg.chat.id, "Nothing to broadcast. Usage: /broadcast <text>")
            .await?;
        return Ok(());
    }

    let users = registry.snapshot();
    log::info!("{} broadcasts to {} users", user.id, users.len());

    let summary = broadcast_to_all(&bot, &users, text).await;

    bot.send_message(
        msg.chat.id,
        format!(
            "Broadcast finished: {} sent, {} failed.",
            summary.sent, summary.failed
        ),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;

    struct FlakySender {
        fail_for: HashSet<u64>,
        attempted: Mutex<Vec<u64>>,
    }

    impl Deliver for FlakySender {
        async fn deliver(&self, user_id: u64, _text: &str) -> DeliveryResult {
            self.attempted.lock().unwrap().push(user_id);
            if self.fail_for.contains(&user_id) {
                return Err("blocked by user".into());
            }
            Ok(())
        }
    }

    fn users(ids: &[u64]) -> Vec<UserRecord> {
        ids.iter()
            .map(|&id| UserRecord {
                id,
                username: None,
                first_name: None,
                joined: "2024-01-01 00:00".into(),
            })
            .collect()
    }

    #[tokio::test]
    async fn counts_failures_without_aborting_the_batch() {
        let sender = FlakySender {
            fail_for: [2, 4].into_iter().collect(),
            attempted: Mutex::new(Vec::new()),
        };
        let all = users(&[1, 2, 3, 4, 5]);

        let summary = broadcast_to_all(&sender, &all, "hello").await;

        assert_eq!(summary, BroadcastSummary { sent: 3, failed: 2 });
        // Every recipient was attempted, including those after a failure.
        assert_eq!(*sender.attempted.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn empty_registry_broadcasts_to_nobody() {
        let sender = FlakySender {
            fail_for: HashSet::new(),
            attempted: Mutex::new(Vec::new()),
        };

        let summary = broadcast_to_all(&sender, &[], "hello").await;

        assert_eq!(summary, BroadcastSummary { sent: 0, failed: 0 });
        assert!(sender.attempted.lock().unwrap().is_empty());
    }
}

//! openbot-stats: per-user messaging statistics.
//!
//! Records one row per observed non-empty message (length, channel,
//! ingestion time) and answers the guild-scoped `/mymessagestats` command
//! with the caller's total, visible only to them.

use std::sync::Arc;

use anyhow::Context as _;

use openbot_client::OpenBotClient;
use openbot_hooks::CommandReply;
use openbot_storage::{MessageRecord, MessageStore};

/// Build the reply line for a message count, with singular phrasing only
/// for exactly one.
fn format_count_reply(count: i64) -> String {
    format!(
        "You have sent {count} message{}",
        if count == 1 { "" } else { "s" }
    )
}

/// Register the stats module on the client: one message hook plus the
/// `/mymessagestats` command.
pub async fn install(client: &OpenBotClient, store: Arc<MessageStore>) {
    let module = client.module("message_stats");

    let recording_store = store.clone();
    module
        .on_message(move |msg| {
            let store = recording_store.clone();
            async move {
                // Attachment-only and other empty messages are not counted.
                if msg.content.is_empty() {
                    return Ok(());
                }

                store
                    .record_message(&MessageRecord {
                        id: msg.id,
                        author_id: msg.author_id,
                        author_name: msg.author_name.clone(),
                        length: msg.content.chars().count() as u32,
                        channel_id: msg.channel_id,
                        // Ingestion time, not the platform's own timestamp.
                        sent_at_millis: chrono::Utc::now().timestamp_millis(),
                    })
                    .await
                    .context("recording message")
            }
        })
        .await;

    module
        .slash_command(
            "mymessagestats",
            "How many messages have you sent?",
            move |invocation| {
                let store = store.clone();
                async move {
                    let count = store
                        .count_messages_by(invocation.user_id)
                        .await
                        .context("counting messages")?;
                    Ok(CommandReply::ephemeral(format_count_reply(count)))
                }
            },
        )
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use openbot_config::Settings;
    use openbot_hooks::{CommandInvocation, MessageEvent};

    fn client() -> OpenBotClient {
        OpenBotClient::new(Settings {
            env: "test".into(),
            token: "unused".into(),
            guild: 1,
        })
    }

    fn message(id: u64, author_id: u64, author_name: &str, content: &str) -> MessageEvent {
        MessageEvent {
            id,
            author_id,
            author_name: author_name.into(),
            content: content.into(),
            channel_id: 77,
        }
    }

    async fn count_reply(client: &OpenBotClient, user_id: u64) -> String {
        let cmd = client.hooks().find_command("mymessagestats").await.unwrap();
        (cmd.handler)(CommandInvocation {
            user_id,
            user_name: "whoever".into(),
        })
        .await
        .unwrap()
        .text
    }

    #[test]
    fn test_singular_only_for_exactly_one() {
        assert_eq!(format_count_reply(0), "You have sent 0 messages");
        assert_eq!(format_count_reply(1), "You have sent 1 message");
        assert_eq!(format_count_reply(2), "You have sent 2 messages");
        assert_eq!(format_count_reply(5), "You have sent 5 messages");
    }

    #[tokio::test]
    async fn test_messages_are_recorded_per_author() {
        let client = client();
        let store = Arc::new(MessageStore::open_in_memory().unwrap());
        install(&client, store.clone()).await;

        let hooks = client.hooks();
        hooks.dispatch_message(message(1, 10, "alice", "hello")).await;
        hooks.dispatch_message(message(2, 10, "alice", "world")).await;
        hooks.dispatch_message(message(3, 11, "bob", "hey")).await;

        assert_eq!(store.count_messages_by(10).await.unwrap(), 2);
        assert_eq!(store.count_messages_by(11).await.unwrap(), 1);
        // Exactly one user row however many messages.
        assert_eq!(store.get_user(10).await.unwrap().unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_empty_content_is_not_recorded() {
        let client = client();
        let store = Arc::new(MessageStore::open_in_memory().unwrap());
        install(&client, store.clone()).await;

        client.hooks().dispatch_message(message(1, 10, "alice", "")).await;

        assert_eq!(store.count_messages_by(10).await.unwrap(), 0);
        assert!(!store.user_exists(10).await.unwrap());
    }

    #[tokio::test]
    async fn test_username_change_does_not_update_stored_name() {
        let client = client();
        let store = Arc::new(MessageStore::open_in_memory().unwrap());
        install(&client, store.clone()).await;

        let hooks = client.hooks();
        hooks.dispatch_message(message(1, 10, "alice", "first")).await;
        hooks.dispatch_message(message(2, 10, "renamed", "second")).await;

        assert_eq!(store.get_user(10).await.unwrap().unwrap().username, "alice");
        assert_eq!(store.count_messages_by(10).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_command_reply_counts_only_the_caller() {
        let client = client();
        let store = Arc::new(MessageStore::open_in_memory().unwrap());
        install(&client, store.clone()).await;

        let hooks = client.hooks();
        hooks.dispatch_message(message(1, 10, "alice", "one")).await;
        hooks.dispatch_message(message(2, 11, "bob", "two")).await;
        hooks.dispatch_message(message(3, 11, "bob", "three")).await;

        assert_eq!(count_reply(&client, 10).await, "You have sent 1 message");
        assert_eq!(count_reply(&client, 11).await, "You have sent 2 messages");
        assert_eq!(count_reply(&client, 12).await, "You have sent 0 messages");
    }

    #[tokio::test]
    async fn test_command_reply_is_ephemeral() {
        let client = client();
        install(&client, Arc::new(MessageStore::open_in_memory().unwrap())).await;

        let cmd = client.hooks().find_command("mymessagestats").await.unwrap();
        let reply = (cmd.handler)(CommandInvocation {
            user_id: 1,
            user_name: "alice".into(),
        })
        .await
        .unwrap();
        assert!(reply.ephemeral);
    }

    #[tokio::test]
    async fn test_duplicate_snowflake_failure_is_isolated() {
        let client = client();
        let store = Arc::new(MessageStore::open_in_memory().unwrap());
        install(&client, store.clone()).await;

        let hooks = client.hooks();
        hooks.dispatch_message(message(1, 10, "alice", "one")).await;
        // Same message id again: the storage error is caught and logged by
        // the dispatch layer, never surfaced to the event loop.
        hooks.dispatch_message(message(1, 10, "alice", "dup")).await;

        assert_eq!(store.count_messages_by(10).await.unwrap(), 1);
    }
}

//! Hook event payloads.
//!
//! Plain structs decoupled from the platform library: the client converts
//! serenity models into these at the gateway boundary, so modules never
//! depend on the Discord stack directly.

use serde::{Deserialize, Serialize};

/// Fired once after the gateway connection is established and guild
/// commands are synced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// The bot's own user snowflake.
    pub bot_id: u64,
    /// The bot's display name.
    pub bot_name: String,
}

/// One inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Message snowflake.
    pub id: u64,
    /// Author snowflake.
    pub author_id: u64,
    /// Author display name.
    pub author_name: String,
    /// Message text content (may be empty, e.g. attachment-only messages).
    pub content: String,
    /// Channel snowflake.
    pub channel_id: u64,
}

/// One reaction added to a message. The reacting user may be unknown when
/// the gateway delivers a partial payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub message_id: u64,
    pub channel_id: u64,
    pub user_id: Option<u64>,
    /// Rendered emoji (unicode char or `<:name:id>` for custom emoji).
    pub emoji: String,
}

/// A slash-command invocation, as seen by a command handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandInvocation {
    /// Snowflake of the invoking user.
    pub user_id: u64,
    /// Display name of the invoking user.
    pub user_name: String,
}

/// A command handler's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandReply {
    pub text: String,
    /// Visible only to the invoking user when set.
    pub ephemeral: bool,
}

impl CommandReply {
    /// A reply visible only to the invoking user.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ephemeral: true,
        }
    }
}

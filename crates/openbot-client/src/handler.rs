//! Serenity event handler that fans gateway events out to module hooks.

use std::sync::Arc;
use std::sync::OnceLock;

use serenity::all::{
    CreateCommand, CreateInteractionResponse, CreateInteractionResponseMessage, Interaction,
};
use serenity::async_trait;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use tracing::{error, info, warn};

use openbot_hooks::{CommandInvocation, MessageEvent, ModuleHooks, ReactionEvent, ReadyEvent};

/// Bridges serenity events into the hook registry: converts platform models
/// to local event payloads, applies the self-message filter, and waits for
/// each fan-out to complete before returning to the gateway loop.
pub struct Dispatcher {
    hooks: Arc<ModuleHooks>,
    guild: GuildId,
    /// Own user id, learned from the ready payload.
    bot_id: OnceLock<u64>,
}

impl Dispatcher {
    pub fn new(hooks: Arc<ModuleHooks>, guild: GuildId) -> Self {
        Self {
            hooks,
            guild,
            bot_id: OnceLock::new(),
        }
    }

    /// Sync all module-registered slash commands to the configured guild.
    async fn sync_commands(&self, ctx: &Context) {
        let commands: Vec<CreateCommand> = self
            .hooks
            .commands()
            .await
            .into_iter()
            .map(|c| CreateCommand::new(c.name).description(c.description))
            .collect();
        let count = commands.len();

        match self.guild.set_commands(&ctx.http, commands).await {
            Ok(_) => info!(guild = self.guild.get(), count, "Synced guild commands"),
            Err(e) => error!(guild = self.guild.get(), "Failed to sync guild commands: {e}"),
        }
    }
}

/// Whether a message should reach the hooks: the bot's own messages are
/// dropped to prevent feedback loops.
fn should_dispatch(author_id: u64, bot_id: Option<u64>) -> bool {
    bot_id != Some(author_id)
}

#[async_trait]
impl EventHandler for Dispatcher {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "Logged in as {} (ID: {})",
            ready.user.name,
            ready.user.id.get()
        );

        let _ = self.bot_id.set(ready.user.id.get());
        self.sync_commands(&ctx).await;

        self.hooks
            .dispatch_ready(ReadyEvent {
                bot_id: ready.user.id.get(),
                bot_name: ready.user.name.clone(),
            })
            .await;
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if !should_dispatch(msg.author.id.get(), self.bot_id.get().copied()) {
            return;
        }

        self.hooks
            .dispatch_message(MessageEvent {
                id: msg.id.get(),
                author_id: msg.author.id.get(),
                author_name: msg.author.name.clone(),
                content: msg.content.clone(),
                channel_id: msg.channel_id.get(),
            })
            .await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        // No self-filtering here: the bot's own reactions are not
        // distinguished.
        self.hooks
            .dispatch_reaction_add(ReactionEvent {
                message_id: reaction.message_id.get(),
                channel_id: reaction.channel_id.get(),
                user_id: reaction.user_id.map(|id| id.get()),
                emoji: reaction.emoji.to_string(),
            })
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };

        let Some(registered) = self.hooks.find_command(&command.data.name).await else {
            warn!(command = command.data.name, "Unregistered command invoked");
            return;
        };

        let invocation = CommandInvocation {
            user_id: command.user.id.get(),
            user_name: command.user.name.clone(),
        };

        let reply = match (registered.handler)(invocation).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(
                    module = %registered.module,
                    command = command.data.name,
                    "Command handler failed: {e:#}"
                );
                openbot_hooks::CommandReply::ephemeral("Something went wrong, sorry.")
            }
        };

        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(reply.text)
                .ephemeral(reply.ephemeral),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            error!(command = command.data.name, "Failed to send command response: {e}");
        }
    }
}

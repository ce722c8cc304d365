//! openbot-client: the Discord-facing side of the bot.
//!
//! Wraps a serenity gateway client, owns the hook registry, and fans every
//! inbound event out to the registered module callbacks. Modules are created
//! from the client and register themselves before [`OpenBotClient::run`] is
//! called; after that the registry is read-only.

pub mod handler;

use std::sync::Arc;

use anyhow::Context as _;
use serenity::all::GatewayIntents;
use serenity::model::id::GuildId;
use serenity::Client;
use tracing::info;

use openbot_config::Settings;
use openbot_hooks::{BotModule, ModuleHooks};

/// The bot client: configuration plus the shared hook registry.
pub struct OpenBotClient {
    settings: Settings,
    hooks: Arc<ModuleHooks>,
}

impl OpenBotClient {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            hooks: Arc::new(ModuleHooks::new()),
        }
    }

    /// Create a named module handle bound to this client's registry.
    pub fn module(&self, name: &str) -> BotModule {
        BotModule::new(self.hooks.clone(), name)
    }

    /// The shared hook registry.
    pub fn hooks(&self) -> Arc<ModuleHooks> {
        self.hooks.clone()
    }

    /// Connect to the Discord gateway and run until the connection ends.
    /// Commands registered by modules are synced to the configured guild
    /// once the gateway reports ready.
    pub async fn run(self) -> anyhow::Result<()> {
        let intents = GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

        let dispatcher =
            handler::Dispatcher::new(self.hooks.clone(), GuildId::new(self.settings.guild));

        let mut client = Client::builder(&self.settings.token, intents)
            .event_handler(dispatcher)
            .await
            .context("Failed to create Discord client")?;

        info!(env = self.settings.env, "Connecting to Discord gateway");

        client.start().await.context("Discord client error")?;

        Ok(())
    }
}

//! Named module handles.
//!
//! A `BotModule` is a stateless registration namespace bound to one hook
//! registry: it carries a name for log attribution and appends `(name,
//! callback)` pairs. It has no persisted state of its own.

use std::future::Future;
use std::sync::Arc;

use crate::events::{CommandInvocation, CommandReply, MessageEvent, ReactionEvent, ReadyEvent};
use crate::registry::{ModuleHooks, SlashCommand};

/// Registration handle for one named module.
#[derive(Clone)]
pub struct BotModule {
    name: Arc<str>,
    hooks: Arc<ModuleHooks>,
}

impl BotModule {
    pub fn new(hooks: Arc<ModuleHooks>, name: &str) -> Self {
        tracing::info!(module = name, "Creating module");
        Self {
            name: name.into(),
            hooks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a callback for the ready event. Callback signatures are not
    /// validated beyond the type system; registration's only effect is the
    /// append.
    pub async fn on_ready<F, Fut>(&self, hook: F)
    where
        F: Fn(Arc<ReadyEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks
            .register_ready(self.name.clone(), Arc::new(move |event| Box::pin(hook(event))))
            .await;
    }

    /// Register a callback for inbound messages. The client filters out the
    /// bot's own messages before dispatch.
    pub async fn on_message<F, Fut>(&self, hook: F)
    where
        F: Fn(Arc<MessageEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks
            .register_message(self.name.clone(), Arc::new(move |event| Box::pin(hook(event))))
            .await;
    }

    /// Register a callback for reaction additions. The bot's own reactions
    /// are not distinguished.
    pub async fn on_reaction_add<F, Fut>(&self, hook: F)
    where
        F: Fn(Arc<ReactionEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.hooks
            .register_reaction_add(self.name.clone(), Arc::new(move |event| Box::pin(hook(event))))
            .await;
    }

    /// Register a guild-scoped slash command. Commands are synced to the
    /// configured guild when the client connects.
    pub async fn slash_command<F, Fut>(&self, name: &str, description: &str, handler: F)
    where
        F: Fn(CommandInvocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<CommandReply>> + Send + 'static,
    {
        self.hooks
            .register_command(SlashCommand {
                module: self.name.clone(),
                name: name.to_string(),
                description: description.to_string(),
                handler: Arc::new(move |invocation| Box::pin(handler(invocation))),
            })
            .await;
    }
}

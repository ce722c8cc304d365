//! Hook registry — the ordered `(module, callback)` sequences behind event
//! dispatch.
//!
//! Registration happens at startup, before the gateway connection is opened;
//! after that the registry is only ever read. Dispatch starts every callback
//! for an event and waits for the whole set to finish, so interleaving
//! happens at await points but an event handler never returns with hooks
//! still running.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::events::{CommandInvocation, CommandReply, MessageEvent, ReactionEvent, ReadyEvent};

/// Boxed future returned by hook callbacks.
pub type HookFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

pub type ReadyHook = Arc<dyn Fn(Arc<ReadyEvent>) -> HookFuture + Send + Sync>;
pub type MessageHook = Arc<dyn Fn(Arc<MessageEvent>) -> HookFuture + Send + Sync>;
pub type ReactionHook = Arc<dyn Fn(Arc<ReactionEvent>) -> HookFuture + Send + Sync>;

/// Future returned by slash-command handlers.
pub type CommandFuture = Pin<Box<dyn Future<Output = anyhow::Result<CommandReply>> + Send>>;

pub type CommandHandler = Arc<dyn Fn(CommandInvocation) -> CommandFuture + Send + Sync>;

/// A guild-scoped slash command registered by a module.
#[derive(Clone)]
pub struct SlashCommand {
    /// Owning module, for log attribution.
    pub module: Arc<str>,
    pub name: String,
    pub description: String,
    pub handler: CommandHandler,
}

#[derive(Default)]
struct Inner {
    on_ready: Vec<(Arc<str>, ReadyHook)>,
    on_message: Vec<(Arc<str>, MessageHook)>,
    on_reaction_add: Vec<(Arc<str>, ReactionHook)>,
    commands: Vec<SlashCommand>,
}

/// Ordered hook sequences, one per event kind, plus registered slash
/// commands. Shared between module handles (writers, at startup) and the
/// client dispatcher (reader, for the process lifetime).
#[derive(Default)]
pub struct ModuleHooks {
    inner: RwLock<Inner>,
}

impl ModuleHooks {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_ready(&self, module: Arc<str>, hook: ReadyHook) {
        self.inner.write().await.on_ready.push((module, hook));
    }

    pub async fn register_message(&self, module: Arc<str>, hook: MessageHook) {
        self.inner.write().await.on_message.push((module, hook));
    }

    pub async fn register_reaction_add(&self, module: Arc<str>, hook: ReactionHook) {
        self.inner.write().await.on_reaction_add.push((module, hook));
    }

    pub async fn register_command(&self, command: SlashCommand) {
        let mut inner = self.inner.write().await;
        if inner.commands.iter().any(|c| c.name == command.name) {
            tracing::warn!(
                command = command.name,
                module = %command.module,
                "Duplicate slash command registration, keeping the first"
            );
            return;
        }
        inner.commands.push(command);
    }

    /// Fan out a ready event to all ready hooks and wait for all of them.
    pub async fn dispatch_ready(&self, event: ReadyEvent) {
        let hooks = self.inner.read().await.on_ready.clone();
        fan_out("ready", hooks, Arc::new(event)).await;
    }

    /// Fan out a message event to all message hooks and wait for all of
    /// them. Self-message filtering happens before this is called.
    pub async fn dispatch_message(&self, event: MessageEvent) {
        let hooks = self.inner.read().await.on_message.clone();
        fan_out("message", hooks, Arc::new(event)).await;
    }

    /// Fan out a reaction-add event to all reaction hooks and wait for all
    /// of them.
    pub async fn dispatch_reaction_add(&self, event: ReactionEvent) {
        let hooks = self.inner.read().await.on_reaction_add.clone();
        fan_out("reaction_add", hooks, Arc::new(event)).await;
    }

    /// Snapshot of registered commands, for guild command sync.
    pub async fn commands(&self) -> Vec<SlashCommand> {
        self.inner.read().await.commands.clone()
    }

    /// Look up a command handler by name.
    pub async fn find_command(&self, name: &str) -> Option<SlashCommand> {
        self.inner
            .read()
            .await
            .commands
            .iter()
            .find(|c| c.name == name)
            .cloned()
    }
}

/// Start every hook in registration order, then wait for the whole set.
/// A failing hook is logged with its owning module and never suppresses
/// its siblings or the event loop.
async fn fan_out<E>(
    kind: &'static str,
    hooks: Vec<(Arc<str>, Arc<dyn Fn(Arc<E>) -> HookFuture + Send + Sync>)>,
    event: Arc<E>,
) {
    let invocations = hooks.into_iter().map(|(module, hook)| {
        let event = event.clone();
        async move {
            if let Err(e) = hook(event).await {
                tracing::error!(module = %module, kind, "Hook failed: {e:#}");
            }
        }
    });
    futures::future::join_all(invocations).await;
}

//! openbot-hooks: event-driven hook system.
//!
//! Bot modules register callbacks for gateway events (ready, message,
//! reaction-add) and slash commands; the client fans each inbound event out
//! to every registered callback.

pub mod events;
pub mod module;
pub mod registry;

pub use events::{CommandInvocation, CommandReply, MessageEvent, ReactionEvent, ReadyEvent};
pub use module::BotModule;
pub use registry::{CommandHandler, HookFuture, ModuleHooks, SlashCommand};

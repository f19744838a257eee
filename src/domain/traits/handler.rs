use async_trait::async_trait;

use super::client::ChatClient;
use crate::application::errors::{ClientError, CommandError};
use crate::domain::entities::{AccountScope, ChatEvent, PluginRegistry};

/// Context handed to a command's `run` entry point
pub struct CommandContext<'a> {
    pub client: &'a dyn ChatClient,
    pub event: &'a ChatEvent,
    pub args: Vec<String>,
    pub registry: &'a PluginRegistry,
    pub scope: &'a AccountScope,
}

impl CommandContext<'_> {
    /// Reply to the triggering message in its thread
    pub async fn reply(&self, text: &str) -> Result<String, ClientError> {
        self.client
            .send_message(&self.event.thread_id, text, Some(&self.event.message_id))
            .await
    }
}

/// Context handed to an event handler
pub struct EventContext<'a> {
    pub client: &'a dyn ChatClient,
    pub event: &'a ChatEvent,
    pub registry: &'a PluginRegistry,
    pub scope: &'a AccountScope,
}

impl EventContext<'_> {
    pub async fn reply(&self, text: &str) -> Result<String, ClientError> {
        self.client
            .send_message(&self.event.thread_id, text, Some(&self.event.message_id))
            .await
    }
}

/// Command entry point, run when a message resolves to the command
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn run(&self, ctx: CommandContext<'_>) -> Result<(), CommandError>;
}

/// Passive listener, run for every inbound event
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, ctx: EventContext<'_>) -> Result<(), CommandError>;
}

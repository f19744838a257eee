//! Built-in command and event handlers

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::application::errors::CommandError;
use crate::domain::traits::{CommandContext, CommandHandler, EventContext, EventHandler};

/// Lists the commands enabled for the current account
pub struct HelpCommand;

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> Result<(), CommandError> {
        let mut text = "Available commands:\n".to_string();
        for command in ctx.registry.commands() {
            if !ctx.scope.is_enabled(&command.key()) {
                continue;
            }
            let prefix = if command.requires_prefix() { ctx.scope.prefix.as_str() } else { "" };
            text.push_str(&format!("  {}{}", prefix, command.name()));
            if !command.metadata.description.is_empty() {
                text.push_str(&format!(" - {}", command.metadata.description));
            }
            if !command.metadata.usage.is_empty() {
                text.push_str(&format!(" (usage: {})", command.metadata.usage));
            }
            text.push('\n');
        }
        ctx.reply(text.trim_end()).await?;
        Ok(())
    }
}

/// Replies with its arguments
pub struct EchoCommand;

#[async_trait]
impl CommandHandler for EchoCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> Result<(), CommandError> {
        if ctx.args.is_empty() {
            return Err(CommandError::InvalidArgs("nothing to echo".to_string()));
        }
        ctx.reply(&ctx.args.join(" ")).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    response: Option<String>,
}

/// Forwards a prompt to an HTTP completion endpoint
pub struct AiCommand {
    http: reqwest::Client,
    endpoint: Option<String>,
}

impl AiCommand {
    pub const USAGE: &'static str = "Hello there! How can I assist you today?\n\nUsage: ai [text]";

    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl CommandHandler for AiCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> Result<(), CommandError> {
        let prompt = ctx.args.join(" ");
        if prompt.is_empty() {
            ctx.reply(Self::USAGE).await?;
            return Ok(());
        }

        let Some(endpoint) = &self.endpoint else {
            return Err(CommandError::ExecutionFailed(
                "AI endpoint is not configured".to_string(),
            ));
        };

        ctx.reply("🔄 Generating...").await?;
        let response = self
            .http
            .get(endpoint)
            .query(&[("prompt", prompt.as_str()), ("uid", ctx.event.sender_id.as_str())])
            .send()
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CommandError::ExecutionFailed(format!(
                "AI endpoint returned {}",
                response.status()
            )));
        }

        let data: CompletionResponse = response
            .json()
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        match data.response {
            Some(answer) => ctx.reply(&answer).await?,
            None => ctx.reply("Unexpected response format from the API.").await?,
        };
        Ok(())
    }
}

/// Traces every inbound message
pub struct MessageLogHandler;

#[async_trait]
impl EventHandler for MessageLogHandler {
    async fn handle_event(&self, ctx: EventContext<'_>) -> Result<(), CommandError> {
        debug!(
            account = %ctx.scope.account_id,
            thread = %ctx.event.thread_id,
            sender = %ctx.event.sender_id,
            kind = ctx.event.kind.as_str(),
            "{}",
            ctx.event.body.as_deref().unwrap_or_default()
        );
        Ok(())
    }
}

//! Event router - Routes inbound events to event handlers and commands

use chrono::Utc;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::parser::{CommandParser, Resolution};
use crate::application::errors::CommandError;
use crate::application::services::{CooldownThrottle, PermissionEvaluator, Throttle};
use crate::domain::entities::{AccountScope, ChatEvent, CommandDescriptor, PluginRegistry};
use crate::domain::traits::{ChatClient, CommandContext, EventContext};

pub const PREFIX_NOT_NEEDED: &str = "Invalid usage this command doesn't need a prefix";
pub const PERMISSION_DENIED: &str =
    "Permission denied. You don't have permission to use this command";

/// Routing outcome of one event, for logging and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No command resolved; only event handlers ran
    Ignored,
    PrefixNotNeeded,
    PermissionDenied,
    CooldownActive { wait_seconds: u64 },
    Executed { command: String },
    Failed { command: String },
}

/// Consumes inbound events: fans out to every enabled event handler, then
/// runs at most one resolved command after permission and cooldown checks.
pub struct EventRouter {
    registry: Arc<PluginRegistry>,
    permissions: PermissionEvaluator,
    cooldowns: CooldownThrottle,
}

impl EventRouter {
    pub fn new(
        registry: Arc<PluginRegistry>,
        permissions: PermissionEvaluator,
        cooldowns: CooldownThrottle,
    ) -> Self {
        Self {
            registry,
            permissions,
            cooldowns,
        }
    }

    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// Handle one inbound event. Never fails: handler errors and panics are
    /// reported into the conversation and logged.
    ///
    /// The thread's admin record is materialized on the first event seen in
    /// that thread, before any handler runs.
    pub async fn dispatch(
        &self,
        event: &ChatEvent,
        client: &dyn ChatClient,
        scope: &AccountScope,
    ) -> Dispatch {
        let thread_admins = self
            .permissions
            .thread_admins(&event.thread_id, client)
            .await
            .unwrap_or_else(|e| {
                error!(thread = %event.thread_id, error = %e, "Failed to load thread admins");
                Vec::new()
            });

        self.run_event_handlers(event, client, scope).await;
        self.run_command(event, client, scope, &thread_admins).await
    }

    async fn run_event_handlers(&self, event: &ChatEvent, client: &dyn ChatClient, scope: &AccountScope) {
        for descriptor in self.registry.event_handlers() {
            if !scope.is_enabled(&descriptor.key()) {
                continue;
            }
            let ctx = EventContext {
                client,
                event,
                registry: &self.registry,
                scope,
            };
            if let Err(e) = guarded(descriptor.handler.handle_event(ctx)).await {
                error!(
                    account = %scope.account_id,
                    handler = %descriptor.name(),
                    error = %e,
                    "Error while executing event handler"
                );
                notify(client, event, &format!("Error executing event: {}", e)).await;
            }
        }
    }

    fn lookup(&self, token: &str, scope: &AccountScope) -> Option<Arc<CommandDescriptor>> {
        self.registry
            .command(token)
            .filter(|descriptor| scope.is_enabled(&descriptor.key()))
            .cloned()
    }

    async fn run_command(
        &self,
        event: &ChatEvent,
        client: &dyn ChatClient,
        scope: &AccountScope,
        thread_admins: &[String],
    ) -> Dispatch {
        let Some(body) = event.text() else {
            return Dispatch::Ignored;
        };

        let resolution = CommandParser::new(&scope.prefix).resolve(body, |token| self.lookup(token, scope));
        let (descriptor, args) = match resolution {
            Resolution::NoMatch => return Dispatch::Ignored,
            Resolution::PrefixNotNeeded(descriptor) => {
                debug!(command = %descriptor.name(), "Prefix used on a prefix-less command");
                notify(client, event, PREFIX_NOT_NEEDED).await;
                return Dispatch::PrefixNotNeeded;
            }
            Resolution::Command { descriptor, args } => (descriptor, args),
        };

        let allowed = self
            .permissions
            .allowed(descriptor.role(), &event.sender_id, scope, thread_admins)
            .await
            .unwrap_or_else(|e| {
                error!(command = %descriptor.name(), error = %e, "Permission lookup failed");
                false
            });
        if !allowed {
            debug!(
                command = %descriptor.name(),
                sender = %event.sender_id,
                role = %descriptor.role(),
                "Permission denied"
            );
            notify(client, event, PERMISSION_DENIED).await;
            return Dispatch::PermissionDenied;
        }

        let throttle = self.cooldowns.try_acquire(
            &descriptor.key(),
            &event.sender_id,
            descriptor.cooldown_seconds(),
            Utc::now(),
        );
        if let Throttle::Wait(_) = throttle {
            let wait_seconds = throttle.wait_seconds();
            notify(
                client,
                event,
                &format!("Please wait {} seconds before reusing the command.", wait_seconds),
            )
            .await;
            return Dispatch::CooldownActive { wait_seconds };
        }

        debug!(
            account = %scope.account_id,
            thread = %event.thread_id,
            command = %descriptor.name(),
            "Executing command"
        );
        let ctx = CommandContext {
            client,
            event,
            args,
            registry: &self.registry,
            scope,
        };
        match guarded(descriptor.handler.run(ctx)).await {
            Ok(()) => Dispatch::Executed {
                command: descriptor.name().to_string(),
            },
            Err(e) => {
                error!(command = %descriptor.name(), error = %e, "Error while executing command");
                notify(client, event, &format!("Error executing command: {}", e)).await;
                Dispatch::Failed {
                    command: descriptor.name().to_string(),
                }
            }
        }
    }
}

/// Run a handler future, turning a panic into an execution error
async fn guarded<F>(handler: F) -> Result<(), CommandError>
where
    F: Future<Output = Result<(), CommandError>>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(CommandError::ExecutionFailed(format!(
            "handler panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Best-effort notice into the originating conversation
async fn notify(client: &dyn ChatClient, event: &ChatEvent, text: &str) {
    if let Err(e) = client
        .send_message(&event.thread_id, text, Some(&event.message_id))
        .await
    {
        warn!(thread = %event.thread_id, error = %e, "Failed to send notice");
    }
}

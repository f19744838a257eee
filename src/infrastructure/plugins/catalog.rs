//! Handler catalog - Named entry points that manifests bind to

use std::collections::HashMap;
use std::sync::Arc;

use super::builtin::{AiCommand, EchoCommand, HelpCommand, MessageLogHandler};
use crate::domain::traits::{CommandHandler, EventHandler};
use crate::infrastructure::config::Config;

/// Entry points available to plugin manifests, keyed by id
#[derive(Default, Clone)]
pub struct HandlerCatalog {
    commands: HashMap<String, Arc<dyn CommandHandler>>,
    events: HashMap<String, Arc<dyn EventHandler>>,
}

impl HandlerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in handler registered
    pub fn builtin(config: &Config) -> Self {
        let mut catalog = Self::new();
        catalog.register_command("help", Arc::new(HelpCommand));
        catalog.register_command("echo", Arc::new(EchoCommand));
        catalog.register_command("ai", Arc::new(AiCommand::new(config.ai.endpoint.clone())));
        catalog.register_event("message-log", Arc::new(MessageLogHandler));
        catalog
    }

    pub fn register_command(&mut self, id: impl Into<String>, handler: Arc<dyn CommandHandler>) {
        self.commands.insert(id.into(), handler);
    }

    pub fn register_event(&mut self, id: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.events.insert(id.into(), handler);
    }

    pub fn command(&self, id: &str) -> Option<Arc<dyn CommandHandler>> {
        self.commands.get(id).cloned()
    }

    pub fn event(&self, id: &str) -> Option<Arc<dyn EventHandler>> {
        self.events.get(id).cloned()
    }
}

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::command::{CommandDescriptor, EventHandlerDescriptor, PluginMetadata, Role};
use crate::domain::traits::{CommandHandler, EventHandler};

/// A plugin module: metadata plus optional command and event entry points
pub struct PluginModule {
    pub metadata: PluginMetadata,
    pub run: Option<Arc<dyn CommandHandler>>,
    pub handle_event: Option<Arc<dyn EventHandler>>,
}

impl PluginModule {
    pub fn new(metadata: PluginMetadata) -> Self {
        Self {
            metadata,
            run: None,
            handle_event: None,
        }
    }

    pub fn with_run(mut self, handler: Arc<dyn CommandHandler>) -> Self {
        self.run = Some(handler);
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.handle_event = Some(handler);
        self
    }
}

/// Registered commands and event handlers.
///
/// Built once at startup through `register`, then shared read-only behind an
/// `Arc`. A reload builds a fresh registry instead of patching this one.
#[derive(Default)]
pub struct PluginRegistry {
    commands: Vec<Arc<CommandDescriptor>>,
    aliases: HashMap<String, Arc<CommandDescriptor>>,
    events: Vec<Arc<EventHandlerDescriptor>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. An alias already in use is taken over by this module.
    pub fn register(&mut self, module: PluginModule) {
        let metadata = module.metadata.normalized();

        if let Some(handler) = module.run {
            let descriptor = Arc::new(CommandDescriptor {
                metadata: metadata.clone(),
                handler,
            });
            for alias in descriptor.aliases() {
                if let Some(previous) = self.aliases.insert(alias.clone(), descriptor.clone()) {
                    tracing::debug!(
                        alias = %alias,
                        previous = %previous.name(),
                        current = %descriptor.name(),
                        "Alias reassigned"
                    );
                }
            }
            self.commands.push(descriptor);
            self.retain_live_commands();
        }

        if let Some(handler) = module.handle_event {
            self.events.push(Arc::new(EventHandlerDescriptor { metadata, handler }));
        }
    }

    /// Drop descriptors that lost every alias to a later registration.
    fn retain_live_commands(&mut self) {
        let aliases = &self.aliases;
        self.commands.retain(|descriptor| {
            descriptor.aliases().iter().any(|alias| {
                aliases
                    .get(alias)
                    .is_some_and(|owner| Arc::ptr_eq(owner, descriptor))
            })
        });
    }

    /// Resolve an alias, case-insensitively
    pub fn command(&self, alias: &str) -> Option<&Arc<CommandDescriptor>> {
        self.aliases.get(&alias.trim().to_lowercase())
    }

    /// Live command descriptors in registration order
    pub fn commands(&self) -> &[Arc<CommandDescriptor>] {
        &self.commands
    }

    pub fn event_handlers(&self) -> &[Arc<EventHandlerDescriptor>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.commands.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty()
    }

    /// Read-only summary for the admin surface
    pub fn listing(&self) -> RegistryListing {
        let commands: Vec<String> = self.commands.iter().map(|c| c.name().to_string()).collect();
        let mut seen: HashSet<&str> = commands.iter().map(String::as_str).collect();
        let handle_event = self
            .events
            .iter()
            .filter(|e| seen.insert(e.name()))
            .map(|e| e.name().to_string())
            .collect();

        RegistryListing {
            commands,
            handle_event,
            role: self.commands.iter().map(|c| c.role()).collect(),
            aliases: self.commands.iter().map(|c| c.aliases().to_vec()).collect(),
        }
    }
}

/// Names, roles and alias sets of everything registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryListing {
    pub commands: Vec<String>,
    pub handle_event: Vec<String>,
    pub role: Vec<Role>,
    pub aliases: Vec<Vec<String>>,
}

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::domain::traits::{CommandHandler, EventHandler};

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 5;

/// Minimum privilege tier needed to invoke a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u8")]
pub enum Role {
    /// Anyone may invoke
    #[default]
    Everyone,
    /// Global admins only
    Admin,
    /// Global admins and the admins of the current thread
    ThreadAdmin,
    /// Only callers on the active account's blacklist
    Blacklisted,
}

impl Role {
    pub fn tier(self) -> u8 {
        match self {
            Role::Everyone => 0,
            Role::Admin => 1,
            Role::ThreadAdmin => 2,
            Role::Blacklisted => 3,
        }
    }

    pub fn from_tier(tier: i64) -> Option<Self> {
        match tier {
            0 => Some(Role::Everyone),
            1 => Some(Role::Admin),
            2 => Some(Role::ThreadAdmin),
            3 => Some(Role::Blacklisted),
            _ => None,
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.tier()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tier())
    }
}

/// Declared metadata of a plugin module, after defaults are applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginMetadata {
    pub name: String,
    pub role: Role,
    pub version: String,
    pub has_prefix: bool,
    pub aliases: Vec<String>,
    pub description: String,
    pub usage: String,
    pub credits: String,
    pub cooldown: u64,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Everyone,
            version: DEFAULT_VERSION.to_string(),
            has_prefix: true,
            aliases: Vec::new(),
            description: String::new(),
            usage: String::new(),
            credits: String::new(),
            cooldown: DEFAULT_COOLDOWN_SECONDS,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_prefix(mut self, has_prefix: bool) -> Self {
        self.has_prefix = has_prefix;
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cooldown(mut self, seconds: u64) -> Self {
        self.cooldown = seconds;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Lower-cases and dedupes the alias set, appending the canonical name.
    pub fn normalized(mut self) -> Self {
        let mut aliases: Vec<String> = Vec::with_capacity(self.aliases.len() + 1);
        for alias in self.aliases.iter().chain(std::iter::once(&self.name)) {
            let alias = alias.trim().to_lowercase();
            if !alias.is_empty() && !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        self.aliases = aliases;
        self
    }

    /// Lower-cased canonical name, used as the cooldown and enable-list key
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

/// A registered command: metadata plus its `run` entry point
pub struct CommandDescriptor {
    pub metadata: PluginMetadata,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.metadata.aliases
    }

    pub fn role(&self) -> Role {
        self.metadata.role
    }

    pub fn requires_prefix(&self) -> bool {
        self.metadata.has_prefix
    }

    pub fn cooldown_seconds(&self) -> u64 {
        self.metadata.cooldown
    }

    pub fn key(&self) -> String {
        self.metadata.key()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// A passive listener invoked for every inbound event
pub struct EventHandlerDescriptor {
    pub metadata: PluginMetadata,
    pub handler: Arc<dyn EventHandler>,
}

impl EventHandlerDescriptor {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn key(&self) -> String {
        self.metadata.key()
    }
}

impl fmt::Debug for EventHandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlerDescriptor")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_appends_canonical_name() {
        let meta = PluginMetadata::new("AI")
            .with_aliases(["GPT", "openai", "gpt"])
            .normalized();
        assert_eq!(meta.aliases, vec!["gpt", "openai", "ai"]);
        assert_eq!(meta.key(), "ai");
    }

    #[test]
    fn test_defaults() {
        let meta = PluginMetadata::new("ping");
        assert_eq!(meta.role, Role::Everyone);
        assert_eq!(meta.version, "1.0.0");
        assert!(meta.has_prefix);
        assert_eq!(meta.cooldown, 5);
    }

    #[test]
    fn test_role_tiers() {
        for tier in 0..=3 {
            assert_eq!(Role::from_tier(tier).map(Role::tier), Some(tier as u8));
        }
        assert_eq!(Role::from_tier(4), None);
        assert_eq!(Role::from_tier(-1), None);
    }
}

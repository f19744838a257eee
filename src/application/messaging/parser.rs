//! Command parser - Resolves a message body to a command under the prefix policy

use std::sync::Arc;
use crate::domain::entities::CommandDescriptor;

/// Result of resolving a message body
#[derive(Debug)]
pub enum Resolution {
    /// Not a command invocation; silently ignored
    NoMatch,
    /// Prefixed invocation of a command that must be used without one
    PrefixNotNeeded(Arc<CommandDescriptor>),
    /// Resolved command with the whitespace-split remainder
    Command {
        descriptor: Arc<CommandDescriptor>,
        args: Vec<String>,
    },
}

/// Resolves message bodies against a session's default prefix
pub struct CommandParser<'p> {
    prefix: &'p str,
}

impl<'p> CommandParser<'p> {
    pub fn new(prefix: &'p str) -> Self {
        Self { prefix }
    }

    /// Resolve `body` using `lookup` to map a lower-cased token to a command.
    ///
    /// A first token that names a command declared without a prefix disables
    /// the session prefix for this message. Otherwise the body must start
    /// with the prefix, which is stripped before the command token is read.
    pub fn resolve<F>(&self, body: &str, lookup: F) -> Resolution
    where
        F: Fn(&str) -> Option<Arc<CommandDescriptor>>,
    {
        let trimmed = body.trim();
        let lowered = trimmed.to_lowercase();
        let Some(first) = lowered.split_whitespace().next() else {
            return Resolution::NoMatch;
        };

        let prefix = match lookup(first) {
            Some(descriptor) if !descriptor.requires_prefix() => "",
            _ => self.prefix,
        };

        let Some(remainder) = strip_prefix_ignore_case(trimmed, prefix) else {
            return Resolution::NoMatch;
        };
        let mut parts = remainder.split_whitespace();
        let Some(token) = parts.next() else {
            return Resolution::NoMatch;
        };
        let args: Vec<String> = parts.map(str::to_string).collect();

        match lookup(&token.to_lowercase()) {
            Some(descriptor) if !prefix.is_empty() && !descriptor.requires_prefix() => {
                Resolution::PrefixNotNeeded(descriptor)
            }
            Some(descriptor) => Resolution::Command { descriptor, args },
            None => Resolution::NoMatch,
        }
    }
}

/// Remainder of `text` after a case-insensitive `prefix`.
///
/// Walks `text` one char at a time comparing lower-cased forms, so a char
/// whose lower case expands to several chars still lines up with the prefix.
fn strip_prefix_ignore_case<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let wanted = prefix.to_lowercase();
    if wanted.is_empty() {
        return Some(text);
    }

    let mut seen = String::with_capacity(wanted.len());
    for (idx, ch) in text.char_indices() {
        seen.extend(ch.to_lowercase());
        if !wanted.starts_with(seen.as_str()) {
            return None;
        }
        if seen.len() == wanted.len() {
            return Some(&text[idx + ch.len_utf8()..]);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{PluginMetadata, PluginModule, PluginRegistry};
    use crate::testing::NoopCommand;

    fn registry() -> PluginRegistry {
        let mut registry = PluginRegistry::new();
        registry.register(
            PluginModule::new(PluginMetadata::new("ai").with_prefix(false).with_aliases(["gpt"]))
                .with_run(Arc::new(NoopCommand)),
        );
        registry.register(
            PluginModule::new(PluginMetadata::new("ping")).with_run(Arc::new(NoopCommand)),
        );
        registry
    }

    fn resolve(body: &str, prefix: &str) -> Resolution {
        let registry = registry();
        CommandParser::new(prefix).resolve(body, |token| registry.command(token).cloned())
    }

    fn command_name(resolution: &Resolution) -> Option<(&str, &[String])> {
        match resolution {
            Resolution::Command { descriptor, args } => Some((descriptor.name(), args.as_slice())),
            _ => None,
        }
    }

    #[test]
    fn test_prefixed_command_requiring_prefix_is_stripped() {
        let resolution = resolve("!ping Hello World", "!");
        assert_eq!(
            command_name(&resolution),
            Some(("ping", &["Hello".to_string(), "World".to_string()][..]))
        );
    }

    #[test]
    fn test_prefixed_command_without_prefix_is_rejected() {
        let resolution = resolve("!ai what is rust", "!");
        assert!(matches!(resolution, Resolution::PrefixNotNeeded(d) if d.name() == "ai"));
    }

    #[test]
    fn test_prefixed_unknown_token_is_re_resolved() {
        assert!(matches!(resolve("!unknown", "!"), Resolution::NoMatch));
        // Space between prefix and token
        assert_eq!(command_name(&resolve("!  PING", "!")).map(|c| c.0), Some("ping"));
    }

    #[test]
    fn test_unprefixed_command_without_prefix_proceeds() {
        let resolution = resolve("GPT tell me", "!");
        assert_eq!(
            command_name(&resolution),
            Some(("ai", &["tell".to_string(), "me".to_string()][..]))
        );
    }

    #[test]
    fn test_unprefixed_command_requiring_prefix_is_ignored() {
        assert!(matches!(resolve("ping", "!"), Resolution::NoMatch));
        assert!(matches!(resolve("hello there", "!"), Resolution::NoMatch));
    }

    #[test]
    fn test_empty_body_and_bare_prefix() {
        assert!(matches!(resolve("   ", "!"), Resolution::NoMatch));
        assert!(matches!(resolve("!", "!"), Resolution::NoMatch));
    }

    #[test]
    fn test_multi_char_prefix_is_case_insensitive() {
        assert_eq!(command_name(&resolve("Bot ping", "bot")).map(|c| c.0), Some("ping"));
    }

    #[test]
    fn test_empty_session_prefix_never_rejects() {
        assert_eq!(command_name(&resolve("ping", "")).map(|c| c.0), Some("ping"));
        assert_eq!(command_name(&resolve("ai hi", "")).map(|c| c.0), Some("ai"));
    }

    #[test]
    fn test_prefix_with_expanding_lowercase() {
        // 'İ' lower-cases to two chars: 'i' plus a combining dot
        let resolution = resolve("İping now", "i\u{307}");
        assert_eq!(command_name(&resolution), Some(("ping", &["now".to_string()][..])));

        let resolution = resolve("i\u{307}ping", "İ");
        assert_eq!(command_name(&resolution), Some(("ping", &[][..])));

        assert!(matches!(resolve("İping", "ix"), Resolution::NoMatch));
    }

    #[test]
    fn test_prefix_strip_keeps_body_case() {
        assert_eq!(strip_prefix_ignore_case("BOT:Ping Arg", "bot:"), Some("Ping Arg"));
        assert_eq!(strip_prefix_ignore_case("!", "!"), Some(""));
        assert_eq!(strip_prefix_ignore_case("!", "!!"), None);
        assert_eq!(strip_prefix_ignore_case("ping", ""), Some("ping"));
    }
}

//! Plugin manifest definition

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::application::errors::LoadError;
use crate::domain::entities::command::{DEFAULT_COOLDOWN_SECONDS, DEFAULT_VERSION};
use crate::domain::entities::{PluginMetadata, Role};

/// Declared metadata of one plugin module, plus the catalog entries it binds.
///
/// Keys are matched case-insensitively (`hasPrefix`, `HASPREFIX` and
/// `hasprefix` are the same key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    pub metadata: PluginMetadata,
    /// Catalog id of the command entry point
    pub run: Option<String>,
    /// Catalog id of the event entry point
    pub handle_event: Option<String>,
}

/// Integers written either bare or as strings (`role: '0'`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(i64),
    Text(String),
}

impl Numeric {
    fn value(&self) -> Option<i64> {
        match self {
            Numeric::Int(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    name: Option<String>,
    role: Option<Numeric>,
    version: Option<String>,
    hasprefix: Option<bool>,
    #[serde(default)]
    aliases: Vec<String>,
    description: Option<String>,
    usage: Option<String>,
    credits: Option<String>,
    cooldown: Option<Numeric>,
    run: Option<String>,
    handleevent: Option<String>,
}

impl PluginManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, path)
    }

    /// Parse YAML (or JSON) manifest text; `path` is used for error reporting.
    pub fn parse(content: &str, path: &Path) -> Result<Self, LoadError> {
        let parse_err = |message: String| LoadError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let meta_err = |message: &str| LoadError::Metadata {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        let value: Value = serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        let Value::Mapping(mapping) = value else {
            return Err(meta_err("manifest must be a mapping"));
        };

        let mut lowered = Mapping::with_capacity(mapping.len());
        for (key, value) in mapping {
            let Value::String(key) = key else {
                return Err(meta_err("manifest keys must be strings"));
            };
            lowered.insert(Value::String(key.to_lowercase()), value);
        }

        let raw: RawManifest =
            serde_yaml::from_value(Value::Mapping(lowered)).map_err(|e| parse_err(e.to_string()))?;

        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| meta_err("missing name"))?;

        let role = match raw.role {
            None => Role::Everyone,
            Some(role) => role
                .value()
                .and_then(Role::from_tier)
                .ok_or_else(|| meta_err("role must be an integer between 0 and 3"))?,
        };

        let cooldown = match raw.cooldown {
            None => DEFAULT_COOLDOWN_SECONDS,
            Some(cooldown) => cooldown
                .value()
                .and_then(|n| u64::try_from(n).ok())
                .ok_or_else(|| meta_err("cooldown must be a non-negative integer"))?,
        };

        let metadata = PluginMetadata {
            name,
            role,
            version: raw.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            has_prefix: raw.hasprefix.unwrap_or(true),
            aliases: raw.aliases,
            description: raw.description.unwrap_or_default(),
            usage: raw.usage.unwrap_or_default(),
            credits: raw.credits.unwrap_or_default(),
            cooldown,
        };

        Ok(Self {
            metadata,
            run: raw.run,
            handle_event: raw.handleevent,
        })
    }
}

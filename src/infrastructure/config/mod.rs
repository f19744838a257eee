//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::domain::traits::ClientOptions;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub bot: BotConfig,
    pub plugins: PluginConfig,
    pub data: DataConfig,
    pub master_key: MasterKeyConfig,
    pub client_options: ClientOptions,
    pub ai: AiConfig,
    pub history_flush_seconds: FlushInterval,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "autobot".to_string(),
            prefix: "/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PluginConfig {
    pub directory: PathBuf,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./script"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DataConfig {
    pub history_path: PathBuf,
    pub thread_admin_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("./data/history.json"),
            thread_admin_path: PathBuf::from("./data/database.json"),
        }
    }
}

/// Global admins recognised on every account
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MasterKeyConfig {
    pub admin: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AiConfig {
    pub endpoint: Option<String>,
}

/// Seconds between elapsed-time flushes to the history store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct FlushInterval(pub u64);

impl Default for FlushInterval {
    fn default() -> Self {
        Self(60)
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history_flush_seconds.0 == 0 {
            return Err(ConfigError::InvalidValue(
                "history-flush-seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment overrides on top of this config
    pub fn with_env(mut self) -> Self {
        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Ok(dir) = std::env::var("BOT_PLUGIN_DIR") {
            self.plugins.directory = PathBuf::from(dir);
        }

        self
    }

    pub fn load_env() -> Self {
        Config::default().with_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml(
            r#"
bot:
  prefix: "!"
master-key:
  admin: ["100", "200"]
client-options:
  self-listen: true
"#,
        )
        .unwrap();

        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.bot.name, "autobot");
        assert_eq!(config.master_key.admin, vec!["100", "200"]);
        assert!(config.client_options.self_listen);
        assert!(config.client_options.listen_events);
        assert_eq!(config.plugins.directory, PathBuf::from("./script"));
        assert_eq!(config.history_flush_seconds, FlushInterval(60));
    }

    #[test]
    fn test_default_round_trips_through_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.bot.prefix, "/");
        assert_eq!(parsed.data.history_path, PathBuf::from("./data/history.json"));
    }

    #[test]
    fn test_zero_flush_interval_rejected() {
        let err = Config::from_yaml("history-flush-seconds: 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }
}

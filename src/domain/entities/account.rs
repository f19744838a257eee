use serde::{Deserialize, Serialize};

/// Cookie key carrying the account id inside an app-state credential
pub const ACCOUNT_ID_KEY: &str = "c_user";

/// Snapshot of one live, authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSession {
    #[serde(skip)]
    pub account_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub profile_url: String,
    pub thumb_src: String,
    #[serde(rename = "time")]
    pub elapsed_seconds: u64,
}

/// Profile fields reported by the chat platform; any may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileInfo {
    pub name: Option<String>,
    pub profile_url: Option<String>,
    pub thumb_src: Option<String>,
}

/// One entry of a serialized app-state credential
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppStateEntry {
    pub key: String,
    pub value: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AppStateEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Serialized session credential handed to the platform client at login
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SessionCredential(pub Vec<AppStateEntry>);

impl SessionCredential {
    pub fn new(entries: Vec<AppStateEntry>) -> Self {
        Self(entries)
    }

    /// Account id taken from the `c_user` entry
    pub fn account_id(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|entry| entry.key == ACCOUNT_ID_KEY)
            .map(|entry| entry.value.as_str())
            .filter(|id| !id.is_empty())
    }
}

/// Per-account dispatch settings carried alongside every event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountScope {
    pub account_id: String,
    pub prefix: String,
    pub enabled_commands: Vec<String>,
    pub admins: Vec<String>,
}

impl AccountScope {
    pub fn new(account_id: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            prefix: prefix.into(),
            enabled_commands: Vec::new(),
            admins: Vec::new(),
        }
    }

    pub fn with_enabled_commands(mut self, commands: Vec<String>) -> Self {
        self.enabled_commands = commands;
        self
    }

    pub fn with_admins(mut self, admins: Vec<String>) -> Self {
        self.admins = admins;
        self
    }

    /// An empty enable-list enables every module. `key` must already be lower-cased.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.enabled_commands.is_empty()
            || self
                .enabled_commands
                .iter()
                .any(|name| name.trim().to_lowercase() == key)
    }
}

/// Durable per-account record in the history store
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct HistoryRecord {
    pub userid: String,
    #[serde(default)]
    pub time: u64,
    #[serde(default)]
    pub blacklist: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub admin: Vec<String>,
    #[serde(
        default,
        rename = "enableCommands",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub enable_commands: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HistoryRecord {
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_account_id() {
        let credential: SessionCredential = serde_json::from_str(
            r#"[{"key":"xs","value":"abc","domain":".example.com"},{"key":"c_user","value":"1001"}]"#,
        )
        .unwrap();
        assert_eq!(credential.account_id(), Some("1001"));
        assert_eq!(credential.0[0].extra["domain"], ".example.com");
    }

    #[test]
    fn test_credential_without_account_id() {
        let credential = SessionCredential::new(vec![AppStateEntry::new("xs", "abc")]);
        assert_eq!(credential.account_id(), None);
    }

    #[test]
    fn test_scope_enable_list() {
        let open = AccountScope::new("1", "!");
        assert!(open.is_enabled("anything"));

        let scoped = AccountScope::new("1", "!").with_enabled_commands(vec!["Help".into()]);
        assert!(scoped.is_enabled("help"));
        assert!(!scoped.is_enabled("ai"));

        let accented = AccountScope::new("1", "!").with_enabled_commands(vec![" ÜBERSICHT ".into()]);
        assert!(accented.is_enabled("übersicht"));
    }

    #[test]
    fn test_history_record_keeps_unknown_fields() {
        let record: HistoryRecord =
            serde_json::from_str(r#"{"userid":"7","time":42,"state":[1,2]}"#).unwrap();
        assert_eq!(record.time, 42);
        assert!(record.blacklist.is_empty());
        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["state"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_session_admin_listing_shape() {
        let session = AccountSession {
            account_id: "1".into(),
            display_name: "Bot".into(),
            profile_url: "https://p/1".into(),
            thumb_src: "https://t/1".into(),
            elapsed_seconds: 9,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name":"Bot","profileUrl":"https://p/1","thumbSrc":"https://t/1","time":9})
        );
    }
}

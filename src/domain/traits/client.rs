use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::errors::ClientError;
use crate::domain::entities::{ChatEvent, ProfileInfo, SessionCredential};

/// Inbound events for one account, in arrival order
pub type EventStream = mpsc::Receiver<Result<ChatEvent, ClientError>>;

/// Runtime behaviour flags applied to a client after login
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ClientOptions {
    pub listen_events: bool,
    pub log_level: String,
    pub update_presence: bool,
    pub self_listen: bool,
    pub force_login: bool,
    pub online: bool,
    pub auto_mark_delivery: bool,
    pub auto_mark_read: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            listen_events: true,
            log_level: "silent".to_string(),
            update_presence: true,
            self_listen: false,
            force_login: true,
            online: true,
            auto_mark_delivery: false,
            auto_mark_read: false,
        }
    }
}

/// An authenticated connection to the chat platform
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Id of the logged-in account
    async fn current_user_id(&self) -> Result<String, ClientError>;

    /// Profile of a user; `None` when the platform knows nothing about it
    async fn user_info(&self, user_id: &str) -> Result<Option<ProfileInfo>, ClientError>;

    /// Admin ids of a conversation thread
    async fn thread_admin_ids(&self, thread_id: &str) -> Result<Vec<String>, ClientError>;

    fn set_options(&self, options: &ClientOptions);

    /// Send text to a thread, optionally as a reply. Returns the new message id.
    async fn send_message(
        &self,
        thread_id: &str,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<String, ClientError>;

    /// Subscribe to the account's event stream
    async fn listen(&self) -> Result<EventStream, ClientError>;
}

/// Performs the platform login for a credential
#[async_trait]
pub trait ClientConnector: Send + Sync {
    async fn login(&self, credential: &SessionCredential) -> Result<Arc<dyn ChatClient>, ClientError>;
}

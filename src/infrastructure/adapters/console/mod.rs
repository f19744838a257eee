//! Console adapter for development/testing

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::ClientError;
use crate::domain::entities::{AppStateEntry, ChatEvent, ProfileInfo, SessionCredential};
use crate::domain::traits::{ChatClient, ClientConnector, ClientOptions, EventStream};

pub const CONSOLE_ACCOUNT: &str = "console";
pub const CONSOLE_THREAD: &str = "console";
pub const CONSOLE_USER: &str = "console-user";

/// Credential accepted by the console connector
pub fn console_credential() -> SessionCredential {
    SessionCredential::new(vec![AppStateEntry::new("c_user", CONSOLE_ACCOUNT)])
}

/// Logs in console accounts; every credential with an account id succeeds
#[derive(Default)]
pub struct ConsoleConnector;

impl ConsoleConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClientConnector for ConsoleConnector {
    async fn login(&self, credential: &SessionCredential) -> Result<Arc<dyn ChatClient>, ClientError> {
        let account_id = credential
            .account_id()
            .ok_or_else(|| ClientError::Login("missing account id".to_string()))?;
        tracing::info!("Starting console client (dev mode)");
        Ok(Arc::new(ConsoleClient::new(account_id)) as Arc<dyn ChatClient>)
    }
}

/// Console client: stdin lines become message events, sends print to stdout
pub struct ConsoleClient {
    account_id: String,
    options: Mutex<ClientOptions>,
}

impl ConsoleClient {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            options: Mutex::new(ClientOptions::default()),
        }
    }
}

#[async_trait]
impl ChatClient for ConsoleClient {
    async fn current_user_id(&self) -> Result<String, ClientError> {
        Ok(self.account_id.clone())
    }

    async fn user_info(&self, user_id: &str) -> Result<Option<ProfileInfo>, ClientError> {
        Ok(Some(ProfileInfo {
            name: Some(format!("Console {}", user_id)),
            profile_url: Some(format!("console://{}", user_id)),
            thumb_src: Some(format!("console://{}/thumb", user_id)),
        }))
    }

    async fn thread_admin_ids(&self, _thread_id: &str) -> Result<Vec<String>, ClientError> {
        Ok(vec![CONSOLE_USER.to_string()])
    }

    fn set_options(&self, options: &ClientOptions) {
        tracing::debug!(?options, "Console client options");
        *self.options.lock().unwrap_or_else(|e| e.into_inner()) = options.clone();
    }

    async fn send_message(
        &self,
        _thread_id: &str,
        text: &str,
        _reply_to: Option<&str>,
    ) -> Result<String, ClientError> {
        println!("[BOT] {}", text);
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn listen(&self) -> Result<EventStream, ClientError> {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let event = ChatEvent::message(CONSOLE_THREAD, CONSOLE_USER, line);
                        if tx.send(Ok(event)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(Err(ClientError::Listen(e.to_string()))).await;
                        break;
                    }
                }
            }
        });
        Ok(rx)
    }
}

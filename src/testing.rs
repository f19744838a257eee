//! Test doubles shared by unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::application::errors::{ClientError, CommandError};
use crate::domain::entities::{ChatEvent, ProfileInfo, SessionCredential};
use crate::domain::traits::{
    ChatClient, ClientConnector, ClientOptions, CommandContext, CommandHandler, EventContext,
    EventHandler, EventStream,
};

pub struct NoopCommand;

#[async_trait]
impl CommandHandler for NoopCommand {
    async fn run(&self, _ctx: CommandContext<'_>) -> Result<(), CommandError> {
        Ok(())
    }
}

pub struct FailingCommand;

#[async_trait]
impl CommandHandler for FailingCommand {
    async fn run(&self, _ctx: CommandContext<'_>) -> Result<(), CommandError> {
        Err(CommandError::ExecutionFailed("kaboom".to_string()))
    }
}

/// Panics when invoked without arguments
pub struct PanickingCommand;

#[async_trait]
impl CommandHandler for PanickingCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> Result<(), CommandError> {
        let first = &ctx.args[0];
        ctx.reply(first).await?;
        Ok(())
    }
}

/// Replies with a fixed text
pub struct ReplyCommand(pub &'static str);

#[async_trait]
impl CommandHandler for ReplyCommand {
    async fn run(&self, ctx: CommandContext<'_>) -> Result<(), CommandError> {
        ctx.reply(self.0).await?;
        Ok(())
    }
}

/// Event handler that counts invocations, optionally failing each one
#[derive(Default)]
pub struct CountingHandler {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventHandler for CountingHandler {
    async fn handle_event(&self, _ctx: EventContext<'_>) -> Result<(), CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CommandError::ExecutionFailed("listener broke".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub thread_id: String,
    pub text: String,
    pub reply_to: Option<String>,
}

/// In-memory client that records sends and lets tests push stream events
pub struct RecordingClient {
    user_id: String,
    profile: ProfileInfo,
    thread_admins: HashMap<String, Vec<String>>,
    thread_admin_calls: AtomicUsize,
    sent: Mutex<Vec<SentMessage>>,
    options: Mutex<Option<ClientOptions>>,
    sender: tokio::sync::Mutex<Option<mpsc::Sender<Result<ChatEvent, ClientError>>>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self {
            user_id: "bot".to_string(),
            profile: ProfileInfo {
                name: Some("Test Account".to_string()),
                profile_url: Some("https://example.com/bot".to_string()),
                thumb_src: Some("https://example.com/bot.png".to_string()),
            },
            thread_admins: HashMap::new(),
            thread_admin_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
            options: Mutex::new(None),
            sender: tokio::sync::Mutex::new(None),
        }
    }

    pub fn with_user_id(mut self, id: &str) -> Self {
        self.user_id = id.to_string();
        self
    }

    pub fn with_profile(mut self, profile: ProfileInfo) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_thread_admins(mut self, thread_id: &str, admins: &[&str]) -> Self {
        self.thread_admins.insert(
            thread_id.to_string(),
            admins.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn options(&self) -> Option<ClientOptions> {
        self.options.lock().unwrap().clone()
    }

    pub fn thread_admin_calls(&self) -> usize {
        self.thread_admin_calls.load(Ordering::SeqCst)
    }

    pub async fn push_event(&self, event: ChatEvent) {
        if let Some(tx) = self.sender.lock().await.as_ref() {
            tx.send(Ok(event)).await.unwrap();
        }
    }

    pub async fn push_error(&self, message: &str) {
        if let Some(tx) = self.sender.lock().await.as_ref() {
            tx.send(Err(ClientError::Listen(message.to_string()))).await.unwrap();
        }
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn current_user_id(&self) -> Result<String, ClientError> {
        Ok(self.user_id.clone())
    }

    async fn user_info(&self, _user_id: &str) -> Result<Option<ProfileInfo>, ClientError> {
        Ok(Some(self.profile.clone()))
    }

    async fn thread_admin_ids(&self, thread_id: &str) -> Result<Vec<String>, ClientError> {
        self.thread_admin_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.thread_admins.get(thread_id).cloned().unwrap_or_default())
    }

    fn set_options(&self, options: &ClientOptions) {
        *self.options.lock().unwrap() = Some(options.clone());
    }

    async fn send_message(
        &self,
        thread_id: &str,
        text: &str,
        reply_to: Option<&str>,
    ) -> Result<String, ClientError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMessage {
            thread_id: thread_id.to_string(),
            text: text.to_string(),
            reply_to: reply_to.map(str::to_string),
        });
        Ok(format!("m{}", sent.len()))
    }

    async fn listen(&self) -> Result<EventStream, ClientError> {
        let (tx, rx) = mpsc::channel(16);
        *self.sender.lock().await = Some(tx);
        Ok(rx)
    }
}

/// Connector handing out one fixed client, or failing every login
pub struct StaticConnector {
    client: Option<Arc<RecordingClient>>,
    error: Option<String>,
    logins: AtomicUsize,
}

impl StaticConnector {
    pub fn new(client: Arc<RecordingClient>) -> Self {
        Self {
            client: Some(client),
            error: None,
            logins: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            client: None,
            error: Some(message.to_string()),
            logins: AtomicUsize::new(0),
        }
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientConnector for StaticConnector {
    async fn login(&self, _credential: &SessionCredential) -> Result<Arc<dyn ChatClient>, ClientError> {
        self.logins.fetch_add(1, Ordering::SeqCst);
        match (&self.client, &self.error) {
            (Some(client), _) => Ok(client.clone() as Arc<dyn ChatClient>),
            (None, Some(message)) => Err(ClientError::Login(message.clone())),
            (None, None) => Err(ClientError::Login("no client".to_string())),
        }
    }
}

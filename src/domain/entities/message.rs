use chrono::{DateTime, Utc};

/// Kind of inbound event delivered by the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Message,
    MessageReply,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Message => "message",
            EventKind::MessageReply => "message_reply",
            EventKind::Other(s) => s,
        }
    }
}

/// One inbound event from an account's stream
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub kind: EventKind,
    pub thread_id: String,
    pub message_id: String,
    pub sender_id: String,
    pub body: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatEvent {
    pub fn new(kind: EventKind, thread_id: impl Into<String>, sender_id: impl Into<String>) -> Self {
        Self {
            kind,
            thread_id: thread_id.into(),
            message_id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender_id.into(),
            body: None,
            timestamp: Utc::now(),
        }
    }

    pub fn message(
        thread_id: impl Into<String>,
        sender_id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self::new(EventKind::Message, thread_id, sender_id).with_body(body)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = id.into();
        self
    }

    /// Non-blank message text, if any
    pub fn text(&self) -> Option<&str> {
        self.body.as_deref().filter(|b| !b.trim().is_empty())
    }
}

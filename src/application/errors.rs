//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Plugin error: {0}")]
    Plugin(#[from] LoadError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Raised by the chat platform client
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    #[error("Login failed: {0}")]
    Login(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Listen error: {0}")]
    Listen(String),

    #[error("Send failed: {0}")]
    Send(String),
}

/// Command and event handler errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    ExecutionFailed(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// A plugin module that could not be registered
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid metadata in {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("Unknown handler '{handler}' referenced by {path}")]
    UnknownHandler { path: PathBuf, handler: String },

    #[error("Failed to read plugin directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Session lifecycle errors, surfaced to the caller of `login`
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("There's an issue with the appstate data; it's invalid.")]
    InvalidCredential,

    #[error("Authentication failed: {0}")]
    Auth(#[source] ClientError),

    #[error("Unable to locate the account; it appears to be in a suspended or locked state.")]
    ProfileUnavailable,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

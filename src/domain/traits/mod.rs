//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod handler;
pub mod store;

pub use client::{ChatClient, ClientConnector, ClientOptions, EventStream};
pub use handler::{CommandContext, CommandHandler, EventContext, EventHandler};
pub use store::{HistoryStore, ThreadAdminStore};

//! Domain entities - Core business objects with no external dependencies

pub mod account;
pub mod command;
pub mod message;
pub mod registry;

pub use account::{
    AccountScope, AccountSession, AppStateEntry, HistoryRecord, ProfileInfo, SessionCredential,
};
pub use command::{CommandDescriptor, EventHandlerDescriptor, PluginMetadata, Role};
pub use message::{ChatEvent, EventKind};
pub use registry::{PluginModule, PluginRegistry, RegistryListing};

//! Plugin system for autobot
//! 
//! Plugins are manifest files (YAML or JSON) in the plugin directory. Each
//! declares command metadata and binds `run` / `handleEvent` to handlers
//! from the `HandlerCatalog`.

pub mod builtin;
pub mod catalog;
pub mod loader;
pub mod manifest;

pub use catalog::HandlerCatalog;
pub use loader::{LoadOutcome, PluginLoader};
pub use manifest::PluginManifest;

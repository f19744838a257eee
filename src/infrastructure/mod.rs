//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Flat-file persistence
//! - Plugins: Manifest discovery and built-in handlers
//! - Adapters: Platform integrations (console)

pub mod config;
pub mod storage;
pub mod plugins;
pub mod adapters;

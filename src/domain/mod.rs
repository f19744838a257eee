//! Domain layer - Core dispatch types and the seams to the outside world
//! 
//! This layer contains:
//! - Entities: Commands, plugin registry, chat events, account sessions
//! - Traits: Abstractions for the chat client, handlers and flat-file stores

pub mod entities;
pub mod traits;

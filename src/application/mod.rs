//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Permission evaluation, cooldowns, session lifecycle
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing and event routing

pub mod errors;
pub mod services;
pub mod messaging;

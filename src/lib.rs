//! autobot - command-dispatch engine for chat-automation accounts
//!
//! Loads plugin manifests into an alias-indexed registry, keeps authenticated
//! account sessions alive, and routes every inbound message through prefix
//! resolution, role-tier permissions and per-caller cooldowns.

pub mod domain;
pub mod application;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;

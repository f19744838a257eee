//! Message handling - Event-driven message routing

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{Dispatch, EventRouter};
pub use parser::{CommandParser, Resolution};

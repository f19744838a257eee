//! Application services - Permission, cooldown and session orchestration

pub mod cooldown;
pub mod permission;
pub mod session_service;

pub use cooldown::{CooldownThrottle, Throttle};
pub use permission::{role_permits, PermissionEvaluator};
pub use session_service::{LoginOutcome, LoginRequest, SessionManager};

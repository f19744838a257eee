//! Per-command, per-caller cooldown tracking

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Outcome of a cooldown check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Throttle {
    Allowed,
    Wait(Duration),
}

impl Throttle {
    /// Remaining wait rounded up to whole seconds, as shown to callers
    pub fn wait_seconds(&self) -> u64 {
        match self {
            Throttle::Allowed => 0,
            Throttle::Wait(remaining) => remaining.as_millis().div_ceil(1000) as u64,
        }
    }
}

/// Last-invocation ledger keyed by command key, then caller id.
///
/// Entries are overwritten on each permitted invocation and never expire.
#[derive(Debug, Default)]
pub struct CooldownThrottle {
    ledger: Mutex<HashMap<String, HashMap<String, DateTime<Utc>>>>,
}

impl CooldownThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and, when allowed, record `now` as the caller's last invocation.
    ///
    /// The timestamp is recorded before the handler runs so a slow handler
    /// still throttles a second message from the same caller.
    pub fn try_acquire(
        &self,
        command_key: &str,
        caller_id: &str,
        cooldown_seconds: u64,
        now: DateTime<Utc>,
    ) -> Throttle {
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = ledger.entry(command_key.to_string()).or_default();

        if let Some(last) = timestamps.get(caller_id) {
            let window_ms = (cooldown_seconds as i64).saturating_mul(1000);
            let remaining = window_ms - now.signed_duration_since(*last).num_milliseconds();
            if remaining > 0 {
                return Throttle::Wait(Duration::from_millis(remaining as u64));
            }
        }

        timestamps.insert(caller_id.to_string(), now);
        Throttle::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_first_call_allowed() {
        let throttle = CooldownThrottle::new();
        assert_eq!(throttle.try_acquire("ai", "u1", 5, Utc::now()), Throttle::Allowed);
    }

    #[test]
    fn test_second_call_within_window_waits() {
        let throttle = CooldownThrottle::new();
        let start = Utc::now();
        throttle.try_acquire("ai", "u1", 5, start);

        let result = throttle.try_acquire("ai", "u1", 5, start + TimeDelta::milliseconds(1_200));
        assert_eq!(result, Throttle::Wait(Duration::from_millis(3_800)));
        assert_eq!(result.wait_seconds(), 4);
    }

    #[test]
    fn test_allowed_again_after_window() {
        let throttle = CooldownThrottle::new();
        let start = Utc::now();
        throttle.try_acquire("ai", "u1", 5, start);

        assert_eq!(
            throttle.try_acquire("ai", "u1", 5, start + TimeDelta::seconds(5)),
            Throttle::Allowed
        );
        // The allowed call restarts the window
        assert!(matches!(
            throttle.try_acquire("ai", "u1", 5, start + TimeDelta::seconds(6)),
            Throttle::Wait(_)
        ));
    }

    #[test]
    fn test_throttled_call_does_not_extend_window() {
        let throttle = CooldownThrottle::new();
        let start = Utc::now();
        throttle.try_acquire("ai", "u1", 3, start);
        throttle.try_acquire("ai", "u1", 3, start + TimeDelta::seconds(2));

        assert_eq!(
            throttle.try_acquire("ai", "u1", 3, start + TimeDelta::seconds(3)),
            Throttle::Allowed
        );
    }

    #[test]
    fn test_keys_are_independent() {
        let throttle = CooldownThrottle::new();
        let now = Utc::now();
        throttle.try_acquire("ai", "u1", 5, now);

        assert_eq!(throttle.try_acquire("ai", "u2", 5, now), Throttle::Allowed);
        assert_eq!(throttle.try_acquire("help", "u1", 5, now), Throttle::Allowed);
    }

    #[test]
    fn test_zero_cooldown_never_waits() {
        let throttle = CooldownThrottle::new();
        let now = Utc::now();
        throttle.try_acquire("echo", "u1", 0, now);
        assert_eq!(throttle.try_acquire("echo", "u1", 0, now), Throttle::Allowed);
    }
}

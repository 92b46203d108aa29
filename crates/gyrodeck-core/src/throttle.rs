//! Rate limiter for durably logging a high-frequency input stream.
//!
//! The joystick posts at display rate; the event log wants at most one
//! sample per interval. The throttle decides only whether a command is
//! *logged* — the caller always computes and returns its acknowledgment.
//! It takes an explicit `now` instead of reading a wall clock so tests are
//! deterministic.

use std::time::{Duration, Instant};

/// Minimum spacing between two durably logged joystick samples.
pub const JOYSTICK_INTERVAL: Duration = Duration::from_millis(250);

/// One-slot rate limiter over an explicit clock.
#[derive(Debug, Clone)]
pub struct CommandThrottle {
    interval: Duration,
    last_emitted: Option<Instant>,
}

impl CommandThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: None,
        }
    }

    /// Admit the command iff at least `interval` has passed since the last
    /// admitted one. Only an admitted command updates the state.
    pub fn should_emit(&mut self, now: Instant) -> bool {
        match self.last_emitted {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last_emitted = Some(now);
                true
            }
        }
    }
}

impl Default for CommandThrottle {
    fn default() -> Self {
        Self::new(JOYSTICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_command_always_emits() {
        let mut throttle = CommandThrottle::default();
        assert!(throttle.should_emit(Instant::now()));
    }

    #[test]
    fn interval_spacing() {
        let mut throttle = CommandThrottle::new(Duration::from_millis(250));
        let t0 = Instant::now();
        assert!(throttle.should_emit(t0));
        assert!(!throttle.should_emit(t0 + Duration::from_millis(100)));
        assert!(throttle.should_emit(t0 + Duration::from_millis(260)));
    }

    #[test]
    fn rejected_command_leaves_state_untouched() {
        let mut throttle = CommandThrottle::new(Duration::from_millis(250));
        let t0 = Instant::now();
        assert!(throttle.should_emit(t0));
        // A burst of rejected commands must not push the window forward.
        assert!(!throttle.should_emit(t0 + Duration::from_millis(100)));
        assert!(!throttle.should_emit(t0 + Duration::from_millis(200)));
        assert!(throttle.should_emit(t0 + Duration::from_millis(250)));
    }
}

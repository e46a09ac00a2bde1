//! Cooldown gate — per-line leading-edge rate limiter.
//!
//! The first press starts a refractory window; every press arriving before
//! the window elapses is dropped (not queued, not merged). A press at or
//! after expiry is accepted and restarts the window.
//!
//! The gate is independent of the driver debounce: debounce filters
//! electrical bounce in milliseconds, the cooldown filters repeated human
//! presses in seconds.

use std::time::{Duration, Instant};

/// Result of offering a press to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The press starts a new cooldown window and must be fanned out.
    Accepted,
    /// The press fell inside the current window and is discarded.
    Suppressed {
        /// Time left until the window expires.
        remaining: Duration,
    },
}

impl GateDecision {
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Cooldown state of one line.
///
/// Owned and mutated by exactly one handler; no locking.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    window: Duration,
    /// `None` until the first accepted press, meaning "not in cooldown".
    expires_at: Option<Instant>,
}

impl CooldownGate {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            expires_at: None,
        }
    }

    /// When the current cooldown ends, if one was ever started.
    #[must_use]
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Offer a press observed at `now`.
    ///
    /// Accepting moves the expiry to `now + window`. Since a press is only
    /// accepted at or after the previous expiry, the expiry never moves
    /// backwards.
    pub fn offer(&mut self, now: Instant) -> GateDecision {
        if let Some(expires_at) = self.expires_at {
            if now < expires_at {
                return GateDecision::Suppressed {
                    remaining: expires_at - now,
                };
            }
        }
        self.expires_at = Some(now + self.window);
        GateDecision::Accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(5000);

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn should_accept_first_press() {
        let mut gate = CooldownGate::new(WINDOW);
        assert!(gate.offer(Instant::now()).is_accepted());
    }

    #[test]
    fn should_suppress_press_inside_window() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(WINDOW);
        gate.offer(base);

        let decision = gate.offer(at(base, 1000));
        assert_eq!(
            decision,
            GateDecision::Suppressed {
                remaining: Duration::from_millis(4000)
            }
        );
    }

    #[test]
    fn should_accept_press_exactly_at_expiry() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(WINDOW);
        gate.offer(base);
        assert!(gate.offer(at(base, 5000)).is_accepted());
    }

    #[test]
    fn should_not_extend_window_when_suppressing() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(WINDOW);
        gate.offer(base);
        gate.offer(at(base, 4999));
        assert_eq!(gate.expires_at(), Some(at(base, 5000)));
        assert!(gate.offer(at(base, 5000)).is_accepted());
    }

    #[test]
    fn should_restart_window_after_accepting() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(WINDOW);
        gate.offer(base);
        gate.offer(at(base, 7000));
        assert_eq!(gate.expires_at(), Some(at(base, 12_000)));
        assert!(!gate.offer(at(base, 11_999)).is_accepted());
    }

    #[test]
    fn should_keep_expiry_monotonic_across_accepted_presses() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(WINDOW);
        let mut last = None;
        for ms in [0, 100, 5000, 5001, 9999, 10_000, 20_000] {
            gate.offer(at(base, ms));
            let current = gate.expires_at();
            assert!(current >= last);
            last = current;
        }
    }

    #[test]
    fn should_accept_every_press_with_zero_window() {
        let base = Instant::now();
        let mut gate = CooldownGate::new(Duration::ZERO);
        assert!(gate.offer(base).is_accepted());
        assert!(gate.offer(base).is_accepted());
    }
}

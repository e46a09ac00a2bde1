//! Wall-clock helpers.
//!
//! Cooldown decisions use monotonic [`std::time::Instant`]; wall-clock time
//! only appears in the press log.

use chrono::{DateTime, Utc};

/// UTC timestamp written to the press log.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }
}

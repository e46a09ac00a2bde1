//! Press events and the record written to the press log.

use std::fmt;
use std::time::Instant;

use chrono::SecondsFormat;

use crate::line::{LineId, TargetId};
use crate::time::Timestamp;

/// A debounced falling edge on one line. Consumed once by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    pub line: LineId,
    /// Monotonic time the edge was observed.
    pub observed_at: Instant,
}

impl PressEvent {
    #[must_use]
    pub fn new(line: LineId, observed_at: Instant) -> Self {
        Self { line, observed_at }
    }

    /// A press observed right now.
    #[must_use]
    pub fn now(line: LineId) -> Self {
        Self::new(line, Instant::now())
    }
}

/// One accepted-and-fanned-out target, as appended to the press log.
///
/// Renders as `<ISO-8601 timestamp> - pin:<line> - <target>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressRecord {
    pub at: Timestamp,
    pub line: LineId,
    pub target: TargetId,
}

impl fmt::Display for PressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - pin:{} - {}",
            self.at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.line,
            self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn should_format_record_as_log_line() {
        let record = PressRecord {
            at: Utc.with_ymd_and_hms(2025, 3, 14, 18, 5, 9).unwrap()
                + chrono::Duration::milliseconds(42),
            line: LineId::new(19),
            target: TargetId::new("camA").unwrap(),
        };
        assert_eq!(
            record.to_string(),
            "2025-03-14T18:05:09.042Z - pin:19 - camA"
        );
    }

    #[test]
    fn should_stamp_press_with_current_instant() {
        let before = Instant::now();
        let press = PressEvent::now(LineId::new(6));
        assert_eq!(press.line, LineId::new(6));
        assert!(press.observed_at >= before);
    }
}
